//! Terminal aggregation result types and the response envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::details::PackageDetails;
use super::package::Package;

/// Tier-shaped aggregation result. Constructed once, serialized, discarded.
///
/// `registration_link` is present for free-tier responses only;
/// `analyzed_dependencies` preserves the order of the stack's direct
/// dependencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackAggregatorResult {
    pub external_request_id: String,
    pub ecosystem: String,
    pub analyzed_dependencies: Vec<PackageDetails>,
    pub unknown_dependencies: Vec<Package>,
    pub license_analysis: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_link: Option<String>,
}

/// Timestamps bracketing one aggregation run, attached to the serialized
/// result as `_audit` rather than the domain result itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audit {
    pub started_at: String,
    pub ended_at: String,
    pub version: String,
}

impl Audit {
    pub const VERSION: &'static str = "v2";

    pub fn timestamp(at: DateTime<Utc>) -> String {
        at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Outcome marker on the response envelope. Every caught failure maps to
/// `UnexpectedError`; there is no partial-success state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "unexpected error")]
    UnexpectedError,
}

/// Envelope returned to the caller: always well-formed JSON, never a raw
/// stack trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationEnvelope {
    pub aggregation: AggregationStatus,
    pub external_request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl AggregationEnvelope {
    pub fn success(external_request_id: String, result: serde_json::Value) -> Self {
        Self {
            aggregation: AggregationStatus::Success,
            external_request_id: Some(external_request_id),
            message: None,
            result: Some(result),
        }
    }

    pub fn unexpected_error(external_request_id: Option<String>, message: String) -> Self {
        Self {
            aggregation: AggregationStatus::UnexpectedError,
            external_request_id,
            message: Some(message),
            result: None,
        }
    }
}
