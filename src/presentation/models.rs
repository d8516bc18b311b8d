//! HTTP request/response models

use serde::{Deserialize, Serialize};

pub use crate::application::aggregator::StackAggregatorRequest;

/// Query parameters of the stack-aggregator endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorParams {
    /// Write the result to the persistence layer (default true).
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl Default for AggregatorParams {
    fn default() -> Self {
        Self {
            persist: default_persist(),
        }
    }
}

fn default_persist() -> bool {
    true
}

/// Body of the readiness/liveness probes.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResponse {}
