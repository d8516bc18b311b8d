//! License-conflict service client

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::LicenseConfig;
use crate::domain::PackageDetails;

/// Errors from the license-conflict micro-service.
#[derive(Debug, thiserror::Error)]
pub enum LicenseError {
    #[error("license service transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("license service returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Port for stack-level license-conflict analysis.
#[async_trait]
pub trait LicenseAnalyzer: Send + Sync {
    /// Analyze the denormalized package set; the returned object is merged
    /// verbatim into the aggregation result.
    async fn analyze_stack(
        &self,
        packages: &[PackageDetails],
    ) -> Result<serde_json::Value, LicenseError>;
}

#[derive(Debug, Serialize)]
struct LicenseRequestEntry<'a> {
    package: &'a str,
    version: &'a str,
    licenses: &'a [String],
}

#[derive(Debug, Serialize)]
struct LicenseRequest<'a> {
    packages: Vec<LicenseRequestEntry<'a>>,
}

/// HTTP implementation against the license service's stack-analysis endpoint.
pub struct HttpLicenseAnalyzer {
    client: Client,
    url: String,
}

impl HttpLicenseAnalyzer {
    pub fn new(config: &LicenseConfig) -> Result<Self, LicenseError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            url: format!("{}/api/v1/stack_license", config.url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl LicenseAnalyzer for HttpLicenseAnalyzer {
    async fn analyze_stack(
        &self,
        packages: &[PackageDetails],
    ) -> Result<serde_json::Value, LicenseError> {
        let payload = LicenseRequest {
            packages: packages
                .iter()
                .map(|details| LicenseRequestEntry {
                    package: &details.name,
                    version: &details.version,
                    licenses: &details.licenses,
                })
                .collect(),
        };
        let response = self.client.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(LicenseError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}
