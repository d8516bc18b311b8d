//! Unknown-package ingestion trigger

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::IngestionConfig;

/// Errors from the ingestion trigger. These never propagate past the
/// aggregator; they are collected and logged in aggregate.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("ingestion transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ingestion service returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Port for requesting analysis of a package the graph does not know yet.
#[async_trait]
pub trait IngestionClient: Send + Sync {
    async fn create_analysis(
        &self,
        ecosystem: &str,
        name: &str,
        version: &str,
        api_flow: bool,
        force: bool,
        force_graph_sync: bool,
    ) -> Result<(), IngestError>;
}

#[derive(Debug, Serialize)]
struct CreateAnalysisRequest<'a> {
    ecosystem: &'a str,
    name: &'a str,
    version: &'a str,
    api_flow: bool,
    force: bool,
    force_graph_sync: bool,
}

/// HTTP implementation against the ingestion API.
pub struct HttpIngestionClient {
    client: Client,
    url: String,
}

impl HttpIngestionClient {
    pub fn new(config: &IngestionConfig) -> Result<Self, IngestError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            url: format!("{}/api/v1/component-analyses", config.url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl IngestionClient for HttpIngestionClient {
    async fn create_analysis(
        &self,
        ecosystem: &str,
        name: &str,
        version: &str,
        api_flow: bool,
        force: bool,
        force_graph_sync: bool,
    ) -> Result<(), IngestError> {
        let payload = CreateAnalysisRequest {
            ecosystem,
            name,
            version,
            api_flow,
            force,
            force_graph_sync,
        };
        let response = self.client.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(IngestError::Status(response.status()));
        }
        Ok(())
    }
}
