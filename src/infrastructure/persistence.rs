//! Aggregation result persistence client

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::PersistenceConfig;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("persistence transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("persistence layer returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Port for writing one finished aggregation run.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn persist(
        &self,
        external_request_id: &str,
        task_result: &serde_json::Value,
        worker: &str,
        started_at: &str,
        ended_at: &str,
    ) -> Result<(), PersistError>;
}

#[derive(Debug, Serialize)]
struct PersistRequest<'a> {
    external_request_id: &'a str,
    task_result: &'a serde_json::Value,
    worker: &'a str,
    started_at: &'a str,
    ended_at: &'a str,
}

/// HTTP implementation against the persistence service.
pub struct HttpResultStore {
    client: Client,
    url: String,
}

impl HttpResultStore {
    pub fn new(config: &PersistenceConfig) -> Result<Self, PersistError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            url: format!("{}/api/v1/worker_result", config.url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ResultStore for HttpResultStore {
    async fn persist(
        &self,
        external_request_id: &str,
        task_result: &serde_json::Value,
        worker: &str,
        started_at: &str,
        ended_at: &str,
    ) -> Result<(), PersistError> {
        let payload = PersistRequest {
            external_request_id,
            task_result,
            worker,
            started_at,
            ended_at,
        };
        let response = self.client.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(PersistError::Status(response.status()));
        }
        Ok(())
    }
}
