//! Application setup and wiring

use std::sync::Arc;

use axum::Router;

use crate::application::StackAggregatorService;
use crate::config::Config;
use crate::infrastructure::{
    GremlinClient, HttpIngestionClient, HttpLicenseAnalyzer, HttpResultStore,
};
use crate::presentation::{create_router, AppState};

/// Wire the HTTP clients and the aggregation service into a router.
pub fn create_app(config: Config) -> Result<Router, Box<dyn std::error::Error>> {
    let config = Arc::new(config);

    let graph = Arc::new(GremlinClient::new(&config.graph)?);
    let license = Arc::new(HttpLicenseAnalyzer::new(&config.license)?);
    let store = Arc::new(HttpResultStore::new(&config.persistence)?);
    let ingestion = Arc::new(HttpIngestionClient::new(&config.ingestion)?);

    let aggregator = Arc::new(StackAggregatorService::new(
        Arc::clone(&config),
        graph,
        license,
        store,
        ingestion,
    ));

    Ok(create_router(AppState { config, aggregator }))
}
