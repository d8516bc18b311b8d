//! Route definitions and request handling

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};

use super::models::{AggregatorParams, ProbeResponse, StackAggregatorRequest};
use crate::application::StackAggregatorService;
use crate::config::Config;
use crate::domain::AggregationEnvelope;

/// Shared handler state: immutable configuration plus the aggregation
/// service, both constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub aggregator: Arc<StackAggregatorService>,
}

pub fn create_router(state: AppState) -> Router {
    let timeout = std::time::Duration::from_secs(state.config.server.request_timeout_seconds);
    Router::new()
        .route("/api/readiness", get(readiness))
        .route("/api/liveness", get(liveness))
        .route("/api/v2/stack-aggregator", post(stack_aggregator))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn readiness() -> Json<ProbeResponse> {
    Json(ProbeResponse {})
}

async fn liveness() -> Json<ProbeResponse> {
    Json(ProbeResponse {})
}

/// Stack aggregation endpoint.
///
/// Always returns a well-formed envelope: 200 with the aggregation result, or
/// 400 with `aggregation: "unexpected error"` when validation or any fatal
/// collaborator failure cuts the run short.
async fn stack_aggregator(
    State(state): State<AppState>,
    Query(params): Query<AggregatorParams>,
    body: Result<Json<StackAggregatorRequest>, JsonRejection>,
) -> (StatusCode, Json<AggregationEnvelope>) {
    // An unparseable body still gets the envelope, never a plain-text reject.
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            error!(error = %rejection, "request body is not valid JSON");
            return (
                StatusCode::BAD_REQUEST,
                Json(AggregationEnvelope::unexpected_error(
                    None,
                    rejection.body_text(),
                )),
            );
        }
    };

    let request_started = Instant::now();
    let external_request_id = request.external_request_id.clone();
    info!(
        external_request_id = %external_request_id,
        ecosystem = %request.ecosystem,
        packages = request.packages.len(),
        persist = params.persist,
        "stack aggregation request received"
    );

    let response = match state.aggregator.execute(request, params.persist).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)),
        Err(err) => {
            error!(
                external_request_id = %external_request_id,
                error = %err,
                "stack aggregation failed"
            );
            let id = (!external_request_id.is_empty()).then_some(external_request_id.clone());
            (
                StatusCode::BAD_REQUEST,
                Json(AggregationEnvelope::unexpected_error(id, err.to_string())),
            )
        }
    };

    info!(
        external_request_id = %external_request_id,
        elapsed_ms = request_started.elapsed().as_millis() as u64,
        "stack aggregation request finished"
    );
    response
}
