//! HTTP layer: request models and route handlers

pub mod models;
pub mod routes;

pub use routes::{create_router, AppState};
