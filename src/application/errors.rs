//! Application-level error taxonomy
//!
//! Only request validation and collaborator failures declared fatal surface
//! here. Graph batch failures and ingestion failures degrade inside the
//! pipeline and never reach this type.

use thiserror::Error;

use crate::infrastructure::license::LicenseError;
use crate::infrastructure::persistence::PersistError;

/// Fatal failures of one aggregation run. The HTTP boundary converts every
/// variant into the "unexpected error" envelope.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("license analysis failed: {0}")]
    License(#[from] LicenseError),

    #[error("failed to persist aggregation result: {0}")]
    Persist(#[from] PersistError),

    #[error("failed to serialize aggregation result: {0}")]
    Serialization(#[from] serde_json::Error),
}
