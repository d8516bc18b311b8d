//! External collaborators of the aggregation pipeline
//!
//! Each collaborator is a port trait plus a reqwest-backed implementation with
//! a bounded per-call timeout. Failures map to per-service error types; the
//! application layer decides which of them degrade and which are fatal.

pub mod graph;
pub mod ingestion;
pub mod license;
pub mod persistence;

pub use graph::{GraphClient, GraphError, GremlinClient};
pub use ingestion::{HttpIngestionClient, IngestError, IngestionClient};
pub use license::{HttpLicenseAnalyzer, LicenseAnalyzer, LicenseError};
pub use persistence::{HttpResultStore, PersistError, ResultStore};
