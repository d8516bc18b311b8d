//! Stackscope - stack analysis aggregation service
//!
//! Given a submitted dependency stack, the service queries a graph store for
//! each package's metadata (GitHub activity, licenses, vulnerability
//! records), denormalizes the results back onto the stack's dependency graph
//! and produces a tiered report with license-conflict analysis and the
//! packages unknown to the graph.
//!
//! # Architecture
//!
//! ```text
//! stackscope/
//! ├── domain/           # Package identity, normalized stack, result shapes
//! ├── application/      # Aggregation pipeline, version selection, errors
//! ├── infrastructure/   # Graph store, license, persistence, ingestion clients
//! ├── presentation/     # axum routes and DTOs
//! └── config/           # Process-wide immutable configuration
//! ```
//!
//! # Configuration
//!
//! Environment variables use the `STACKSCOPE__` prefix with double underscore
//! separators:
//!
//! ```bash
//! STACKSCOPE__SERVER__PORT=5000
//! STACKSCOPE__GRAPH__BATCH_SIZE=100
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

mod app;

pub use app::create_app;
pub use config::Config;
pub use logging::init_tracing;
