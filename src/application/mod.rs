//! Application layer: the aggregation pipeline and its supporting services

pub mod aggregator;
pub mod errors;
pub mod version;

pub use aggregator::{Aggregator, StackAggregatorRequest, StackAggregatorService, Tier};
pub use errors::AggregationError;
pub use version::VersionComparator;
