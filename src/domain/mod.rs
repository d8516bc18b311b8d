//! Core domain models for stack aggregation
//!
//! Pure data types: package identity, the normalized stack view, graph-derived
//! detail records, and the terminal result shapes. No I/O happens here.

pub mod details;
pub mod github;
pub mod normalized;
pub mod package;
pub mod result;
pub mod vulnerability;

pub use details::PackageDetails;
pub use github::GitHubDetails;
pub use normalized::NormalizedPackages;
pub use package::{Package, PackageDeclaration};
pub use result::{AggregationEnvelope, AggregationStatus, Audit, StackAggregatorResult};
pub use vulnerability::{BasicVulnerabilityFields, PremiumVulnerabilityFields, Vulnerability};
