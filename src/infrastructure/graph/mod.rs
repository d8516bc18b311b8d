//! Graph store integration
//!
//! [`nodes`] holds the typed traversal-record structures; [`client`] holds the
//! port trait and the Gremlin HTTP implementation.

pub mod client;
pub mod nodes;

pub use client::{GraphClient, GraphError, GremlinClient};
pub use nodes::{GraphRecord, PackageNode, VersionNode, VulnerabilityNode};
