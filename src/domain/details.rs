//! Per-package detail record produced by the aggregation pipeline

use serde::{Deserialize, Serialize};

use super::github::GitHubDetails;
use super::package::Package;
use super::vulnerability::Vulnerability;

/// Everything the report carries for one analyzed package.
///
/// Built once per unique package from its graph record. `dependencies` and
/// `vulnerable_dependencies` stay empty until denormalization, which fills
/// them on a clone — the canonical map entry is never mutated so it can be
/// reused as a transitive reference elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDetails {
    pub name: String,
    pub version: String,
    pub ecosystem: String,
    pub latest_version: String,
    pub recommended_version: Option<String>,
    pub github: GitHubDetails,
    pub licenses: Vec<String>,
    /// External vulnerability-advisory link for this package.
    pub url: String,
    pub public_vulnerabilities: Vec<Vulnerability>,
    pub private_vulnerabilities: Vec<Vulnerability>,
    #[serde(default)]
    pub dependencies: Vec<Package>,
    #[serde(default)]
    pub vulnerable_dependencies: Vec<PackageDetails>,
}

impl PackageDetails {
    pub fn package(&self) -> Package {
        Package::new(self.name.clone(), self.version.clone())
    }

    pub fn has_vulnerabilities(&self) -> bool {
        !self.public_vulnerabilities.is_empty() || !self.private_vulnerabilities.is_empty()
    }
}
