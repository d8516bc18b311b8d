//! Typed views over graph traversal records
//!
//! The graph store returns every node property as a multi-valued list
//! (`valueMap()` semantics). These structures resolve that shape once at
//! parse time; the rest of the pipeline never touches raw JSON.

use serde::{Deserialize, Deserializer, Serialize};

/// One record of the package-details traversal, keyed by traversal aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GraphRecord {
    pub package: PackageNode,
    pub version: VersionNode,
    pub vuln: Vec<VulnerabilityNode>,
}

/// Scalar graph property. The store is loosely typed, so strings, numbers and
/// booleans all normalize to their string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scalar(pub String);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let text = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        Ok(Scalar(text))
    }
}

/// Truthy-token set for boolean graph attributes: `true`, `"true"`, `1`, `"1"`
/// all normalize to a truthy scalar.
pub(crate) fn is_truthy(raw: &str) -> bool {
    matches!(raw, "true" | "True" | "1")
}

fn first_string(values: &[Scalar]) -> String {
    values.first().map(|s| s.0.clone()).unwrap_or_default()
}

fn first_count(values: &[i64]) -> i64 {
    values.first().copied().unwrap_or(-1)
}

fn strings(values: &[Scalar]) -> Vec<String> {
    values.iter().map(|s| s.0.clone()).collect()
}

/// Graph package node: repository statistics plus precomputed version hints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageNode {
    dependent_projects: Vec<i64>,
    dependent_repos: Vec<i64>,
    total_releases: Vec<i64>,
    latest_release_epoch: Vec<f64>,
    issues_month_opened: Vec<i64>,
    issues_month_closed: Vec<i64>,
    issues_year_opened: Vec<i64>,
    issues_year_closed: Vec<i64>,
    prs_month_opened: Vec<i64>,
    prs_month_closed: Vec<i64>,
    prs_year_opened: Vec<i64>,
    prs_year_closed: Vec<i64>,
    stargazers: Vec<i64>,
    forks: Vec<i64>,
    refreshed_on: Vec<Scalar>,
    open_issues_count: Vec<i64>,
    contributors_count: Vec<i64>,
    used_by: Vec<Scalar>,
    latest_version: Vec<Scalar>,
    registry_latest_version: Vec<Scalar>,
    latest_non_cve_version: Vec<Scalar>,
}

impl PackageNode {
    pub fn dependent_projects(&self) -> i64 {
        first_count(&self.dependent_projects)
    }

    pub fn dependent_repos(&self) -> i64 {
        first_count(&self.dependent_repos)
    }

    pub fn total_releases(&self) -> i64 {
        first_count(&self.total_releases)
    }

    pub fn latest_release_epoch(&self) -> Option<f64> {
        self.latest_release_epoch.first().copied()
    }

    pub fn issues_month_opened(&self) -> i64 {
        first_count(&self.issues_month_opened)
    }

    pub fn issues_month_closed(&self) -> i64 {
        first_count(&self.issues_month_closed)
    }

    pub fn issues_year_opened(&self) -> i64 {
        first_count(&self.issues_year_opened)
    }

    pub fn issues_year_closed(&self) -> i64 {
        first_count(&self.issues_year_closed)
    }

    pub fn prs_month_opened(&self) -> i64 {
        first_count(&self.prs_month_opened)
    }

    pub fn prs_month_closed(&self) -> i64 {
        first_count(&self.prs_month_closed)
    }

    pub fn prs_year_opened(&self) -> i64 {
        first_count(&self.prs_year_opened)
    }

    pub fn prs_year_closed(&self) -> i64 {
        first_count(&self.prs_year_closed)
    }

    pub fn stargazers(&self) -> i64 {
        first_count(&self.stargazers)
    }

    pub fn forks(&self) -> i64 {
        first_count(&self.forks)
    }

    pub fn refreshed_on(&self) -> String {
        self.refreshed_on
            .first()
            .map(|s| s.0.clone())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn open_issues_count(&self) -> i64 {
        first_count(&self.open_issues_count)
    }

    pub fn contributors_count(&self) -> i64 {
        first_count(&self.contributors_count)
    }

    pub fn used_by(&self) -> Vec<String> {
        strings(&self.used_by)
    }

    /// Graph-reported latest version.
    pub fn latest_version(&self) -> String {
        first_string(&self.latest_version)
    }

    /// Registry-reported latest version.
    pub fn registry_latest_version(&self) -> String {
        first_string(&self.registry_latest_version)
    }

    /// Precomputed CVE-free latest version; empty when ingestion has not
    /// produced one yet.
    pub fn latest_non_cve_version(&self) -> String {
        first_string(&self.latest_non_cve_version)
    }
}

/// Graph version node: package identity plus declared licenses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VersionNode {
    name: Vec<Scalar>,
    version: Vec<Scalar>,
    ecosystem: Vec<Scalar>,
    declared_licenses: Vec<Scalar>,
}

impl VersionNode {
    pub fn name(&self) -> String {
        first_string(&self.name)
    }

    pub fn version(&self) -> String {
        first_string(&self.version)
    }

    pub fn ecosystem(&self) -> String {
        first_string(&self.ecosystem)
    }

    pub fn declared_licenses(&self) -> Vec<String> {
        strings(&self.declared_licenses)
    }
}

/// Graph vulnerability node attached to a version via the CVE edge.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VulnerabilityNode {
    vuln_id: Vec<Scalar>,
    cvss: Vec<Scalar>,
    cve_ids: Vec<Scalar>,
    cvss_v3: Vec<Scalar>,
    cwes: Vec<Scalar>,
    severity: Vec<Scalar>,
    title: Vec<Scalar>,
    url: Vec<Scalar>,
    private_vulnerability: Vec<Scalar>,
    description: Vec<Scalar>,
    exploit: Vec<Scalar>,
    malicious: Vec<Scalar>,
    patch_exists: Vec<Scalar>,
    fixable: Vec<Scalar>,
    fixed_in: Vec<Scalar>,
}

impl VulnerabilityNode {
    /// A node is private iff the first element of its flag is truthy.
    pub fn is_private(&self) -> bool {
        self.private_vulnerability
            .first()
            .map(|s| is_truthy(&s.0))
            .unwrap_or(false)
    }

    pub fn vuln_id(&self) -> String {
        first_string(&self.vuln_id)
    }

    pub fn cvss(&self) -> String {
        first_string(&self.cvss)
    }

    pub fn cve_ids(&self) -> Vec<String> {
        strings(&self.cve_ids)
    }

    pub fn cvss_v3(&self) -> String {
        first_string(&self.cvss_v3)
    }

    pub fn cwes(&self) -> Vec<String> {
        strings(&self.cwes)
    }

    pub fn severity(&self) -> String {
        first_string(&self.severity)
    }

    pub fn title(&self) -> String {
        first_string(&self.title)
    }

    pub fn url(&self) -> String {
        first_string(&self.url)
    }

    pub fn description(&self) -> String {
        first_string(&self.description)
    }

    pub fn exploit(&self) -> String {
        first_string(&self.exploit)
    }

    pub fn malicious(&self) -> String {
        first_string(&self.malicious)
    }

    pub fn patch_exists(&self) -> String {
        first_string(&self.patch_exists)
    }

    pub fn fixable(&self) -> String {
        first_string(&self.fixable)
    }

    pub fn fixed_in(&self) -> Vec<String> {
        strings(&self.fixed_in)
    }
}
