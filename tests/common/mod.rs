//! Shared mocks and fixtures for integration tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use stackscope::application::{StackAggregatorRequest, StackAggregatorService};
use stackscope::config::Config;
use stackscope::domain::{Package, PackageDeclaration, PackageDetails};
use stackscope::infrastructure::graph::{GraphClient, GraphError, GraphRecord};
use stackscope::infrastructure::ingestion::{IngestError, IngestionClient};
use stackscope::infrastructure::license::{LicenseAnalyzer, LicenseError};
use stackscope::infrastructure::persistence::{PersistError, ResultStore};

/// Graph store mock serving canned records keyed by (name, version).
#[derive(Default)]
pub struct MockGraphClient {
    records: HashMap<Package, serde_json::Value>,
    non_cve_versions: HashMap<String, Vec<String>>,
    pub fail_batches: bool,
    pub non_cve_queries: Mutex<Vec<String>>,
}

impl MockGraphClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, name: &str, version: &str, record: serde_json::Value) -> Self {
        self.records
            .insert(Package::new(name, version), record);
        self
    }

    pub fn with_non_cve_versions(mut self, name: &str, versions: &[&str]) -> Self {
        self.non_cve_versions.insert(
            name.to_string(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl GraphClient for MockGraphClient {
    async fn package_details(
        &self,
        _ecosystem: &str,
        packages: &[Package],
    ) -> Result<Vec<GraphRecord>, GraphError> {
        if self.fail_batches {
            return Err(GraphError::Status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        let records = packages
            .iter()
            .filter_map(|package| self.records.get(package))
            .map(|value| serde_json::from_value(value.clone()).unwrap())
            .collect();
        Ok(records)
    }

    async fn non_cve_versions(
        &self,
        _ecosystem: &str,
        name: &str,
    ) -> Result<Vec<String>, GraphError> {
        self.non_cve_queries.lock().unwrap().push(name.to_string());
        Ok(self.non_cve_versions.get(name).cloned().unwrap_or_default())
    }
}

/// License service mock echoing the analyzed package names.
pub struct MockLicenseAnalyzer {
    pub fail: bool,
}

impl MockLicenseAnalyzer {
    pub fn new() -> Self {
        Self { fail: false }
    }
}

#[async_trait]
impl LicenseAnalyzer for MockLicenseAnalyzer {
    async fn analyze_stack(
        &self,
        packages: &[PackageDetails],
    ) -> Result<serde_json::Value, LicenseError> {
        if self.fail {
            return Err(LicenseError::Status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        Ok(json!({ "status": "successful", "packages": names }))
    }
}

/// Result store mock recording every persisted run.
#[derive(Default)]
pub struct MockResultStore {
    pub persisted: Mutex<Vec<(String, serde_json::Value)>>,
}

#[async_trait]
impl ResultStore for MockResultStore {
    async fn persist(
        &self,
        external_request_id: &str,
        task_result: &serde_json::Value,
        _worker: &str,
        _started_at: &str,
        _ended_at: &str,
    ) -> Result<(), PersistError> {
        self.persisted
            .lock()
            .unwrap()
            .push((external_request_id.to_string(), task_result.clone()));
        Ok(())
    }
}

/// Ingestion mock recording every triggered analysis.
#[derive(Default)]
pub struct MockIngestionClient {
    pub requested: Mutex<Vec<Package>>,
    pub fail: bool,
}

impl MockIngestionClient {
    pub fn failing() -> Self {
        Self {
            requested: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl IngestionClient for MockIngestionClient {
    async fn create_analysis(
        &self,
        _ecosystem: &str,
        name: &str,
        version: &str,
        _api_flow: bool,
        _force: bool,
        _force_graph_sync: bool,
    ) -> Result<(), IngestError> {
        self.requested
            .lock()
            .unwrap()
            .push(Package::new(name, version));
        if self.fail {
            return Err(IngestError::Status(reqwest::StatusCode::BAD_GATEWAY));
        }
        Ok(())
    }
}

pub struct TestHarness {
    pub service: StackAggregatorService,
    pub store: Arc<MockResultStore>,
    pub ingestion: Arc<MockIngestionClient>,
    pub graph: Arc<MockGraphClient>,
}

pub fn harness(graph: MockGraphClient) -> TestHarness {
    harness_with(graph, MockLicenseAnalyzer::new(), Config::default())
}

pub fn harness_with(
    graph: MockGraphClient,
    license: MockLicenseAnalyzer,
    config: Config,
) -> TestHarness {
    harness_full(graph, license, MockIngestionClient::default(), config)
}

pub fn harness_full(
    graph: MockGraphClient,
    license: MockLicenseAnalyzer,
    ingestion: MockIngestionClient,
    config: Config,
) -> TestHarness {
    let graph = Arc::new(graph);
    let store = Arc::new(MockResultStore::default());
    let ingestion = Arc::new(ingestion);
    let service = StackAggregatorService::new(
        Arc::new(config),
        Arc::clone(&graph) as Arc<dyn GraphClient>,
        Arc::new(license),
        Arc::clone(&store) as Arc<dyn ResultStore>,
        Arc::clone(&ingestion) as Arc<dyn IngestionClient>,
    );
    TestHarness {
        service,
        store,
        ingestion,
        graph,
    }
}

pub fn declaration(name: &str, version: &str, deps: Vec<PackageDeclaration>) -> PackageDeclaration {
    PackageDeclaration {
        name: name.to_string(),
        version: version.to_string(),
        dependencies: deps,
    }
}

pub fn request(
    ecosystem: &str,
    registration_status: &str,
    packages: Vec<PackageDeclaration>,
) -> StackAggregatorRequest {
    StackAggregatorRequest {
        external_request_id: "req-test-1".to_string(),
        ecosystem: ecosystem.to_string(),
        registration_status: registration_status.to_string(),
        packages,
    }
}

/// Graph record for one package/version with the given vulnerability nodes.
pub fn graph_record(
    name: &str,
    version: &str,
    ecosystem: &str,
    package_node: serde_json::Value,
    vulns: Vec<serde_json::Value>,
) -> serde_json::Value {
    json!({
        "package": package_node,
        "version": {
            "name": [name],
            "version": [version],
            "ecosystem": [ecosystem],
            "declared_licenses": ["MIT"]
        },
        "vuln": vulns
    })
}

pub fn public_vuln(id: &str) -> serde_json::Value {
    json!({
        "vuln_id": [id],
        "cvss": ["7.5"],
        "cve_ids": ["CVE-2020-8203"],
        "cvss_v3": ["CVSS:3.1/AV:N/AC:H/PR:N/UI:N/S:U/C:N/I:H/A:H"],
        "cwes": ["CWE-770"],
        "severity": ["high"],
        "title": ["Prototype Pollution"],
        "url": ["https://advisories.invalid/".to_string() + id],
        "description": ["Prototype pollution in zipObjectDeep."],
        "exploit": ["Not Defined"],
        "malicious": ["false"],
        "patch_exists": ["false"],
        "fixable": ["true"],
        "fixed_in": ["4.17.19"]
    })
}

pub fn private_vuln(id: &str) -> serde_json::Value {
    let mut vuln = public_vuln(id);
    vuln["private_vulnerability"] = json!([true]);
    vuln
}
