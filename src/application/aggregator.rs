//! Stack aggregation pipeline
//!
//! Orchestrates the run: normalize the request, batch-query the graph store,
//! build per-package details, denormalize them back onto the dependency
//! graph, attach the license analysis and produce the tier-shaped result.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::errors::AggregationError;
use super::version::VersionComparator;
use crate::config::Config;
use crate::domain::vulnerability::{
    partition_vulnerabilities, BasicVulnerabilityFields, PremiumVulnerabilityFields,
};
use crate::domain::{
    AggregationEnvelope, Audit, GitHubDetails, NormalizedPackages, Package, PackageDeclaration,
    PackageDetails, StackAggregatorResult, Vulnerability,
};
use crate::infrastructure::graph::nodes::{GraphRecord, VulnerabilityNode};
use crate::infrastructure::{GraphClient, IngestionClient, LicenseAnalyzer, ResultStore};

/// Ecosystems the graph store carries data for.
const KNOWN_ECOSYSTEMS: &[&str] = &["npm", "pypi", "maven", "golang"];

/// Inbound aggregation request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackAggregatorRequest {
    #[serde(default)]
    pub external_request_id: String,
    #[serde(default)]
    pub ecosystem: String,
    #[serde(default)]
    pub registration_status: String,
    #[serde(default)]
    pub packages: Vec<PackageDeclaration>,
}

/// Output-shape strategy: which vulnerability field set gets projected and
/// whether the result carries a registration link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Freetier,
    Registered,
}

impl Tier {
    /// `"registered"` selects the registered tier; any other value falls back
    /// to free tier.
    pub fn from_registration_status(status: &str) -> Self {
        if status == "registered" {
            Self::Registered
        } else {
            Self::Freetier
        }
    }

    fn create_vulnerability(&self, node: &VulnerabilityNode) -> Vulnerability {
        match self {
            Self::Freetier => Vulnerability::Basic(BasicVulnerabilityFields::from_node(node)),
            Self::Registered => {
                Vulnerability::Premium(PremiumVulnerabilityFields::from_node(node))
            }
        }
    }

    fn registration_link(&self, config: &Config) -> Option<String> {
        match self {
            Self::Freetier => Some(config.advisory.signin_url.clone()),
            Self::Registered => None,
        }
    }
}

/// State of one aggregation run. `fetch_details` must run before
/// `get_result`.
pub struct Aggregator {
    config: Arc<Config>,
    tier: Tier,
    request: StackAggregatorRequest,
    normalized: NormalizedPackages,
    details: HashMap<Package, PackageDetails>,
}

impl Aggregator {
    fn new(config: Arc<Config>, request: StackAggregatorRequest) -> Self {
        let tier = Tier::from_registration_status(&request.registration_status);
        let normalized = NormalizedPackages::new(&request.packages, request.ecosystem.clone());
        Self {
            config,
            tier,
            request,
            normalized,
            details: HashMap::new(),
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn normalized(&self) -> &NormalizedPackages {
        &self.normalized
    }

    /// Populate the per-package detail map from the graph store.
    ///
    /// Queries run in contiguous batches of at most `graph.batch_size`
    /// packages, order preserved. A failed batch contributes zero records and
    /// never aborts the remaining batches; its packages surface downstream as
    /// unknown dependencies.
    async fn fetch_details(&mut self, graph: &dyn GraphClient) {
        let fetch_started = Instant::now();
        let ecosystem = self.normalized.ecosystem().to_string();
        let mut records = Vec::new();

        for batch in self
            .normalized
            .all_dependencies()
            .chunks(self.config.graph.batch_size)
        {
            match graph.package_details(&ecosystem, batch).await {
                Ok(mut batch_records) => records.append(&mut batch_records),
                Err(error) => warn!(
                    %error,
                    batch_size = batch.len(),
                    "graph batch query failed, continuing with partial results"
                ),
            }
        }
        info!(
            elapsed_ms = fetch_started.elapsed().as_millis() as u64,
            total_results = records.len(),
            "fetched package details from graph"
        );

        for record in &records {
            let (package, details) = self.build_package_details(record, graph).await;
            self.details.insert(package, details);
        }
    }

    /// Join one graph record into a detail record keyed by package identity.
    async fn build_package_details(
        &self,
        record: &GraphRecord,
        graph: &dyn GraphClient,
    ) -> (Package, PackageDetails) {
        let ecosystem = record.version.ecosystem();
        let package = Package::new(record.version.name(), record.version.version());
        let comparator = VersionComparator::for_ecosystem(&ecosystem);

        let (public_vulnerabilities, private_vulnerabilities) =
            partition_vulnerabilities(&record.vuln, |node| self.tier.create_vulnerability(node));

        let mut recommended_version = None;
        if !public_vulnerabilities.is_empty() || !private_vulnerabilities.is_empty() {
            let precomputed = record.package.latest_non_cve_version();
            recommended_version = if precomputed.is_empty() {
                // Missing precomputed data; the live query is the slow path.
                warn!(
                    ecosystem = %ecosystem,
                    name = %package.name,
                    version = %package.version,
                    "falling back to graph query for latest non-CVE version"
                );
                self.recommended_version(graph, &ecosystem, &package, comparator)
                    .await
            } else {
                Some(precomputed)
            };
        }

        let registry_latest = record.package.registry_latest_version();
        let graph_latest = record.package.latest_version();
        let latest_version = comparator.select_latest([
            package.version.as_str(),
            registry_latest.as_str(),
            graph_latest.as_str(),
        ]);

        let details = PackageDetails {
            name: package.name.clone(),
            version: package.version.clone(),
            ecosystem: ecosystem.clone(),
            latest_version,
            recommended_version,
            github: GitHubDetails::from_package_node(&record.package),
            licenses: record.version.declared_licenses(),
            url: self.config.advisory.package_url(&ecosystem, &package.name),
            public_vulnerabilities,
            private_vulnerabilities,
            dependencies: Vec::new(),
            vulnerable_dependencies: Vec::new(),
        };
        (package, details)
    }

    /// Greatest CVE-free version of the package, iff strictly greater than
    /// its current version.
    async fn recommended_version(
        &self,
        graph: &dyn GraphClient,
        ecosystem: &str,
        package: &Package,
        comparator: VersionComparator,
    ) -> Option<String> {
        let versions = match graph.non_cve_versions(ecosystem, &package.name).await {
            Ok(versions) => versions,
            Err(error) => {
                warn!(%error, name = %package.name, "non-CVE version query failed");
                return None;
            }
        };
        if versions.is_empty() {
            return None;
        }
        let mut recommended = package.version.clone();
        for version in &versions {
            recommended = comparator.select_latest([recommended.as_str(), version.as_str()]);
        }
        (recommended != package.version).then_some(recommended)
    }

    /// Re-attach detail records onto the dependency graph structure.
    ///
    /// Each direct dependency present in the detail map yields a clone with
    /// `dependencies` set to its full declared transitive list and
    /// `vulnerable_dependencies` to clones of the transitive details carrying
    /// at least one vulnerability. Canonical map entries stay unmutated.
    fn denormalized_details(&self) -> Vec<PackageDetails> {
        let mut denormalized = Vec::new();
        for direct in self.normalized.direct_dependencies() {
            let Some(details) = self.details.get(direct) else {
                // Not found in the graph; surfaces via unknown_dependencies.
                continue;
            };
            let mut details = details.clone();
            let transitives = self.normalized.transitives_of(direct).unwrap_or(&[]);
            details.dependencies = transitives.to_vec();
            details.vulnerable_dependencies = transitives
                .iter()
                .filter_map(|transitive| self.details.get(transitive))
                .filter(|transitive_details| transitive_details.has_vulnerabilities())
                .cloned()
                .collect();
            denormalized.push(details);
        }
        denormalized
    }

    /// Direct dependencies absent from the detail map, in declared order.
    fn direct_unknown_packages(&self) -> Vec<Package> {
        self.normalized
            .direct_dependencies()
            .iter()
            .filter(|package| !self.details.contains_key(package))
            .cloned()
            .collect()
    }

    /// Every dependency (direct or transitive) absent from the detail map.
    pub fn all_unknown_packages(&self) -> Vec<Package> {
        self.normalized
            .all_dependencies()
            .iter()
            .filter(|package| !self.details.contains_key(package))
            .cloned()
            .collect()
    }

    /// Aggregate the fetched data into the tier-shaped result.
    pub async fn get_result(
        &self,
        license: &dyn LicenseAnalyzer,
    ) -> Result<StackAggregatorResult, AggregationError> {
        let analyzed_dependencies = self.denormalized_details();
        let unknown_dependencies = self.direct_unknown_packages();
        let license_analysis = license.analyze_stack(&analyzed_dependencies).await?;
        Ok(StackAggregatorResult {
            external_request_id: self.request.external_request_id.clone(),
            ecosystem: self.normalized.ecosystem().to_string(),
            analyzed_dependencies,
            unknown_dependencies,
            license_analysis,
            registration_link: self.tier.registration_link(&self.config),
        })
    }
}

/// Per-package outcome of the best-effort unknown-package ingestion flow.
enum IngestOutcome {
    Ok(Package),
    Failed(Package, String),
}

/// Service wiring the pipeline to its external collaborators. One instance
/// serves all requests; all state is per-run.
pub struct StackAggregatorService {
    config: Arc<Config>,
    graph: Arc<dyn GraphClient>,
    license: Arc<dyn LicenseAnalyzer>,
    store: Arc<dyn ResultStore>,
    ingestion: Arc<dyn IngestionClient>,
}

impl StackAggregatorService {
    pub fn new(
        config: Arc<Config>,
        graph: Arc<dyn GraphClient>,
        license: Arc<dyn LicenseAnalyzer>,
        store: Arc<dyn ResultStore>,
        ingestion: Arc<dyn IngestionClient>,
    ) -> Self {
        Self {
            config,
            graph,
            license,
            store,
            ingestion,
        }
    }

    fn validate(request: &StackAggregatorRequest) -> Result<(), AggregationError> {
        if request.external_request_id.is_empty() {
            return Err(AggregationError::Validation(
                "external_request_id is required".to_string(),
            ));
        }
        if request.ecosystem.is_empty() {
            return Err(AggregationError::Validation(
                "ecosystem is required".to_string(),
            ));
        }
        if !KNOWN_ECOSYSTEMS.contains(&request.ecosystem.as_str()) {
            return Err(AggregationError::Validation(format!(
                "unrecognized ecosystem '{}'",
                request.ecosystem
            )));
        }
        Ok(())
    }

    /// Validate, normalize and fetch. The returned aggregator is ready for
    /// `get_result`.
    pub async fn process_request(
        &self,
        request: StackAggregatorRequest,
    ) -> Result<Aggregator, AggregationError> {
        Self::validate(&request)?;
        let mut aggregator = Aggregator::new(Arc::clone(&self.config), request);
        aggregator.fetch_details(self.graph.as_ref()).await;
        Ok(aggregator)
    }

    /// Run one full aggregation: fetch, aggregate, audit, persist (when
    /// requested), trigger unknown-package ingestion and wrap the envelope.
    pub async fn execute(
        &self,
        request: StackAggregatorRequest,
        persist: bool,
    ) -> Result<AggregationEnvelope, AggregationError> {
        let started_at = Audit::timestamp(Utc::now());
        let aggregator = self.process_request(request).await?;
        let result = aggregator.get_result(self.license.as_ref()).await?;
        let ended_at = Audit::timestamp(Utc::now());

        let audit = Audit {
            started_at: started_at.clone(),
            ended_at: ended_at.clone(),
            version: Audit::VERSION.to_string(),
        };
        let mut result_json = serde_json::to_value(&result)?;
        result_json["_audit"] = serde_json::to_value(&audit)?;

        if persist {
            self.store
                .persist(
                    &result.external_request_id,
                    &result_json,
                    &self.config.persistence.worker_name,
                    &started_at,
                    &ended_at,
                )
                .await?;
            info!(
                external_request_id = %result.external_request_id,
                "aggregation result persisted"
            );
        }

        self.ingest_unknown_packages(&aggregator).await;

        Ok(AggregationEnvelope::success(
            result.external_request_id.clone(),
            result_json,
        ))
    }

    /// Best-effort ingestion of every package the graph does not know.
    /// Failures are logged in aggregate and never affect the returned result.
    async fn ingest_unknown_packages(&self, aggregator: &Aggregator) {
        let unknown = aggregator.all_unknown_packages();
        if self.config.ingestion.disable_unknown_package_flow {
            warn!(
                skipped = unknown.len(),
                "unknown-package ingestion disabled by configuration"
            );
            return;
        }
        if unknown.is_empty() {
            return;
        }

        let ecosystem = aggregator.normalized().ecosystem().to_string();
        let mut outcomes = Vec::with_capacity(unknown.len());
        for package in unknown {
            let outcome = match self
                .ingestion
                .create_analysis(&ecosystem, &package.name, &package.version, true, false, true)
                .await
            {
                Ok(()) => IngestOutcome::Ok(package),
                Err(error) => IngestOutcome::Failed(package, error.to_string()),
            };
            outcomes.push(outcome);
        }

        let failed: Vec<String> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                IngestOutcome::Failed(package, reason) => Some(format!("{}: {}", package, reason)),
                IngestOutcome::Ok(_) => None,
            })
            .collect();
        if failed.is_empty() {
            info!(
                requested = outcomes.len(),
                "unknown-package ingestion requested"
            );
        } else {
            error!(
                requested = outcomes.len(),
                failed = failed.len(),
                reasons = ?failed,
                "unknown-package ingestion partially failed"
            );
        }
    }
}
