//! Gremlin graph store client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::nodes::GraphRecord;
use crate::config::GraphConfig;
use crate::domain::Package;

/// Traversal resolving package, version and vulnerability nodes for a bound
/// list of `{name, version}` pairs within one ecosystem.
const PACKAGE_DETAILS_QUERY: &str = "\
epv = [];
packages.each {
    g.V().has('ecosystem', ecosystem).
    has('name', it.name).
    has('version', it.version).as('version', 'vuln').
    select('version').in('has_version').dedup().as('package').
    select('package', 'version', 'vuln').
    by(valueMap()).
    by(valueMap()).
    by(out('has_cve').valueMap().fold()).
    fill(epv);
}
epv;";

/// Traversal listing every version of a package without a CVE edge.
const NON_CVE_VERSIONS_QUERY: &str = "\
g.V().has('ecosystem', eco).has('name', name).
out('has_version').not(out('has_cve')).values('version');";

/// Errors from graph store queries.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("graph query transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("graph store returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Port for the external graph store.
///
/// One implementation per deployment; tests supply hand-rolled mocks.
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Resolve metadata and vulnerabilities for a size-bounded package list.
    async fn package_details(
        &self,
        ecosystem: &str,
        packages: &[Package],
    ) -> Result<Vec<GraphRecord>, GraphError>;

    /// List every known version of a package lacking any CVE record.
    async fn non_cve_versions(
        &self,
        ecosystem: &str,
        name: &str,
    ) -> Result<Vec<String>, GraphError>;
}

#[derive(Debug, Serialize)]
struct GremlinRequest<B: Serialize> {
    gremlin: &'static str,
    bindings: B,
}

#[derive(Debug, Serialize)]
struct PackageDetailsBindings<'a> {
    ecosystem: &'a str,
    packages: Vec<&'a Package>,
}

#[derive(Debug, Serialize)]
struct NonCveVersionsBindings<'a> {
    eco: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GremlinResponse<T> {
    result: GremlinResult<T>,
}

#[derive(Debug, Deserialize)]
struct GremlinResult<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// HTTP client for a Gremlin server endpoint.
pub struct GremlinClient {
    client: Client,
    url: String,
}

impl GremlinClient {
    pub fn new(config: &GraphConfig) -> Result<Self, GraphError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    async fn post<B, T>(&self, request: &GremlinRequest<B>) -> Result<Vec<T>, GraphError>
    where
        B: Serialize + Sync,
        T: for<'de> Deserialize<'de>,
    {
        let response = self.client.post(&self.url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(GraphError::Status(response.status()));
        }
        let body: GremlinResponse<T> = response.json().await?;
        Ok(body.result.data)
    }
}

#[async_trait]
impl GraphClient for GremlinClient {
    async fn package_details(
        &self,
        ecosystem: &str,
        packages: &[Package],
    ) -> Result<Vec<GraphRecord>, GraphError> {
        self.post(&GremlinRequest {
            gremlin: PACKAGE_DETAILS_QUERY,
            bindings: PackageDetailsBindings {
                ecosystem,
                packages: packages.iter().collect(),
            },
        })
        .await
    }

    async fn non_cve_versions(
        &self,
        ecosystem: &str,
        name: &str,
    ) -> Result<Vec<String>, GraphError> {
        self.post(&GremlinRequest {
            gremlin: NON_CVE_VERSIONS_QUERY,
            bindings: NonCveVersionsBindings {
                eco: ecosystem,
                name,
            },
        })
        .await
    }
}
