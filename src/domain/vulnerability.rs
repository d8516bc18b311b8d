//! Vulnerability records and tier-specific field projection

use serde::{Deserialize, Serialize};

use crate::infrastructure::graph::nodes::{is_truthy, VulnerabilityNode};

/// Fields visible to every tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicVulnerabilityFields {
    pub id: String,
    pub cvss: String,
    pub cve_ids: Vec<String>,
    pub cvss_v3: String,
    pub cwes: Vec<String>,
    pub severity: String,
    pub title: String,
    pub url: String,
}

/// Fields visible to registered users only, on top of the basic set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumVulnerabilityFields {
    #[serde(flatten)]
    pub basic: BasicVulnerabilityFields,
    pub description: String,
    pub exploit: String,
    pub malicious: bool,
    pub patch_exists: bool,
    pub fixable: bool,
    pub fixed_in: Vec<String>,
}

/// One vulnerability record, shaped by the requesting user's tier.
///
/// The `private` flag on the source node selects the public/private bucket;
/// the tier only controls which field set is projected at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vulnerability {
    Premium(PremiumVulnerabilityFields),
    Basic(BasicVulnerabilityFields),
}

impl Vulnerability {
    pub fn basic_fields(&self) -> &BasicVulnerabilityFields {
        match self {
            Self::Basic(fields) => fields,
            Self::Premium(fields) => &fields.basic,
        }
    }
}

impl BasicVulnerabilityFields {
    /// Project the free-tier field set out of one graph node.
    ///
    /// Scalar fields take the first element of their multi-valued attribute
    /// with an empty-string fallback; CVE-ID and CWE lists keep their full
    /// sequence.
    pub fn from_node(node: &VulnerabilityNode) -> Self {
        Self {
            id: node.vuln_id(),
            cvss: node.cvss(),
            cve_ids: node.cve_ids(),
            cvss_v3: node.cvss_v3(),
            cwes: node.cwes(),
            severity: node.severity(),
            title: node.title(),
            url: node.url(),
        }
    }
}

impl PremiumVulnerabilityFields {
    /// Project the registered-user field set: the basic set plus the premium
    /// fields, booleans derived from the raw string's truthiness.
    pub fn from_node(node: &VulnerabilityNode) -> Self {
        Self {
            basic: BasicVulnerabilityFields::from_node(node),
            description: node.description(),
            exploit: node.exploit(),
            malicious: is_truthy(&node.malicious()),
            patch_exists: is_truthy(&node.patch_exists()),
            fixable: is_truthy(&node.fixable()),
            fixed_in: node.fixed_in(),
        }
    }
}

/// Partition vulnerability nodes into (public, private) sequences preserving
/// encounter order. The projection applied to each node is supplied by the
/// tier strategy.
pub fn partition_vulnerabilities<F>(
    nodes: &[VulnerabilityNode],
    project: F,
) -> (Vec<Vulnerability>, Vec<Vulnerability>)
where
    F: Fn(&VulnerabilityNode) -> Vulnerability,
{
    let mut public = Vec::new();
    let mut private = Vec::new();
    for node in nodes {
        if node.is_private() {
            private.push(project(node));
        } else {
            public.push(project(node));
        }
    }
    (public, private)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: serde_json::Value) -> VulnerabilityNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_basic_projection_with_defaults() {
        let fields = BasicVulnerabilityFields::from_node(&node(json!({
            "vuln_id": ["VULN-1"],
            "severity": ["high"],
            "title": ["Prototype pollution"],
            "url": ["https://example.invalid/VULN-1"],
            "cve_ids": ["CVE-2020-0001", "CVE-2020-0002"],
            "cwes": ["CWE-400"]
        })));

        assert_eq!(fields.id, "VULN-1");
        assert_eq!(fields.cvss, "");
        assert_eq!(fields.cvss_v3, "");
        assert_eq!(fields.cve_ids.len(), 2);
        assert_eq!(fields.cwes, vec!["CWE-400"]);
    }

    #[test]
    fn test_premium_projection_boolean_membership() {
        let fields = PremiumVulnerabilityFields::from_node(&node(json!({
            "vuln_id": ["VULN-2"],
            "malicious": ["true"],
            "patch_exists": ["1"],
            "fixable": ["no"],
            "fixed_in": ["4.17.21"]
        })));

        assert!(fields.malicious);
        assert!(fields.patch_exists);
        assert!(!fields.fixable);
        assert_eq!(fields.fixed_in, vec!["4.17.21"]);
    }

    #[test]
    fn test_partition_is_a_disjoint_cover() {
        let nodes = vec![
            node(json!({"vuln_id": ["A"], "private_vulnerability": [false]})),
            node(json!({"vuln_id": ["B"], "private_vulnerability": [true]})),
            node(json!({"vuln_id": ["C"]})),
        ];

        let (public, private) = partition_vulnerabilities(&nodes, |n| {
            Vulnerability::Basic(BasicVulnerabilityFields::from_node(n))
        });

        assert_eq!(public.len() + private.len(), nodes.len());
        let public_ids: Vec<_> = public.iter().map(|v| v.basic_fields().id.clone()).collect();
        let private_ids: Vec<_> = private.iter().map(|v| v.basic_fields().id.clone()).collect();
        assert_eq!(public_ids, vec!["A", "C"]);
        assert_eq!(private_ids, vec!["B"]);
    }
}
