//! Package identity value objects

use serde::{Deserialize, Serialize};

/// Canonical package identity within one ecosystem.
///
/// Equality and hashing cover (name, version) only — the ecosystem is carried
/// once per stack on [`super::normalized::NormalizedPackages`], never per
/// package. Instances are immutable after construction and used as map keys
/// throughout the aggregation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// One declared stack entry as submitted by the caller, with its nested
/// dependency declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDeclaration {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub dependencies: Vec<PackageDeclaration>,
}

impl PackageDeclaration {
    pub fn identity(&self) -> Package {
        Package::new(self.name.clone(), self.version.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_package_equality_by_name_and_version() {
        let a = Package::new("lodash", "4.17.0");
        let b = Package::new("lodash", "4.17.0");
        let c = Package::new("lodash", "4.17.21");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_package_as_map_key() {
        let mut map = HashMap::new();
        map.insert(Package::new("serde", "1.0.0"), 1);
        assert_eq!(map.get(&Package::new("serde", "1.0.0")), Some(&1));
        assert_eq!(map.get(&Package::new("serde", "1.0.1")), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Package::new("flask", "1.1.1").to_string(), "flask@1.1.1");
    }
}
