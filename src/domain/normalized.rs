//! Canonical, read-only view of a submitted dependency stack

use std::collections::{HashMap, HashSet};

use super::package::{Package, PackageDeclaration};

/// Normalized view of the request's declared packages.
///
/// Built once per request and read-only thereafter. Invariants:
/// - every key of `dependency_graph` is a direct dependency
/// - every element of every `dependency_graph` value is in `all_dependencies`
/// - `all_dependencies` = direct ∪ every transitive entry reachable from a
///   direct entry, insertion-ordered, deduplicated by (name, version)
#[derive(Debug, Clone)]
pub struct NormalizedPackages {
    ecosystem: String,
    direct_dependencies: Vec<Package>,
    all_dependencies: Vec<Package>,
    dependency_graph: HashMap<Package, Vec<Package>>,
}

impl NormalizedPackages {
    pub fn new(declarations: &[PackageDeclaration], ecosystem: impl Into<String>) -> Self {
        let mut direct = Vec::new();
        let mut all = Vec::new();
        let mut seen_direct = HashSet::new();
        let mut seen_all = HashSet::new();
        let mut graph: HashMap<Package, Vec<Package>> = HashMap::new();

        for declaration in declarations {
            let package = declaration.identity();
            push_unique(&mut all, &mut seen_all, &package);
            for child in &declaration.dependencies {
                collect_reachable(child, &mut all, &mut seen_all);
            }
            if !seen_direct.insert(package.clone()) {
                continue;
            }
            direct.push(package.clone());

            // Immediate children form the adjacency list; deeper levels only
            // contribute to all_dependencies.
            let transitives = declaration
                .dependencies
                .iter()
                .map(PackageDeclaration::identity)
                .collect();
            graph.insert(package, transitives);
        }

        Self {
            ecosystem: ecosystem.into(),
            direct_dependencies: direct,
            all_dependencies: all,
            dependency_graph: graph,
        }
    }

    pub fn ecosystem(&self) -> &str {
        &self.ecosystem
    }

    /// Top-level stack entries, in declared order.
    pub fn direct_dependencies(&self) -> &[Package] {
        &self.direct_dependencies
    }

    /// Direct and transitive dependencies, insertion-ordered and deduplicated.
    pub fn all_dependencies(&self) -> &[Package] {
        &self.all_dependencies
    }

    /// Immediate declared transitive dependencies of one direct dependency.
    pub fn transitives_of(&self, package: &Package) -> Option<&[Package]> {
        self.dependency_graph.get(package).map(Vec::as_slice)
    }
}

fn push_unique(all: &mut Vec<Package>, seen: &mut HashSet<Package>, package: &Package) {
    if seen.insert(package.clone()) {
        all.push(package.clone());
    }
}

fn collect_reachable(
    declaration: &PackageDeclaration,
    all: &mut Vec<Package>,
    seen: &mut HashSet<Package>,
) {
    push_unique(all, seen, &declaration.identity());
    for child in &declaration.dependencies {
        collect_reachable(child, all, seen);
    }
}
