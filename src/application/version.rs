//! Ecosystem-aware version selection
//!
//! Version strings in the graph are not guaranteed to be well-formed semver,
//! so comparison uses a deterministic total order: versions are tokenized on
//! `.`, `-` and `+`, segments compare numerically when both sides parse as
//! integers and lexicographically otherwise, and a shorter prefix orders
//! before its extension.

use std::cmp::Ordering;

/// Comparator over version strings, selected per ecosystem.
///
/// Every currently supported ecosystem uses the generic segment-wise order;
/// the constructor is the seam for ecosystem-specific rules later.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionComparator;

impl VersionComparator {
    pub fn for_ecosystem(_ecosystem: &str) -> Self {
        Self
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let left: Vec<&str> = tokenize(a).collect();
        let right: Vec<&str> = tokenize(b).collect();

        for (l, r) in left.iter().zip(right.iter()) {
            let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                (Ok(ln), Ok(rn)) => ln.cmp(&rn),
                _ => l.cmp(r),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        left.len().cmp(&right.len())
    }

    /// Pick the greatest non-empty candidate. Returns an empty string only
    /// when every candidate is empty.
    pub fn select_latest<'a, I>(&self, candidates: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut latest = String::new();
        for candidate in candidates {
            if candidate.is_empty() {
                continue;
            }
            if latest.is_empty() || self.compare(candidate, &latest) == Ordering::Greater {
                latest = candidate.to_string();
            }
        }
        latest
    }
}

fn tokenize(version: &str) -> impl Iterator<Item = &str> {
    version
        .split(['.', '-', '+'])
        .filter(|segment| !segment.is_empty())
}
