//! Search configuration.
//!
//! All algorithm variants are explicit configuration passed into the query
//! call; nothing is selected at compile time.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the next frontier node is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Binary heap keyed on the node's lower cost bound.
    PriorityQueue,
    /// Full scan of the frontier minimizing `lower_cost - upper_reward`.
    /// More expensive per iteration; retained for comparison.
    LinearScan,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown selection policy {0:?} (expected \"priority-queue\" or \"linear-scan\")")]
pub struct ParsePolicyError(String);

impl FromStr for SelectionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "priority-queue" => Ok(Self::PriorityQueue),
            "linear-scan" => Ok(Self::LinearScan),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Configuration for one preference-path query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub selection_policy: SelectionPolicy,
    /// Drop start/end nodes with no possible counterpart before searching.
    /// Requires a reachability oracle to be supplied with the query.
    pub use_reachability_prefilter: bool,
    /// Cap on the edge count of any accepted path.
    pub max_hops: usize,
    /// Wall-clock budget for the relaxation loop. Expiry is an expected
    /// anytime-termination condition, not an error.
    pub timeout_millis: u64,
    /// Magnitude of the negative reward assigned to excluded tokens. Also the
    /// threshold at which a reward inflates path length (soft barrier).
    pub exclusion_penalty: i64,
    /// Sentinel lower-cost bound for nodes never relaxed.
    pub initial_lower_bound: i64,
    /// Sentinel upper-reward bound for nodes never relaxed.
    pub initial_upper_bound: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            selection_policy: SelectionPolicy::PriorityQueue,
            use_reachability_prefilter: false,
            max_hops: 15,
            timeout_millis: 900_000,
            exclusion_penalty: 1_000_000,
            initial_lower_bound: 2_000_000,
            initial_upper_bound: -1,
        }
    }
}
