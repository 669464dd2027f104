//! Preference/cost model.
//!
//! Preference selectors are assigned descending positive rewards in
//! submission order (the first list gets a reward equal to the number of
//! lists); exclude selectors all get one large negative sentinel. All rewards
//! live in a single flat token namespace keyed by stringified node id or
//! relationship-type name.

use ahash::AHashMap;
use skypath_graph::{EdgeId, GraphStore, NodeId};

/// Per-edge cost contribution along both objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostVector {
    pub length: i64,
    pub reward: i64,
}

/// Flat token -> reward mapping for one query.
pub struct RewardTable {
    rewards: AHashMap<String, i64>,
    num_prefs: usize,
    /// Rewards at or below this value inflate length (soft exclusion).
    negative_sentinel: i64,
}

impl RewardTable {
    /// Build from already-resolved token lists.
    ///
    /// `preferences` is ordered: earlier lists earn higher rewards. Exclude
    /// tokens overwrite any preference reward for the same token.
    pub fn build(
        preferences: &[Vec<String>],
        excludes: &[Vec<String>],
        exclusion_penalty: i64,
    ) -> Self {
        let num_prefs = preferences.len();
        let mut rewards = AHashMap::new();

        let mut reward = num_prefs as i64;
        for tokens in preferences {
            for token in tokens {
                rewards.insert(token.clone(), reward);
            }
            reward -= 1;
        }

        let negative_sentinel = -exclusion_penalty;
        for tokens in excludes {
            for token in tokens {
                rewards.insert(token.clone(), negative_sentinel);
            }
        }

        Self {
            rewards,
            num_prefs,
            negative_sentinel,
        }
    }

    pub fn num_prefs(&self) -> usize {
        self.num_prefs
    }

    pub fn reward_for(&self, token: &str) -> Option<i64> {
        self.rewards.get(token).copied()
    }

    /// Cost of traversing `edge` while crediting `node`'s reward.
    ///
    /// The relaxation loop credits the edge's source (the node being relaxed);
    /// path-bound summation credits each edge's target. Length is 1 plus the
    /// magnitude of any component at or below the exclusion sentinel, so
    /// excluded labels act as soft barriers rather than hard cuts.
    pub fn edge_cost(&self, store: &GraphStore, edge: EdgeId, node: NodeId) -> CostVector {
        let mut length = 1;
        let mut reward = 0;

        let type_reward = store
            .edge_type_name(edge)
            .and_then(|name| self.reward_for(&name));
        if let Some(r) = type_reward {
            reward += r;
            if r <= self.negative_sentinel {
                length += -r;
            }
        }

        let node_reward = self.reward_for(&node.raw().to_string());
        if let Some(r) = node_reward {
            reward += r;
            if r <= self.negative_sentinel {
                length += -r;
            }
        }

        CostVector { length, reward }
    }

    #[cfg(test)]
    pub(crate) fn from_entries(
        entries: impl IntoIterator<Item = (String, i64)>,
        num_prefs: usize,
        exclusion_penalty: i64,
    ) -> Self {
        Self {
            rewards: entries.into_iter().collect(),
            num_prefs,
            negative_sentinel: -exclusion_penalty,
        }
    }
}
