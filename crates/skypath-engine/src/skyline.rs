//! Skyline (Pareto frontier) maintenance.
//!
//! The skyline holds complete source-to-sink paths such that no member is
//! dominated by another: it is never true that one member is at least as long
//! and at most as rewarding as another. Path identity is structural (the edge
//! sequence), which also keys the memoized bounds cache.

use ahash::{AHashMap, AHashSet};
use skypath_graph::{EdgeId, GraphStore};

use crate::rewards::RewardTable;

/// Structural path identity: the ordered edge sequence.
pub type PathKey = Vec<EdgeId>;

/// Memoized `(length, reward)` totals for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathBounds {
    pub length: i64,
    pub reward: i64,
}

/// `candidate` is dominated by `other`: at least as good on both axes.
fn dominated_by(candidate: PathBounds, other: PathBounds) -> bool {
    candidate.length >= other.length && candidate.reward <= other.reward
}

/// Online Pareto frontier over discovered paths.
pub struct Skyline {
    members: AHashSet<PathKey>,
    bounds_cache: AHashMap<PathKey, PathBounds>,
}

impl Skyline {
    pub fn new() -> Self {
        Self {
            members: AHashSet::new(),
            bounds_cache: AHashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = &PathKey> {
        self.members.iter()
    }

    /// Memoized path bounds: per-edge cost contributions summed along the
    /// path, crediting each edge's target node.
    pub fn bounds(
        &mut self,
        store: &GraphStore,
        rewards: &RewardTable,
        path: &PathKey,
    ) -> PathBounds {
        if let Some(&bounds) = self.bounds_cache.get(path) {
            return bounds;
        }
        let mut length = 0;
        let mut reward = 0;
        for &edge in path {
            if let Some(target) = store.edge_target(edge) {
                let cost = rewards.edge_cost(store, edge, target);
                length += cost.length;
                reward += cost.reward;
            }
        }
        let bounds = PathBounds { length, reward };
        self.bounds_cache.insert(path.clone(), bounds);
        bounds
    }

    /// Submit a candidate path.
    ///
    /// Rejected (returning `false`) when any existing member dominates it —
    /// including an identical resubmission, which makes the operation
    /// idempotent. Otherwise every member the candidate dominates is removed
    /// and the candidate inserted.
    pub fn submit(
        &mut self,
        store: &GraphStore,
        rewards: &RewardTable,
        path: PathKey,
    ) -> bool {
        let candidate = self.bounds(store, rewards, &path);

        let member_bounds: Vec<(PathKey, PathBounds)> = self
            .members
            .iter()
            .cloned()
            .map(|member| {
                let bounds = self.bounds_cache[&member];
                (member, bounds)
            })
            .collect();

        if member_bounds
            .iter()
            .any(|&(_, bounds)| dominated_by(candidate, bounds))
        {
            return false;
        }

        for (member, bounds) in member_bounds {
            if dominated_by(bounds, candidate) {
                self.members.remove(&member);
            }
        }
        self.members.insert(path);
        true
    }

    /// Drain the frontier into a plain list.
    pub fn into_paths(self) -> Vec<PathKey> {
        self.members.into_iter().collect()
    }
}

impl Default for Skyline {
    fn default() -> Self {
        Self::new()
    }
}
