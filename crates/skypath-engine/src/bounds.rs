//! Per-node bound and successor state.
//!
//! Each node carries two independent estimates toward the virtual sink: a
//! minimal discovered cost (`lower_cost`) and a maximal discovered reward
//! (`upper_reward`). Unvisited nodes read as configured sentinel values; the
//! accessors cache the default on first read so "never visited" and "visited
//! with bound 0" stay distinguishable from the sentinels themselves.

use ahash::AHashMap;
use skypath_graph::{EdgeId, NodeId};

use crate::config::SearchConfig;

/// The two relaxation objectives. Each indexes one successor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Cost,
    Reward,
}

impl Objective {
    pub const fn index(self) -> usize {
        match self {
            Objective::Cost => 0,
            Objective::Reward => 1,
        }
    }
}

/// Lazily-defaulted lower-cost / upper-reward tables for one query.
pub struct BoundTable {
    lower_cost: AHashMap<NodeId, i64>,
    upper_reward: AHashMap<NodeId, i64>,
    initial_lower: i64,
    initial_upper: i64,
}

impl BoundTable {
    /// Seed with the virtual sink at `(0, 0)`; everything else defaults to
    /// the sentinels on first read.
    pub fn new(sink: NodeId, config: &SearchConfig) -> Self {
        let mut lower_cost = AHashMap::new();
        let mut upper_reward = AHashMap::new();
        lower_cost.insert(sink, 0);
        upper_reward.insert(sink, 0);
        Self {
            lower_cost,
            upper_reward,
            initial_lower: config.initial_lower_bound,
            initial_upper: config.initial_upper_bound,
        }
    }

    /// Minimal discovered cost from `node` to the sink (sentinel on miss).
    pub fn lower_cost(&mut self, node: NodeId) -> i64 {
        let default = self.initial_lower;
        *self.lower_cost.entry(node).or_insert(default)
    }

    /// Maximal discovered reward from `node` to the sink (sentinel on miss).
    pub fn upper_reward(&mut self, node: NodeId) -> i64 {
        let default = self.initial_upper;
        *self.upper_reward.entry(node).or_insert(default)
    }

    /// Record a strictly improved lower cost.
    pub fn set_lower_cost(&mut self, node: NodeId, value: i64) {
        debug_assert!(value < self.lower_cost(node), "lower cost must decrease");
        self.lower_cost.insert(node, value);
    }

    /// Record a strictly improved upper reward.
    pub fn set_upper_reward(&mut self, node: NodeId, value: i64) {
        debug_assert!(value > self.upper_reward(node), "upper reward must increase");
        self.upper_reward.insert(node, value);
    }
}

/// Two successor edges per node, one per objective; following slot `i` from
/// the virtual source reconstructs the path for objective `i`.
#[derive(Default)]
pub struct SuccessorTable {
    map: AHashMap<NodeId, [Option<EdgeId>; 2]>,
}

impl SuccessorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: NodeId) -> [Option<EdgeId>; 2] {
        self.map.get(&node).copied().unwrap_or([None, None])
    }

    pub fn set(&mut self, node: NodeId, objective: Objective, edge: EdgeId) {
        self.map.entry(node).or_insert([None, None])[objective.index()] = Some(edge);
    }
}
