//! Search frontier.
//!
//! Two selection policies share one interface. The priority queue orders by
//! the node's lower cost bound; reinsertion stamps a fresh generation and
//! stale heap entries are discarded on pop, so a node is never expanded with
//! an outdated priority. The linear scan keeps a plain set and picks the node
//! minimizing `lower_cost - upper_reward` each iteration.

use ahash::{AHashMap, AHashSet};
use skypath_graph::NodeId;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::bounds::BoundTable;
use crate::config::SelectionPolicy;

pub enum Frontier {
    PriorityQueue {
        heap: BinaryHeap<Reverse<(i64, u64, NodeId)>>,
        /// Latest generation per queued node; older heap entries are stale.
        generation: AHashMap<NodeId, u64>,
        next_generation: u64,
    },
    LinearScan {
        set: AHashSet<NodeId>,
    },
}

impl Frontier {
    pub fn new(policy: SelectionPolicy) -> Self {
        match policy {
            SelectionPolicy::PriorityQueue => Self::PriorityQueue {
                heap: BinaryHeap::new(),
                generation: AHashMap::new(),
                next_generation: 0,
            },
            SelectionPolicy::LinearScan => Self::LinearScan {
                set: AHashSet::new(),
            },
        }
    }

    /// Insert or reprioritize a node. `lower_cost` is its current bound.
    pub fn push(&mut self, node: NodeId, lower_cost: i64) {
        match self {
            Self::PriorityQueue {
                heap,
                generation,
                next_generation,
            } => {
                *next_generation += 1;
                generation.insert(node, *next_generation);
                heap.push(Reverse((lower_cost, *next_generation, node)));
            }
            Self::LinearScan { set } => {
                set.insert(node);
            }
        }
    }

    /// Select and remove the next node to expand.
    pub fn pop(&mut self, bounds: &mut BoundTable) -> Option<NodeId> {
        match self {
            Self::PriorityQueue { heap, generation, .. } => {
                while let Some(Reverse((_, gen, node))) = heap.pop() {
                    if generation.get(&node) == Some(&gen) {
                        generation.remove(&node);
                        return Some(node);
                    }
                    // Stale entry superseded by a later push.
                }
                None
            }
            Self::LinearScan { set } => {
                let mut best: Option<(i64, NodeId)> = None;
                for &node in set.iter() {
                    let score = bounds.lower_cost(node) - bounds.upper_reward(node);
                    match best {
                        Some((min, _)) if score >= min => {}
                        _ => best = Some((score, node)),
                    }
                }
                let (_, node) = best?;
                set.remove(&node);
                Some(node)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::PriorityQueue { generation, .. } => generation.is_empty(),
            Self::LinearScan { set } => set.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    fn bounds() -> BoundTable {
        BoundTable::new(NodeId::new(0), &SearchConfig::default())
    }

    #[test]
    fn priority_queue_pops_min_lower_cost() {
        let mut frontier = Frontier::new(SelectionPolicy::PriorityQueue);
        let mut b = bounds();
        frontier.push(NodeId::new(1), 10);
        frontier.push(NodeId::new(2), 3);
        frontier.push(NodeId::new(3), 7);

        assert_eq!(frontier.pop(&mut b), Some(NodeId::new(2)));
        assert_eq!(frontier.pop(&mut b), Some(NodeId::new(3)));
        assert_eq!(frontier.pop(&mut b), Some(NodeId::new(1)));
        assert!(frontier.is_empty());
    }

    #[test]
    fn reinsertion_evicts_stale_priority() {
        let mut frontier = Frontier::new(SelectionPolicy::PriorityQueue);
        let mut b = bounds();
        frontier.push(NodeId::new(1), 10);
        frontier.push(NodeId::new(2), 5);
        // Node 1 improved; the old entry at 10 must not cause a second pop.
        frontier.push(NodeId::new(1), 2);

        assert_eq!(frontier.pop(&mut b), Some(NodeId::new(1)));
        assert_eq!(frontier.pop(&mut b), Some(NodeId::new(2)));
        assert_eq!(frontier.pop(&mut b), None);
    }

    #[test]
    fn linear_scan_minimizes_cost_minus_reward() {
        let mut frontier = Frontier::new(SelectionPolicy::LinearScan);
        let mut b = bounds();
        let n1 = NodeId::new(1);
        let n2 = NodeId::new(2);
        b.lower_cost(n1);
        b.lower_cost(n2);
        b.upper_reward(n1);
        b.upper_reward(n2);
        b.set_lower_cost(n1, 5);
        b.set_upper_reward(n1, 1);
        b.set_lower_cost(n2, 5);
        b.set_upper_reward(n2, 4);

        frontier.push(n1, 5);
        frontier.push(n2, 5);
        // n2 scores 5 - 4 = 1, n1 scores 5 - 1 = 4.
        assert_eq!(frontier.pop(&mut b), Some(n2));
        assert_eq!(frontier.pop(&mut b), Some(n1));
        assert!(frontier.is_empty());
    }
}
