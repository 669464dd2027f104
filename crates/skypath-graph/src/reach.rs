//! Reachability oracle.
//!
//! Used only as a query pre-filter: start/end nodes with no possible
//! connecting path are dropped before the expensive search begins. The index
//! is a forward transitive closure, one Roaring bitmap per node, computed by
//! iterating the adjacency bitmaps to a fixpoint.

use ahash::AHashMap;
use roaring::RoaringBitmap;

use crate::{GraphStore, NodeId};

/// Answers "is there a directed path from `from` to `to`?".
pub trait Reachability {
    fn can_reach(&self, from: NodeId, to: NodeId) -> bool;
}

/// Bitmap-based transitive closure over the whole store.
pub struct ReachabilityIndex {
    closure: AHashMap<NodeId, RoaringBitmap>,
}

impl ReachabilityIndex {
    /// Build the closure from the current store contents.
    pub fn build(store: &GraphStore) -> Self {
        let nodes = store.node_ids();
        let mut direct: AHashMap<NodeId, RoaringBitmap> = AHashMap::new();
        for &node in &nodes {
            let mut targets = RoaringBitmap::new();
            for (_, target) in store.outgoing_edges(node) {
                targets.insert(target.raw());
            }
            direct.insert(node, targets);
        }

        let mut closure = direct.clone();
        loop {
            let mut changed = false;
            for &node in &nodes {
                let reachable = closure.get(&node).cloned().unwrap_or_default();
                let mut extended = reachable.clone();
                for next in reachable.iter() {
                    if let Some(beyond) = closure.get(&NodeId::new(next)) {
                        extended |= beyond;
                    }
                }
                if extended != reachable {
                    closure.insert(node, extended);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        Self { closure }
    }
}

impl Reachability for ReachabilityIndex {
    fn can_reach(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return true;
        }
        self.closure
            .get(&from)
            .map_or(false, |bitmap| bitmap.contains(to.raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_follows_chains() {
        let store = GraphStore::new();
        let a = store.add_node("N");
        let b = store.add_node("N");
        let c = store.add_node("N");
        let d = store.add_node("N");
        store.add_edge(a, b, "E").unwrap();
        store.add_edge(b, c, "E").unwrap();

        let index = ReachabilityIndex::build(&store);
        assert!(index.can_reach(a, b));
        assert!(index.can_reach(a, c));
        assert!(!index.can_reach(c, a));
        assert!(!index.can_reach(a, d));
        assert!(index.can_reach(d, d));
    }

    #[test]
    fn closure_handles_cycles() {
        let store = GraphStore::new();
        let a = store.add_node("N");
        let b = store.add_node("N");
        let c = store.add_node("N");
        store.add_edge(a, b, "E").unwrap();
        store.add_edge(b, a, "E").unwrap();
        store.add_edge(b, c, "E").unwrap();

        let index = ReachabilityIndex::build(&store);
        assert!(index.can_reach(a, a));
        assert!(index.can_reach(b, b));
        assert!(index.can_reach(a, c));
        assert!(!index.can_reach(c, b));
    }
}
