//! Scoped temporary topology.
//!
//! A preference-path query augments the graph with a virtual source/sink and
//! boundary edges. Leaking that topology would corrupt every subsequent query,
//! so creation goes through a [`TempScope`] guard: everything created inside
//! the scope is retracted when it drops, on every exit path including `?`
//! propagation and panics.

use crate::{EdgeId, GraphError, GraphStore, NodeId};

/// Drop-guard over temporary nodes and edges created for one query.
pub struct TempScope<'a> {
    store: &'a GraphStore,
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
}

impl<'a> TempScope<'a> {
    pub(crate) fn new(store: &'a GraphStore) -> Self {
        Self {
            store,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Create a temporary node owned by this scope.
    pub fn create_node(&mut self, label: &str) -> NodeId {
        let id = self.store.add_node(label);
        self.nodes.push(id);
        id
    }

    /// Create a temporary edge owned by this scope.
    pub fn create_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        edge_type: &str,
    ) -> Result<EdgeId, GraphError> {
        let id = self.store.add_edge(from, to, edge_type)?;
        self.edges.push(id);
        Ok(id)
    }

    /// Retract everything now instead of waiting for drop.
    pub fn retract(self) {
        drop(self);
    }

    fn retract_inner(&mut self) {
        // Edges first so node deletion sees no incident edges.
        for edge in self.edges.drain(..).rev() {
            if let Err(err) = self.store.delete_edge(edge) {
                tracing::warn!(edge = edge.raw(), %err, "temporary edge already gone");
            }
        }
        for node in self.nodes.drain(..).rev() {
            if let Err(err) = self.store.delete_node(node) {
                tracing::warn!(node = node.raw(), %err, "failed to retract temporary node");
            }
        }
    }
}

impl Drop for TempScope<'_> {
    fn drop(&mut self) {
        self.retract_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_retracts_on_drop() {
        let store = GraphStore::new();
        let a = store.add_node("Person");
        let nodes_before = store.node_count();
        let edges_before = store.edge_count();

        {
            let mut scope = store.temp_scope();
            let s = scope.create_node("Virtual");
            scope.create_edge(s, a, "Temp").unwrap();
            assert_eq!(store.node_count(), nodes_before + 1);
            assert_eq!(store.edge_count(), edges_before + 1);
        }

        assert_eq!(store.node_count(), nodes_before);
        assert_eq!(store.edge_count(), edges_before);
    }

    #[test]
    fn scope_retracts_on_early_error_return() {
        let store = GraphStore::new();
        let a = store.add_node("Person");

        fn failing_query(store: &GraphStore, a: NodeId) -> Result<(), GraphError> {
            let mut scope = store.temp_scope();
            let s = scope.create_node("Virtual");
            scope.create_edge(s, a, "Temp")?;
            // Fatal mid-query failure: edge to a node that does not exist.
            scope.create_edge(s, NodeId::new(4096), "Temp")?;
            Ok(())
        }

        assert!(failing_query(&store, a).is_err());
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn scope_retracts_on_panic() {
        let store = GraphStore::new();
        let a = store.add_node("Person");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut scope = store.temp_scope();
            let s = scope.create_node("Virtual");
            scope.create_edge(s, a, "Temp").unwrap();
            panic!("query aborted");
        }));

        assert!(result.is_err());
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn explicit_retract_consumes_scope() {
        let store = GraphStore::new();
        let mut scope = store.temp_scope();
        scope.create_node("Virtual");
        scope.retract();
        assert_eq!(store.node_count(), 0);
    }
}
