//! Graph snapshot format.
//!
//! A plain serde structure used by the CLI and tests to load a graph from
//! JSON. Node ids in a snapshot must be dense from zero so they coincide with
//! the store ids the selectors address.

use serde::{Deserialize, Serialize};

use crate::{GraphError, GraphStore, NodeId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: u32,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub source: u32,
    pub target: u32,
    #[serde(rename = "type")]
    pub edge_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphStore {
    /// Build a store from a snapshot.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self, GraphError> {
        let store = GraphStore::new();

        let mut nodes = snapshot.nodes.clone();
        nodes.sort_by_key(|n| n.id);
        for (expected, node) in nodes.iter().enumerate() {
            if node.id as usize != expected {
                return Err(GraphError::Snapshot(format!(
                    "node ids must be dense from 0; expected {expected}, found {}",
                    node.id
                )));
            }
            store.add_node(&node.label);
        }

        for edge in &snapshot.edges {
            store
                .add_edge(
                    NodeId::new(edge.source),
                    NodeId::new(edge.target),
                    &edge.edge_type,
                )
                .map_err(|err| {
                    GraphError::Snapshot(format!(
                        "edge {} -> {}: {err}",
                        edge.source, edge.target
                    ))
                })?;
        }

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_json_snapshot() {
        let json = r#"{
            "nodes": [
                {"id": 0, "label": "Person"},
                {"id": 1, "label": "Person"},
                {"id": 2, "label": "City"}
            ],
            "edges": [
                {"source": 0, "target": 1, "type": "KNOWS"},
                {"source": 1, "target": 2, "type": "LIVES_IN"}
            ]
        }"#;
        let snapshot: GraphSnapshot = serde_json::from_str(json).unwrap();
        let store = GraphStore::from_snapshot(&snapshot).unwrap();

        assert_eq!(store.node_count(), 3);
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.nodes_with_label("Person").len(), 2);
        let incoming = store.incoming_edges(NodeId::new(2));
        assert_eq!(incoming.len(), 1);
    }

    #[test]
    fn rejects_sparse_node_ids() {
        let snapshot = GraphSnapshot {
            nodes: vec![
                NodeSnapshot {
                    id: 0,
                    label: "A".to_string(),
                },
                NodeSnapshot {
                    id: 2,
                    label: "B".to_string(),
                },
            ],
            edges: vec![],
        };
        assert!(matches!(
            GraphStore::from_snapshot(&snapshot),
            Err(GraphError::Snapshot(_))
        ));
    }

    #[test]
    fn rejects_dangling_edge() {
        let snapshot = GraphSnapshot {
            nodes: vec![NodeSnapshot {
                id: 0,
                label: "A".to_string(),
            }],
            edges: vec![EdgeSnapshot {
                source: 0,
                target: 9,
                edge_type: "E".to_string(),
            }],
        };
        assert!(matches!(
            GraphStore::from_snapshot(&snapshot),
            Err(GraphError::Snapshot(_))
        ));
    }
}
