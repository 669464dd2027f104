//! Skypath graph store
//!
//! An in-memory directed, node- and edge-labeled graph used as the backing
//! store for preference-path queries:
//!
//! 1. **String Interning**: labels and relationship types stored once,
//!    referenced by u32 ID
//! 2. **Adjacency Indexes**: per-node incoming and outgoing edge lists in
//!    stable insertion order
//! 3. **Label Index**: node ids per label as Roaring bitmaps
//! 4. **Temporary Topology**: scoped creation of query-local nodes/edges with
//!    guaranteed retraction ([`TempScope`])
//!
//! The search engine never holds references into the store; nodes and edges
//! are addressed by stable [`NodeId`] / [`EdgeId`] values.

pub mod reach;
pub mod scope;
pub mod selector;
pub mod snapshot;

use ahash::AHashMap;
use dashmap::DashMap;
use parking_lot::RwLock;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

pub use reach::{Reachability, ReachabilityIndex};
pub use scope::TempScope;
pub use selector::{Selector, SelectorError};
pub use snapshot::{EdgeSnapshot, GraphSnapshot, NodeSnapshot};

// ============================================================================
// String Interning
// ============================================================================

/// Interned string ID (4 bytes instead of 24+ for String)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct StrId(u32);

impl StrId {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// String interner: maps strings to compact IDs
pub struct StringInterner {
    str_to_id: DashMap<String, StrId>,
    id_to_str: DashMap<StrId, String>,
    next_id: AtomicU32,
}

impl StringInterner {
    pub fn new() -> Self {
        Self {
            str_to_id: DashMap::new(),
            id_to_str: DashMap::new(),
            next_id: AtomicU32::new(0),
        }
    }

    /// Intern a string, returning its ID
    pub fn intern(&self, s: &str) -> StrId {
        if let Some(id) = self.str_to_id.get(s) {
            return *id;
        }

        let id = StrId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.str_to_id.insert(s.to_string(), id);
        self.id_to_str.insert(id, s.to_string());
        id
    }

    /// Look up an existing ID for a string without inserting.
    pub fn id_of(&self, s: &str) -> Option<StrId> {
        self.str_to_id.get(s).map(|id| *id)
    }

    /// Look up string by ID
    pub fn lookup(&self, id: StrId) -> Option<String> {
        self.id_to_str.get(&id).map(|s| s.clone())
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Identifiers
// ============================================================================

/// Stable node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Stable edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EdgeId(u32);

impl EdgeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("unknown node id {}", .0.raw())]
    UnknownNode(NodeId),
    #[error("unknown edge id {}", .0.raw())]
    UnknownEdge(EdgeId),
    #[error("node {} still has incident edges", .0.raw())]
    NodeHasEdges(NodeId),
    #[error("invalid graph snapshot: {0}")]
    Snapshot(String),
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct NodeRecord {
    label: StrId,
}

#[derive(Debug, Clone, Copy)]
struct EdgeRecord {
    edge_type: StrId,
    source: NodeId,
    target: NodeId,
}

/// Resolved view of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeInfo {
    pub id: EdgeId,
    pub edge_type: StrId,
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Default)]
struct StoreInner {
    /// Node records indexed by raw id; `None` marks a deleted node.
    nodes: Vec<Option<NodeRecord>>,
    /// Edge records indexed by raw id; `None` marks a deleted edge.
    edges: Vec<Option<EdgeRecord>>,
    /// Backward adjacency: node -> incoming edge ids, insertion order.
    incoming: AHashMap<NodeId, Vec<EdgeId>>,
    /// Forward adjacency: node -> outgoing edge ids, insertion order.
    outgoing: AHashMap<NodeId, Vec<EdgeId>>,
    /// Label index: label -> bitmap of node ids.
    label_index: AHashMap<StrId, RoaringBitmap>,
}

// ============================================================================
// GraphStore
// ============================================================================

/// The graph store. All mutation goes through `&self` behind a lock so that
/// scoped guards ([`TempScope`]) can retract temporary topology on drop.
pub struct GraphStore {
    interner: StringInterner,
    inner: RwLock<StoreInner>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            interner: StringInterner::new(),
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// Add a node with the given label.
    pub fn add_node(&self, label: &str) -> NodeId {
        let label_id = self.interner.intern(label);
        let mut inner = self.inner.write();
        let id = NodeId(inner.nodes.len() as u32);
        inner.nodes.push(Some(NodeRecord { label: label_id }));
        inner
            .label_index
            .entry(label_id)
            .or_insert_with(RoaringBitmap::new)
            .insert(id.raw());
        id
    }

    /// Add a directed edge `source -[edge_type]-> target`.
    pub fn add_edge(
        &self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
    ) -> Result<EdgeId, GraphError> {
        let type_id = self.interner.intern(edge_type);
        let mut inner = self.inner.write();
        if !node_live(&inner, source) {
            return Err(GraphError::UnknownNode(source));
        }
        if !node_live(&inner, target) {
            return Err(GraphError::UnknownNode(target));
        }
        let id = EdgeId(inner.edges.len() as u32);
        inner.edges.push(Some(EdgeRecord {
            edge_type: type_id,
            source,
            target,
        }));
        inner.outgoing.entry(source).or_default().push(id);
        inner.incoming.entry(target).or_default().push(id);
        Ok(id)
    }

    /// Delete an edge by id.
    pub fn delete_edge(&self, edge: EdgeId) -> Result<(), GraphError> {
        let mut inner = self.inner.write();
        let record = inner
            .edges
            .get_mut(edge.raw() as usize)
            .and_then(Option::take)
            .ok_or(GraphError::UnknownEdge(edge))?;
        if let Some(out) = inner.outgoing.get_mut(&record.source) {
            out.retain(|&e| e != edge);
        }
        if let Some(inc) = inner.incoming.get_mut(&record.target) {
            inc.retain(|&e| e != edge);
        }
        Ok(())
    }

    /// Delete a node by id. The node must have no remaining incident edges.
    pub fn delete_node(&self, node: NodeId) -> Result<(), GraphError> {
        let mut inner = self.inner.write();
        if !node_live(&inner, node) {
            return Err(GraphError::UnknownNode(node));
        }
        let has_incident = inner.incoming.get(&node).map_or(false, |v| !v.is_empty())
            || inner.outgoing.get(&node).map_or(false, |v| !v.is_empty());
        if has_incident {
            return Err(GraphError::NodeHasEdges(node));
        }
        let Some(record) = inner.nodes[node.raw() as usize].take() else {
            return Err(GraphError::UnknownNode(node));
        };
        if let Some(bitmap) = inner.label_index.get_mut(&record.label) {
            bitmap.remove(node.raw());
        }
        inner.incoming.remove(&node);
        inner.outgoing.remove(&node);
        Ok(())
    }

    /// All edges directed into `node`, as `(edge, source)` pairs.
    ///
    /// Order is insertion order and stable across calls.
    pub fn incoming_edges(&self, node: NodeId) -> Vec<(EdgeId, NodeId)> {
        let inner = self.inner.read();
        inner
            .incoming
            .get(&node)
            .map(|edges| {
                edges
                    .iter()
                    .filter_map(|&e| {
                        edge_record(&inner, e).map(|record| (e, record.source))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All edges directed out of `node`, as `(edge, target)` pairs.
    pub fn outgoing_edges(&self, node: NodeId) -> Vec<(EdgeId, NodeId)> {
        let inner = self.inner.read();
        inner
            .outgoing
            .get(&node)
            .map(|edges| {
                edges
                    .iter()
                    .filter_map(|&e| {
                        edge_record(&inner, e).map(|record| (e, record.target))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn edge(&self, edge: EdgeId) -> Option<EdgeInfo> {
        let inner = self.inner.read();
        edge_record(&inner, edge).map(|record| EdgeInfo {
            id: edge,
            edge_type: record.edge_type,
            source: record.source,
            target: record.target,
        })
    }

    pub fn edge_source(&self, edge: EdgeId) -> Option<NodeId> {
        self.edge(edge).map(|e| e.source)
    }

    pub fn edge_target(&self, edge: EdgeId) -> Option<NodeId> {
        self.edge(edge).map(|e| e.target)
    }

    /// Resolved relationship-type name of an edge.
    pub fn edge_type_name(&self, edge: EdgeId) -> Option<String> {
        let type_id = self.edge(edge)?.edge_type;
        self.interner.lookup(type_id)
    }

    pub fn node_exists(&self, node: NodeId) -> bool {
        node_live(&self.inner.read(), node)
    }

    /// Resolved label of a node, if the node exists and its label metadata is
    /// intact.
    pub fn node_label(&self, node: NodeId) -> Option<String> {
        let inner = self.inner.read();
        let record = inner.nodes.get(node.raw() as usize)?.as_ref()?;
        self.interner.lookup(record.label)
    }

    /// All live node ids carrying `label`, ascending.
    pub fn nodes_with_label(&self, label: &str) -> Vec<NodeId> {
        let Some(label_id) = self.interner.id_of(label) else {
            return Vec::new();
        };
        let inner = self.inner.read();
        inner
            .label_index
            .get(&label_id)
            .map(|bitmap| bitmap.iter().map(NodeId::new).collect())
            .unwrap_or_default()
    }

    /// All live node ids, ascending.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let inner = self.inner.read();
        inner
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|_| NodeId(i as u32)))
            .collect()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.inner.read().nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.inner.read().edges.iter().filter(|e| e.is_some()).count()
    }

    /// Open a scope for temporary topology; everything created through it is
    /// retracted when the scope drops.
    pub fn temp_scope(&self) -> TempScope<'_> {
        TempScope::new(self)
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

fn node_live(inner: &StoreInner, node: NodeId) -> bool {
    inner
        .nodes
        .get(node.raw() as usize)
        .map_or(false, Option::is_some)
}

fn edge_record(inner: &StoreInner, edge: EdgeId) -> Option<EdgeRecord> {
    inner.edges.get(edge.raw() as usize).copied().flatten()
}

// ============================================================================
// Tests
// ============================================================================
