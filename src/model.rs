use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Stable 64-bit vertex identifier.
pub type VertexId = u64;

/// Property value attached to a vertex or an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// Owned string.
    String(String),
    /// Owned byte vector.
    Bytes(Vec<u8>),
}

/// Lifecycle state of a vertex within one job run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Live vertex, emitted downstream.
    #[default]
    Normal,
    /// Committed deletion; emitted only as a tombstone when state tracking
    /// is enabled.
    Deleted,
}

/// A directed edge held in a vertex's adjacency lists.
///
/// Both endpoints keep a copy: the edge appears in the source's outgoing
/// list and in the target's incoming list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source vertex id.
    pub source_id: VertexId,
    /// Target vertex id.
    pub target_id: VertexId,
    /// Edge label.
    pub label: String,
    /// Edge properties.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl EdgeRecord {
    /// Creates an edge with no properties.
    pub fn new(source_id: VertexId, target_id: VertexId, label: impl Into<String>) -> Self {
        Self {
            source_id,
            target_id,
            label: label.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Returns the endpoint that is not `own`. For a self-loop both
    /// endpoints equal `own` and `own` is returned.
    pub fn other_endpoint(&self, own: VertexId) -> VertexId {
        if self.source_id == own {
            self.target_id
        } else {
            self.source_id
        }
    }
}

/// A vertex record as shipped between pipeline phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    /// Vertex id.
    pub id: VertexId,
    /// Vertex properties.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    /// Outgoing adjacency list.
    #[serde(default)]
    pub outgoing: Vec<EdgeRecord>,
    /// Incoming adjacency list.
    #[serde(default)]
    pub incoming: Vec<EdgeRecord>,
    /// Lifecycle state.
    #[serde(default)]
    pub lifecycle: Lifecycle,
    /// Path-annotation counter set by upstream traversal stages; a non-zero
    /// count marks the vertex as "of interest".
    #[serde(default)]
    pub path_count: u64,
}

impl VertexRecord {
    /// Creates an empty vertex.
    pub fn new(id: VertexId) -> Self {
        Self {
            id,
            properties: BTreeMap::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            lifecycle: Lifecycle::default(),
            path_count: 0,
        }
    }

    /// Whether any upstream traversal path terminated at this vertex.
    pub fn has_paths(&self) -> bool {
        self.path_count > 0
    }

    /// Marks the vertex with a single path annotation.
    pub fn start_path(&mut self) {
        self.path_count = 1;
    }

    /// Adds `n` path annotations.
    pub fn add_paths(&mut self, n: u64) {
        self.path_count += n;
    }

    /// Clears all path annotations.
    pub fn clear_paths(&mut self) {
        self.path_count = 0;
    }

    /// Whether the vertex has been committed as deleted.
    pub fn is_deleted(&self) -> bool {
        self.lifecycle == Lifecycle::Deleted
    }

    /// Post-prune outgoing edge count.
    pub fn out_degree(&self) -> usize {
        self.outgoing.len()
    }

    /// Post-prune incoming edge count.
    pub fn in_degree(&self) -> usize {
        self.incoming.len()
    }

    /// Removes every edge, in either direction, whose other endpoint is in
    /// `ids`. Rebuilds the retained lists instead of deleting during
    /// iteration.
    pub fn retain_edges_excluding(&mut self, ids: &FxHashSet<VertexId>) {
        if ids.is_empty() {
            return;
        }
        let own = self.id;
        self.outgoing.retain(|edge| !ids.contains(&edge.other_endpoint(own)));
        self.incoming.retain(|edge| !ids.contains(&edge.other_endpoint(own)));
    }

    /// Empties both adjacency lists.
    pub fn clear_edges(&mut self) {
        self.outgoing.clear();
        self.incoming.clear();
    }
}
