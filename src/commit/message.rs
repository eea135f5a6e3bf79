use serde::{Deserialize, Serialize};

use crate::model::{VertexId, VertexRecord};

/// The unit exchanged between pipeline phases.
///
/// `Keep` and `Drop` carry the authoritative vertex record and are keyed by
/// that vertex's own id; `Kill` is a minimal stub keyed by a *neighbor's* id,
/// telling it to remove any edge it holds to the carried id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaggedMessage {
    /// The vertex survives, unchanged except for later edge pruning.
    Keep(VertexRecord),
    /// The vertex is being removed; its own adjacency is cleared by the
    /// committer.
    Drop(VertexRecord),
    /// Notification that the carried vertex id is being dropped.
    Kill(VertexId),
}

impl TaggedMessage {
    /// Whether this message carries an authoritative vertex record.
    pub fn is_authoritative(&self) -> bool {
        !matches!(self, TaggedMessage::Kill(_))
    }
}

/// A message routed to the vertex that must act on it.
pub type KeyedMessage = (VertexId, TaggedMessage);
