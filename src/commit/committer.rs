use rustc_hash::FxHashSet;

use super::message::TaggedMessage;
use crate::error::{PodaError, Result};
use crate::metrics::JobCounters;
use crate::model::{Lifecycle, VertexId, VertexRecord};

/// Result of committing one vertex's message group.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedVertex {
    /// The finalized vertex, or `None` when a deleted vertex is suppressed
    /// because state tracking is off.
    pub vertex: Option<VertexRecord>,
    /// Edge counters for the evaluated vertex, reported even when the
    /// vertex itself is suppressed.
    pub counters: JobCounters,
}

/// Final per-vertex assembly over the complete message group for `key`.
///
/// Accepts merged and unmerged groups alike. A `Drop` authority is flipped
/// to [`Lifecycle::Deleted`] with both adjacency lists cleared; a `Keep`
/// authority has every edge to a killed id pruned. A group with no
/// authoritative record, or with more than one, is a data-integrity
/// violation and is surfaced rather than resolved silently.
pub fn commit_group(
    key: VertexId,
    group: Vec<TaggedMessage>,
    track_state: bool,
) -> Result<CommittedVertex> {
    let mut kill_ids: FxHashSet<VertexId> = FxHashSet::default();
    let mut authority: Option<(VertexRecord, bool)> = None;

    for message in group {
        match message {
            TaggedMessage::Kill(id) => {
                kill_ids.insert(id);
            }
            TaggedMessage::Keep(vertex) => {
                if authority.is_some() {
                    return Err(PodaError::DuplicateAuthority(key));
                }
                authority = Some((vertex, false));
            }
            TaggedMessage::Drop(vertex) => {
                if authority.is_some() {
                    return Err(PodaError::DuplicateAuthority(key));
                }
                authority = Some((vertex, true));
            }
        }
    }

    let (mut vertex, dropped) = match authority {
        Some(found) => found,
        None => {
            return Err(PodaError::OrphanGroup {
                key,
                kills: kill_ids.len(),
            })
        }
    };

    if dropped {
        vertex.lifecycle = Lifecycle::Deleted;
        vertex.clear_edges();
    } else {
        vertex.retain_edges_excluding(&kill_ids);
    }

    let mut counters = JobCounters::default();
    counters.out_edges_kept += vertex.out_degree() as u64;
    counters.in_edges_kept += vertex.in_degree() as u64;

    let vertex = if vertex.is_deleted() && !track_state {
        None
    } else {
        Some(vertex)
    };
    Ok(CommittedVertex { vertex, counters })
}
