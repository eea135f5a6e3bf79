use rustc_hash::FxHashSet;

use super::message::TaggedMessage;
use crate::error::{PodaError, Result};
use crate::model::{VertexId, VertexRecord};

/// Merges a collocated subset of the messages keyed by `key`.
///
/// Runs zero or more times per key, on arbitrary sub-partitions, strictly
/// before the final commit. Kill stubs are deduplicated; when an
/// authoritative `Keep`/`Drop` record is collocated with them the kill set
/// is applied to it immediately and a single message with the same tag is
/// re-emitted, so the set never crosses the shuffle. Without an
/// authoritative record one stub per distinct id is forwarded instead.
///
/// The merge is associative and idempotent over the message multiset; the
/// committer must produce the same result whether or not it ran.
pub fn combine(key: VertexId, group: Vec<TaggedMessage>) -> Result<Vec<TaggedMessage>> {
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

    match authority {
        Some((mut vertex, dropped)) => {
            vertex.retain_edges_excluding(&kill_ids);
            let merged = if dropped {
                TaggedMessage::Drop(vertex)
            } else {
                TaggedMessage::Keep(vertex)
            };
            Ok(vec![merged])
        }
        None => {
            // The vertex lives in another partition; forward the
            // deduplicated stubs across the shuffle.
            let mut ids: Vec<VertexId> = kill_ids.into_iter().collect();
            ids.sort_unstable();
            Ok(ids.into_iter().map(TaggedMessage::Kill).collect())
        }
    }
}
