use tracing::trace;

use super::message::{KeyedMessage, TaggedMessage};
use crate::metrics::JobCounters;
use crate::model::VertexRecord;

/// Job-wide deletion mode, fixed at job start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropMode {
    /// Drop vertices that carry path annotations.
    Drop,
    /// Drop vertices that do *not* carry path annotations.
    Keep,
}

/// Classifies one vertex as kept or dropped and emits the keyed messages
/// the rest of the protocol routes on.
///
/// A kept vertex produces a single `Keep` message keyed by its own id. A
/// dropped vertex produces one `Kill` stub per adjacent edge, keyed by the
/// other endpoint (self-loops notify nobody), followed by a single `Drop`
/// message keyed by its own id. Pure function; the counter delta reports
/// exactly one kept or dropped vertex.
pub fn classify(vertex: VertexRecord, mode: DropMode) -> (Vec<KeyedMessage>, JobCounters) {
    let mut counters = JobCounters::default();
    let keep = match mode {
        DropMode::Drop => !vertex.has_paths(),
        DropMode::Keep => vertex.has_paths(),
    };

    let mut messages = Vec::new();
    if keep {
        counters.vertices_kept += 1;
        trace!(vertex = vertex.id, "classified as keep");
        messages.push((vertex.id, TaggedMessage::Keep(vertex)));
    } else {
        counters.vertices_dropped += 1;
        let own = vertex.id;
        for edge in vertex.outgoing.iter().chain(vertex.incoming.iter()) {
            let neighbor = edge.other_endpoint(own);
            if neighbor != own {
                messages.push((neighbor, TaggedMessage::Kill(own)));
            }
        }
        trace!(vertex = own, notified = messages.len(), "classified as drop");
        messages.push((own, TaggedMessage::Drop(vertex)));
    }
    (messages, counters)
}
