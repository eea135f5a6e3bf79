use rustc_hash::FxHashMap;

use crate::commit::{KeyedMessage, TaggedMessage};
use crate::model::VertexId;

/// Groups keyed messages so that every message sharing a key lands in the
/// same group.
///
/// No ordering guarantee among the members of a group and none across keys;
/// the commit protocol is insensitive to both.
pub fn group_by_key(messages: Vec<KeyedMessage>) -> FxHashMap<VertexId, Vec<TaggedMessage>> {
    let mut groups: FxHashMap<VertexId, Vec<TaggedMessage>> = FxHashMap::default();
    for (key, message) in messages {
        groups.entry(key).or_default().push(message);
    }
    groups
}
