#![allow(missing_docs)]

use proptest::prelude::*;

use poda::{combine, commit_group, EdgeRecord, TaggedMessage, VertexRecord};

fn authority_with_edges(id: u64, targets: std::ops::Range<u64>) -> VertexRecord {
    let mut vertex = VertexRecord::new(id);
    for target in targets {
        vertex.outgoing.push(EdgeRecord::new(id, target, "follows"));
        vertex.incoming.push(EdgeRecord::new(target, id, "follows"));
    }
    vertex
}

fn sample_group() -> Vec<TaggedMessage> {
    vec![
        TaggedMessage::Kill(2),
        TaggedMessage::Keep(authority_with_edges(1, 2..6)),
        TaggedMessage::Kill(4),
        TaggedMessage::Kill(2),
    ]
}

#[test]
fn zero_one_and_two_merge_passes_commit_identically() {
    let unmerged = sample_group();
    let once = combine(1, unmerged.clone()).unwrap();
    let twice = combine(1, once.clone()).unwrap();

    let from_unmerged = commit_group(1, unmerged, false).unwrap();
    let from_once = commit_group(1, once, false).unwrap();
    let from_twice = commit_group(1, twice, false).unwrap();

    assert_eq!(from_unmerged, from_once);
    assert_eq!(from_once, from_twice);
}

#[test]
fn merging_sub_partitions_is_associative() {
    let group = sample_group();
    let (left, right) = group.split_at(2);

    let mut piecewise = combine(1, left.to_vec()).unwrap();
    piecewise.extend(combine(1, right.to_vec()).unwrap());
    let piecewise = combine(1, piecewise).unwrap();

    let whole = combine(1, group.clone()).unwrap();
    assert_eq!(
        commit_group(1, piecewise, false).unwrap(),
        commit_group(1, whole, false).unwrap()
    );
}

#[test]
fn stub_only_partitions_merge_to_deduplicated_stubs() {
    // The authoritative vertex lives elsewhere; merging any which way must
    // forward each distinct id exactly once.
    let part_a = vec![TaggedMessage::Kill(3), TaggedMessage::Kill(9)];
    let part_b = vec![TaggedMessage::Kill(9), TaggedMessage::Kill(5)];

    let mut forwarded = combine(1, part_a).unwrap();
    forwarded.extend(combine(1, part_b).unwrap());
    let forwarded = combine(1, forwarded).unwrap();

    assert_eq!(
        forwarded,
        vec![
            TaggedMessage::Kill(3),
            TaggedMessage::Kill(5),
            TaggedMessage::Kill(9),
        ]
    );
}

proptest! {
    // Any partitioning of a key's message group, merged zero or more times
    // in any arrangement, must commit to the same output as the raw group.
    #[test]
    fn partial_merging_never_changes_committed_output(
        kills in prop::collection::vec(2u64..12, 0..16),
        assignment in prop::collection::vec(0usize..3, 17),
        authority_dropped in any::<bool>(),
        track_state in any::<bool>(),
    ) {
        let vertex = authority_with_edges(1, 2..12);
        let authority = if authority_dropped {
            TaggedMessage::Drop(vertex)
        } else {
            TaggedMessage::Keep(vertex)
        };

        let mut messages = vec![authority];
        messages.extend(kills.iter().copied().map(TaggedMessage::Kill));

        let mut buckets: [Vec<TaggedMessage>; 3] = Default::default();
        for (i, message) in messages.iter().cloned().enumerate() {
            buckets[assignment[i]].push(message);
        }

        let mut piecewise = Vec::new();
        for bucket in buckets {
            piecewise.extend(combine(1, bucket).unwrap());
        }
        let merged_again = combine(1, piecewise.clone()).unwrap();

        let from_raw = commit_group(1, messages, track_state).unwrap();
        let from_piecewise = commit_group(1, piecewise, track_state).unwrap();
        let from_merged_again = commit_group(1, merged_again, track_state).unwrap();

        prop_assert_eq!(&from_raw, &from_piecewise);
        prop_assert_eq!(&from_raw, &from_merged_again);
    }
}
