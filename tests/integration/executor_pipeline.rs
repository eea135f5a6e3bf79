#![allow(missing_docs)]

use std::collections::BTreeSet;

use poda::{DataGenerator, DropMode, JobConfig, Lifecycle, Pipeline, VertexId, VertexRecord};

fn generated_graph(seed: u64) -> Vec<VertexRecord> {
    let mut generator = DataGenerator::new(seed);
    let mut vertices = generator.generate_social_network(500, 6);
    generator.annotate_fraction(&mut vertices, 0.3);
    vertices
}

fn run_with(vertices: Vec<VertexRecord>, partitions: usize, combine: bool) -> poda::JobOutput {
    let config = JobConfig {
        drop_mode: DropMode::Drop,
        track_state: false,
        partitions,
        combine,
    };
    Pipeline::new(config).run(vertices).unwrap()
}

#[test]
fn partition_count_does_not_change_the_output() {
    let graph = generated_graph(11);
    let single = run_with(graph.clone(), 1, false);
    let parallel = run_with(graph, 8, false);
    assert_eq!(single, parallel);
}

#[test]
fn combine_does_not_change_the_output() {
    let graph = generated_graph(12);
    let without = run_with(graph.clone(), 4, false);
    let with = run_with(graph, 4, true);
    assert_eq!(without, with);
}

#[test]
fn rerunning_the_job_reproduces_the_output() {
    let graph = generated_graph(13);
    let first = run_with(graph.clone(), 4, true);
    let second = run_with(graph, 4, true);
    assert_eq!(first, second);
}

#[test]
fn no_emitted_vertex_references_a_dropped_id() {
    let graph = generated_graph(14);
    let annotated: BTreeSet<VertexId> = graph
        .iter()
        .filter(|v| v.has_paths())
        .map(|v| v.id)
        .collect();

    let output = run_with(graph, 4, true);
    for vertex in &output.vertices {
        assert_eq!(vertex.lifecycle, Lifecycle::Normal);
        assert!(!annotated.contains(&vertex.id));
        for edge in vertex.outgoing.iter().chain(vertex.incoming.iter()) {
            assert!(!annotated.contains(&edge.source_id));
            assert!(!annotated.contains(&edge.target_id));
        }
    }
}

#[test]
fn counters_are_consistent_with_the_output() {
    let graph = generated_graph(15);
    let input_size = graph.len() as u64;
    let output = run_with(graph, 4, true);

    assert_eq!(
        output.counters.vertices_kept + output.counters.vertices_dropped,
        input_size
    );
    assert_eq!(output.vertices.len() as u64, output.counters.vertices_kept);

    let out_total: u64 = output.vertices.iter().map(|v| v.out_degree() as u64).sum();
    let in_total: u64 = output.vertices.iter().map(|v| v.in_degree() as u64).sum();
    assert_eq!(output.counters.out_edges_kept, out_total);
    assert_eq!(output.counters.in_edges_kept, in_total);
    // Every surviving edge still has both endpoints alive, so both
    // directions see it exactly once.
    assert_eq!(out_total, in_total);
}

#[test]
fn tracked_run_emits_every_input_vertex() {
    let graph = generated_graph(16);
    let input_size = graph.len();
    let annotated: BTreeSet<VertexId> = graph
        .iter()
        .filter(|v| v.has_paths())
        .map(|v| v.id)
        .collect();

    let config = JobConfig {
        drop_mode: DropMode::Drop,
        track_state: true,
        partitions: 4,
        combine: true,
    };
    let output = Pipeline::new(config).run(graph).unwrap();
    assert_eq!(output.vertices.len(), input_size);

    for vertex in &output.vertices {
        if annotated.contains(&vertex.id) {
            assert_eq!(vertex.lifecycle, Lifecycle::Deleted);
            assert!(vertex.outgoing.is_empty());
            assert!(vertex.incoming.is_empty());
        } else {
            assert_eq!(vertex.lifecycle, Lifecycle::Normal);
        }
    }
}

#[test]
fn keep_mode_inverts_the_survivor_set() {
    let graph = generated_graph(17);
    let annotated: BTreeSet<VertexId> = graph
        .iter()
        .filter(|v| v.has_paths())
        .map(|v| v.id)
        .collect();

    let config = JobConfig {
        drop_mode: DropMode::Keep,
        track_state: false,
        partitions: 4,
        combine: true,
    };
    let output = Pipeline::new(config).run(graph).unwrap();
    let emitted: BTreeSet<VertexId> = output.vertices.iter().map(|v| v.id).collect();
    assert_eq!(emitted, annotated);
}

#[test]
fn every_dropped_vertex_notifies_each_neighbor() {
    let graph = generated_graph(19);

    let mut messages = Vec::new();
    for vertex in graph.clone() {
        let (emitted, _) = poda::classify(vertex, DropMode::Drop);
        messages.extend(emitted);
    }
    let groups = poda::engine::group_by_key(messages);

    for vertex in &graph {
        if !vertex.has_paths() {
            continue;
        }
        for edge in vertex.outgoing.iter().chain(vertex.incoming.iter()) {
            let neighbor = edge.other_endpoint(vertex.id);
            if neighbor == vertex.id {
                continue;
            }
            let group = groups.get(&neighbor).expect("neighbor received a group");
            assert!(
                group.contains(&poda::TaggedMessage::Kill(vertex.id)),
                "vertex {} missing kill from {}",
                neighbor,
                vertex.id
            );
        }
    }
}

#[test]
fn output_is_sorted_by_vertex_id() {
    let graph = generated_graph(18);
    let output = run_with(graph, 8, true);
    let ids: Vec<VertexId> = output.vertices.iter().map(|v| v.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}
