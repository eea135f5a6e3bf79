use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use super::shuffle::group_by_key;
use crate::commit::{classify, combine, commit_group, DropMode, KeyedMessage, TaggedMessage};
use crate::config::JobConfig;
use crate::error::{PodaError, Result};
use crate::metrics::JobCounters;
use crate::model::{VertexId, VertexRecord};

/// Final output of a commit job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutput {
    /// Committed vertices, sorted by id.
    pub vertices: Vec<VertexRecord>,
    /// Aggregated counters from every phase invocation.
    pub counters: JobCounters,
}

/// Summary of the most recent run, kept for inspection.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Vertices fed into the classifier.
    pub input_vertices: usize,
    /// Vertices present in the output.
    pub emitted_vertices: usize,
    /// Aggregated counters.
    pub counters: JobCounters,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Drives a full classify → combine → shuffle → commit job over worker
/// threads.
pub struct Pipeline {
    config: JobConfig,
    last_run: Mutex<Option<RunSummary>>,
}

impl Pipeline {
    /// Creates a pipeline with the given job configuration.
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            last_run: Mutex::new(None),
        }
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Summary of the most recent completed run, if any.
    pub fn last_run_summary(&self) -> Option<RunSummary> {
        self.last_run.lock().clone()
    }

    /// Runs the whole protocol over `vertices` and returns the committed
    /// vertex set sorted by id.
    ///
    /// Output is a pure function of the input and configuration, so
    /// re-running (the engine-level retry model) reproduces it exactly.
    pub fn run(&self, vertices: Vec<VertexRecord>) -> Result<JobOutput> {
        if self.config.partitions == 0 {
            return Err(PodaError::InvalidArgument(
                "partitions must be at least 1".into(),
            ));
        }
        let started = Instant::now();
        let input_vertices = vertices.len();

        let (messages, mut counters) = self.map_phase(vertices)?;
        let groups = group_by_key(messages);
        debug!(groups = groups.len(), "shuffle complete");

        let (mut emitted, reduce_counters) = self.reduce_phase(groups)?;
        counters.merge(&reduce_counters);
        emitted.sort_by_key(|vertex| vertex.id);

        let summary = RunSummary {
            input_vertices,
            emitted_vertices: emitted.len(),
            counters,
            elapsed: started.elapsed(),
        };
        info!(
            input = summary.input_vertices,
            emitted = summary.emitted_vertices,
            kept = counters.vertices_kept,
            dropped = counters.vertices_dropped,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "commit job finished"
        );
        *self.last_run.lock() = Some(summary);

        Ok(JobOutput {
            vertices: emitted,
            counters,
        })
    }

    fn map_phase(
        &self,
        vertices: Vec<VertexRecord>,
    ) -> Result<(Vec<KeyedMessage>, JobCounters)> {
        let chunks = split_into(vertices, self.config.partitions);
        debug!(
            partitions = chunks.len(),
            combine = self.config.combine,
            "classifying"
        );
        let mode = self.config.drop_mode;
        let do_combine = self.config.combine;

        let (sender, receiver) = mpsc::channel();
        let mut spawned = 0usize;
        for chunk in chunks {
            spawned += 1;
            let sender = sender.clone();
            thread::spawn(move || {
                let result = classify_partition(chunk, mode, do_combine);
                let _ = sender.send(result);
            });
        }
        drop(sender);

        let mut messages = Vec::new();
        let mut counters = JobCounters::default();
        for part in drain_workers(receiver, spawned, "classifier")? {
            let (part_messages, part_counters) = part;
            messages.extend(part_messages);
            counters.merge(&part_counters);
        }
        Ok((messages, counters))
    }

    fn reduce_phase(
        &self,
        groups: FxHashMap<VertexId, Vec<TaggedMessage>>,
    ) -> Result<(Vec<VertexRecord>, JobCounters)> {
        let entries: Vec<(VertexId, Vec<TaggedMessage>)> = groups.into_iter().collect();
        let chunks = split_into(entries, self.config.partitions);
        let track_state = self.config.track_state;

        let (sender, receiver) = mpsc::channel();
        let mut spawned = 0usize;
        for chunk in chunks {
            spawned += 1;
            let sender = sender.clone();
            thread::spawn(move || {
                let result = commit_partition(chunk, track_state);
                let _ = sender.send(result);
            });
        }
        drop(sender);

        let mut vertices = Vec::new();
        let mut counters = JobCounters::default();
        for part in drain_workers(receiver, spawned, "committer")? {
            let (part_vertices, part_counters) = part;
            vertices.extend(part_vertices);
            counters.merge(&part_counters);
        }
        Ok((vertices, counters))
    }
}

fn classify_partition(
    chunk: Vec<VertexRecord>,
    mode: DropMode,
    do_combine: bool,
) -> Result<(Vec<KeyedMessage>, JobCounters)> {
    let mut counters = JobCounters::default();
    let mut messages = Vec::new();
    for vertex in chunk {
        let (emitted, delta) = classify(vertex, mode);
        counters.merge(&delta);
        messages.extend(emitted);
    }
    if do_combine {
        // Merge whatever happens to collocate in this partition before it
        // crosses the channel; the committer handles the rest.
        let mut merged = Vec::new();
        for (key, group) in group_by_key(messages) {
            for message in combine(key, group)? {
                merged.push((key, message));
            }
        }
        messages = merged;
    }
    Ok((messages, counters))
}

fn commit_partition(
    chunk: Vec<(VertexId, Vec<TaggedMessage>)>,
    track_state: bool,
) -> Result<(Vec<VertexRecord>, JobCounters)> {
    let mut vertices = Vec::new();
    let mut counters = JobCounters::default();
    for (key, group) in chunk {
        let committed = commit_group(key, group, track_state)?;
        counters.merge(&committed.counters);
        if let Some(vertex) = committed.vertex {
            vertices.push(vertex);
        }
    }
    Ok((vertices, counters))
}

/// Collects one result per spawned worker. A worker that panics drops its
/// sender without reporting, which shows up here as a short count.
fn drain_workers<T>(
    receiver: Receiver<Result<T>>,
    spawned: usize,
    phase: &str,
) -> Result<Vec<T>> {
    let mut parts = Vec::with_capacity(spawned);
    while let Ok(result) = receiver.recv() {
        parts.push(result?);
    }
    if parts.len() != spawned {
        return Err(PodaError::WorkerFailed(format!(
            "{phase} worker exited before reporting ({} of {spawned} results received)",
            parts.len()
        )));
    }
    Ok(parts)
}

/// Splits `items` into at most `partitions` contiguous chunks of near-equal
/// size. Empty input yields no chunks.
fn split_into<T>(items: Vec<T>, partitions: usize) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }
    let size = (items.len() + partitions - 1) / partitions;
    let mut chunks = Vec::with_capacity(partitions);
    let mut iter = items.into_iter();
    loop {
        let chunk: Vec<T> = iter.by_ref().take(size).collect();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }
    chunks
}
