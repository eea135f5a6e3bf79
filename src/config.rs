use crate::commit::DropMode;

/// Configuration for one commit job run.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Deletion mode: drop annotated or drop unannotated vertices.
    pub drop_mode: DropMode,
    /// Retain tombstones for dropped vertices in the output.
    pub track_state: bool,
    /// Number of input/reduce partitions (worker threads).
    pub partitions: usize,
    /// Run the partial merger on collocated messages before the shuffle.
    pub combine: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            drop_mode: DropMode::Drop,
            track_state: false,
            partitions: default_partitions(),
            combine: true,
        }
    }
}

impl JobConfig {
    /// Everything on the calling thread, no combine; useful in tests where
    /// deterministic single-partition behavior matters.
    pub fn single_threaded() -> Self {
        Self {
            partitions: 1,
            combine: false,
            ..Self::default()
        }
    }

    /// Saturates the machine and merges aggressively before the shuffle.
    pub fn benchmark() -> Self {
        Self {
            partitions: default_partitions().max(4),
            combine: true,
            ..Self::default()
        }
    }
}

fn default_partitions() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
