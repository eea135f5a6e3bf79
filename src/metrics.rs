/// Counters reported by one job run.
///
/// Each phase invocation returns its own delta; the engine merges them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobCounters {
    /// Vertices the classifier kept.
    pub vertices_kept: u64,
    /// Vertices the classifier dropped.
    pub vertices_dropped: u64,
    /// Post-prune outgoing edges across all committed vertices.
    pub out_edges_kept: u64,
    /// Post-prune incoming edges across all committed vertices.
    pub in_edges_kept: u64,
}

impl JobCounters {
    /// Creates a zeroed counter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `other` into `self` field-wise.
    pub fn merge(&mut self, other: &JobCounters) {
        self.vertices_kept += other.vertices_kept;
        self.vertices_dropped += other.vertices_dropped;
        self.out_edges_kept += other.out_edges_kept;
        self.in_edges_kept += other.in_edges_kept;
    }

    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Prints a human-readable report to stdout.
    pub fn print_report(&self) {
        println!("\n=== Commit Job Counters ===");
        println!("Vertices Kept:     {}", self.vertices_kept);
        println!("Vertices Dropped:  {}", self.vertices_dropped);
        println!("Out Edges Kept:    {}", self.out_edges_kept);
        println!("In Edges Kept:     {}", self.in_edges_kept);
    }
}
