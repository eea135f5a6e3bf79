//! In-process partition-parallel execution of the commit protocol.
//!
//! Plays the role of the distributed shuffle-sort engine for single-machine
//! runs and tests: classification fans out across worker threads, the
//! collector groups messages by vertex id, and reduction fans out again over
//! disjoint key ranges. The phase functions stay pure, so a cluster harness
//! can drive them instead of this engine without change.

mod executor;
mod shuffle;

pub use executor::{JobOutput, Pipeline, RunSummary};
pub use shuffle::group_by_key;
