//! The deletion-commit protocol.
//!
//! Three pure phase functions, driven by an external grouping engine:
//! [`classify`] decides keep/drop per vertex and emits keyed notification
//! messages, [`combine`] opportunistically merges collocated messages that
//! share a key, and [`commit_group`] performs the final per-vertex assembly.
//! Correctness never depends on the combine step running; the committer
//! accepts merged and unmerged groups identically.

mod classifier;
mod combiner;
mod committer;
mod message;

pub use classifier::{classify, DropMode};
pub use combiner::combine;
pub use committer::{commit_group, CommittedVertex};
pub use message::{KeyedMessage, TaggedMessage};
