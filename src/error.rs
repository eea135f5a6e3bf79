use std::io;
use thiserror::Error;

use crate::model::VertexId;

pub type Result<T> = std::result::Result<T, PodaError>;

#[derive(Debug, Error)]
pub enum PodaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("more than one authoritative record for vertex {0}")]
    DuplicateAuthority(VertexId),
    #[error("group for vertex {key} holds only kill notifications ({kills} distinct ids)")]
    OrphanGroup { key: VertexId, kills: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("worker thread failed: {0}")]
    WorkerFailed(String),
}
