use thiserror::Error;

use crate::types::ChunkId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Chunk id already indexed: {0}")]
    DuplicateChunk(ChunkId),

    #[error("Index membership diverged while ingesting {document}: {index} index holds {actual} entries, expected {expected}")]
    IndexInconsistency {
        document: String,
        index: &'static str,
        actual: usize,
        expected: usize,
    },

    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Lexical index failure: {0}")]
    Lexical(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
