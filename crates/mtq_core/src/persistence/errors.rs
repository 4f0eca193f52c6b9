//! Persistence errors.

use std::io;

use thiserror::Error;

/// Queue file unreadable or corrupt. Recovered by starting empty.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Queue file I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Not a queue file")]
    BadMagic,

    #[error("Unsupported queue schema version {0}")]
    UnsupportedVersion(u16),

    #[error("Failed to decode queue: {0}")]
    Decode(#[from] bitcode::Error),
}

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;
