//! Error types for queue items and queue editing.
//!
//! Errors carry context that chains through layers:
//! Item → Action → Detail

use std::io;

use thiserror::Error;

use crate::actions::ActionError;
use crate::collaborators::ContainerError;

use super::types::ItemStatus;

/// Loading the source failed. Fatal to the item only.
#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("Source file not found: {path}")]
    SourceMissing { path: String },

    #[error("Source file unreadable: {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("Unsupported container: {path}: {message}")]
    UnsupportedContainer { path: String, message: String },

    #[error("No destination for {path}")]
    DestinationUnresolvable { path: String },
}

impl PrepareError {
    pub fn source_missing(path: impl Into<String>) -> Self {
        Self::SourceMissing { path: path.into() }
    }

    pub fn unreadable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreadable {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_container(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedContainer {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn destination_unresolvable(path: impl Into<String>) -> Self {
        Self::DestinationUnresolvable { path: path.into() }
    }

    /// Classify a container open error.
    pub fn from_container(path: impl Into<String>, err: ContainerError) -> Self {
        let path = path.into();
        match err {
            ContainerError::NotFound(_) => Self::source_missing(path),
            ContainerError::Unsupported(message) => Self::unsupported_container(path, message),
            other => Self::unreadable(path, other.to_string()),
        }
    }
}

/// Writing the result failed. The source is untouched.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to write {path}: {message}")]
    Failed { path: String, message: String },

    #[error("Failed to optimize {path}: {message}")]
    OptimizeFailed { path: String, message: String },

    #[error("Not enough free space for {path}: {needed} bytes needed, {available} available")]
    OutOfDiskSpace {
        path: String,
        needed: u64,
        available: u64,
    },

    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl WriteError {
    pub fn failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classify a container write error.
    pub fn from_container(path: impl Into<String>, err: ContainerError) -> Self {
        let path = path.into();
        match err {
            ContainerError::OptimizeFailed(message) => Self::OptimizeFailed { path, message },
            ContainerError::Io(source) => Self::Io { path, source },
            other => Self::failed(path, other.to_string()),
        }
    }
}

/// Why processing an item did not complete.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error(transparent)]
    Prepare(#[from] PrepareError),

    #[error("Action '{action}' failed: {source}")]
    Action {
        action: String,
        #[source]
        source: ActionError,
    },

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("Item was cancelled")]
    Cancelled,

    #[error("Item can't be processed while {status}")]
    InvalidState { status: ItemStatus },
}

impl ItemError {
    pub fn action(action: impl Into<String>, source: ActionError) -> Self {
        Self::Action {
            action: action.into(),
            source,
        }
    }
}

/// Rejected queue edit.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    #[error("Item can't be edited while {status}")]
    NotEditable { status: ItemStatus },

    #[error("Invalid status change {from} -> {to}")]
    InvalidTransition { from: ItemStatus, to: ItemStatus },

    #[error("Index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("No item with id {0}")]
    NotFound(String),
}

/// Result type for item processing.
pub type ItemResult<T> = Result<T, ItemError>;

/// Result type for queue edits.
pub type QueueResult<T> = Result<T, QueueError>;
