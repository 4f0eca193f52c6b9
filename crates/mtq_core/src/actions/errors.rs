//! Error types for queue actions.

use std::io;

use thiserror::Error;

/// Error from an action, aborting the rest of the item's action chain.
#[derive(Error, Debug)]
pub enum ActionError {
    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    /// The configured metadata provider isn't registered.
    #[error("Unknown metadata provider: {0}")]
    UnknownProvider(String),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Generic action error with message.
    #[error("{0}")]
    Other(String),
}

impl ActionError {
    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Create an unknown provider error.
    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::UnknownProvider(name.into())
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Result type for action operations.
pub type ActionResult<T> = Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_displays_context() {
        let err = ActionError::io(
            "scanning subtitles",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("scanning subtitles"));
        assert!(msg.contains("denied"));
    }
}
