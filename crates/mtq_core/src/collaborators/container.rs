//! Container library interface.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::models::MediaFile;
use crate::queue::AttributeValue;

/// Errors reported by the container library.
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Unsupported container: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Optimization failed: {0}")]
    OptimizeFailed(String),

    #[error("{0}")]
    Other(String),
}

/// Options passed to `ContainerLibrary::write`.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Run the structural rewrite/optimize pass after writing.
    pub optimize: bool,
    /// Item attributes (e.g. 64-bit data offsets) forwarded to the writer.
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// Media container manipulation, provided by an external library.
pub trait ContainerLibrary: Send + Sync {
    /// Load the file at `path` into a mutable in-memory representation.
    fn open(&self, path: &Path) -> Result<MediaFile, ContainerError>;

    /// Write `file` to `destination`.
    ///
    /// Must never modify any path other than `destination`.
    fn write(
        &self,
        file: &MediaFile,
        destination: &Path,
        options: &WriteOptions,
    ) -> Result<(), ContainerError>;
}
