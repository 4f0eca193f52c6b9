//! Interfaces to the external collaborators the queue drives.
//!
//! The queue core never touches container internals or provider
//! network APIs itself. It talks to them through these traits:
//! - `ContainerLibrary`: open a source into a `MediaFile`, write it back
//! - `MetadataImporter`: search a metadata provider and load results
//! - `FilenameParser`: turn a filename into a search query
//! - `PresetStore`: look up saved metadata presets by name
//! - `DiskSpace`: free space on the destination volume

mod container;
mod disk;
mod filename;
mod importer;
mod presets;

use std::sync::Arc;

pub use container::{ContainerError, ContainerLibrary, WriteOptions};
pub use disk::{DiskSpace, FixedDiskSpace, SystemDiskSpace};
pub use filename::{ConventionFilenameParser, FilenameInfo, FilenameParser};
pub use importer::{
    ArtworkType, ImporterError, ImporterResult, MetadataImporter, MetadataProviders,
    MetadataResult, RemoteArtwork, ResultKind, SearchQuery,
};
pub use presets::{DirectoryPresetStore, MemoryPresetStore, PresetStore, PresetStoreError};

/// Everything an item needs from the outside world while processing.
///
/// Cheap to clone; all members are shared.
#[derive(Clone)]
pub struct Collaborators {
    pub container: Arc<dyn ContainerLibrary>,
    pub providers: MetadataProviders,
    pub filename_parser: Arc<dyn FilenameParser>,
    pub presets: Arc<dyn PresetStore>,
    pub disk_space: Arc<dyn DiskSpace>,
}

impl Collaborators {
    /// Create a bundle with the default filename parser, no presets and
    /// the system's free space lookup.
    pub fn new(container: Arc<dyn ContainerLibrary>, providers: MetadataProviders) -> Self {
        Self {
            container,
            providers,
            filename_parser: Arc::new(ConventionFilenameParser::new()),
            presets: Arc::new(MemoryPresetStore::new()),
            disk_space: Arc::new(SystemDiskSpace::new()),
        }
    }

    pub fn with_filename_parser(mut self, parser: Arc<dyn FilenameParser>) -> Self {
        self.filename_parser = parser;
        self
    }

    pub fn with_presets(mut self, presets: Arc<dyn PresetStore>) -> Self {
        self.presets = presets;
        self
    }

    pub fn with_disk_space(mut self, disk_space: Arc<dyn DiskSpace>) -> Self {
        self.disk_space = disk_space;
        self
    }
}
