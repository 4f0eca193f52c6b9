//! In-memory collaborators and fixtures shared by the unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::actions::{Action, ActionContext, ActionOutcome, ActionResult, ItemWorkspace};
use crate::collaborators::{
    Collaborators, ContainerError, ContainerLibrary, FixedDiskSpace, ImporterResult, MetadataImporter,
    MetadataProviders, MetadataResult, RemoteArtwork, ResultKind, SearchQuery, WriteOptions,
};
use crate::logging::{ItemLogger, LogConfig};
use crate::models::{keys, Artwork, ArtworkFormat, MediaFile, MediaKind, Metadata, Track};
use crate::queue::AttributeValue;
use crate::runner::{PowerError, SleepInhibitor};

/// Container library over a path → file map.
#[derive(Default)]
pub struct MemoryContainer {
    files: Mutex<HashMap<PathBuf, MediaFile>>,
    written: Mutex<HashMap<PathBuf, (MediaFile, WriteOptions)>>,
    failing: Mutex<HashSet<PathBuf>>,
}

impl MemoryContainer {
    pub fn insert(&self, path: impl Into<PathBuf>, file: MediaFile) {
        self.files.lock().insert(path.into(), file);
    }

    pub fn written(&self, path: impl AsRef<Path>) -> Option<MediaFile> {
        self.written
            .lock()
            .get(path.as_ref())
            .map(|(file, _)| file.clone())
    }

    pub fn write_options(&self, path: impl AsRef<Path>) -> Option<WriteOptions> {
        self.written
            .lock()
            .get(path.as_ref())
            .map(|(_, options)| options.clone())
    }

    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.failing.lock().insert(path.into());
    }
}

impl ContainerLibrary for MemoryContainer {
    fn open(&self, path: &Path) -> Result<MediaFile, ContainerError> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| ContainerError::NotFound(path.display().to_string()))
    }

    fn write(
        &self,
        file: &MediaFile,
        destination: &Path,
        options: &WriteOptions,
    ) -> Result<(), ContainerError> {
        if self.failing.lock().contains(destination) {
            return Err(ContainerError::Other("disk full".to_string()));
        }
        self.written
            .lock()
            .insert(destination.to_path_buf(), (file.clone(), options.clone()));
        Ok(())
    }
}

/// Video, AAC stereo and AC-3 surround, all with undetermined language.
pub fn sample_file() -> MediaFile {
    let mut file = MediaFile::new();
    file.tracks = vec![
        Track::new(1, MediaKind::Video, "avc1")
            .with_size(1920, 1080)
            .with_name("Video"),
        Track::new(2, MediaKind::Audio, "mp4a").with_channels(2),
        Track::new(3, MediaKind::Audio, "ac-3").with_channels(6),
    ];
    file.data_size = 1_000_000;
    file
}

/// Container plus a detached logger for driving `QueueItem::process`.
pub struct ItemHarness {
    pub container: Arc<MemoryContainer>,
    pub collaborators: Collaborators,
    pub logger: ItemLogger,
}

impl ItemHarness {
    pub fn new() -> Self {
        let container = Arc::new(MemoryContainer::default());
        let collaborators = Collaborators::new(container.clone(), MetadataProviders::new())
            .with_disk_space(Arc::new(FixedDiskSpace(Some(u64::MAX))));
        Self {
            container,
            collaborators,
            logger: ItemLogger::detached("test", LogConfig::default()),
        }
    }

    /// Report `bytes` of free space on every volume.
    pub fn with_free_space(mut self, bytes: u64) -> Self {
        self.collaborators = self
            .collaborators
            .with_disk_space(Arc::new(FixedDiskSpace(Some(bytes))));
        self
    }

    pub fn context(&self) -> ActionContext<'_> {
        ActionContext {
            collaborators: &self.collaborators,
            logger: &self.logger,
        }
    }
}

/// Metadata provider answering from a fixed title → result table.
pub struct ScriptedImporter {
    name: String,
    results: Mutex<Vec<(String, MetadataResult)>>,
    searches: AtomicUsize,
}

impl ScriptedImporter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Mutex::new(Vec::new()),
            searches: AtomicUsize::new(0),
        }
    }

    /// Answer searches for `title` (movie title or series name).
    pub fn add_result(&self, title: impl Into<String>, result: MetadataResult) {
        self.results.lock().push((title.into(), result));
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

impl MetadataImporter for ScriptedImporter {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, query: &SearchQuery, _language: &str) -> ImporterResult<Vec<MetadataResult>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let wanted = match query {
            SearchQuery::Movie { title } => title,
            SearchQuery::TvShow { series, .. } => series,
        };
        Ok(self
            .results
            .lock()
            .iter()
            .filter(|(title, _)| title.eq_ignore_ascii_case(wanted))
            .map(|(_, result)| result.clone())
            .collect())
    }

    fn load_full_metadata(
        &self,
        result: &MetadataResult,
        _language: &str,
    ) -> ImporterResult<MetadataResult> {
        Ok(result.clone())
    }

    fn load_artwork(&self, artwork: &RemoteArtwork) -> ImporterResult<Artwork> {
        Ok(Artwork::new(
            ArtworkFormat::Jpeg,
            artwork.url.as_bytes().to_vec(),
        ))
    }
}

pub fn movie_result(title: &str, remote_artworks: Vec<RemoteArtwork>) -> MetadataResult {
    MetadataResult {
        identifier: title.to_lowercase(),
        kind: ResultKind::Movie,
        metadata: Metadata::new().with_tag(keys::NAME, title),
        remote_artworks,
    }
}

/// Everything an action can touch, owned, for running one action at a
/// time outside a queue item.
pub struct ActionFixture {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub file: MediaFile,
    collaborators: Collaborators,
    logger: ItemLogger,
}

impl ActionFixture {
    pub fn new(source: impl AsRef<Path>) -> Self {
        let source = source.as_ref().to_path_buf();
        Self {
            destination: source.with_extension("mp4"),
            source,
            attributes: BTreeMap::new(),
            file: MediaFile::new(),
            collaborators: Collaborators::new(
                Arc::new(MemoryContainer::default()),
                MetadataProviders::new(),
            ),
            logger: ItemLogger::detached("fixture", LogConfig::default()),
        }
    }

    pub fn with_providers(mut self, importers: Vec<Arc<ScriptedImporter>>) -> Self {
        let mut providers = MetadataProviders::new();
        for importer in importers {
            providers.register(importer);
        }
        self.collaborators.providers = providers;
        self
    }

    pub fn run(&mut self, action: &Action) -> ActionResult<ActionOutcome> {
        let ctx = ActionContext {
            collaborators: &self.collaborators,
            logger: &self.logger,
        };
        let mut workspace = ItemWorkspace {
            source: &self.source,
            destination: &mut self.destination,
            attributes: &mut self.attributes,
            file: &mut self.file,
        };
        action.run(&mut workspace, &ctx)
    }
}

/// Sleep inhibitor that counts calls. Clones share the counters.
#[derive(Clone, Default)]
pub struct CountingInhibitor {
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl CountingInhibitor {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl SleepInhibitor for CountingInhibitor {
    fn acquire(&mut self) -> Result<(), PowerError> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
