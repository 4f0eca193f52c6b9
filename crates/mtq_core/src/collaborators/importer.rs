//! Metadata provider interface and provider registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Artwork, Metadata};

/// Errors from a metadata provider.
#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned malformed data: {0}")]
    Malformed(String),

    #[error("Request was cancelled")]
    Cancelled,
}

/// Result type for provider calls.
pub type ImporterResult<T> = Result<T, ImporterError>;

/// What to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Movie { title: String },
    TvShow { series: String, season: u32, episode: u32 },
}

/// Whether a result describes a movie or a TV episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Movie,
    TvEpisode,
}

/// Artwork kinds offered by providers, also used as the preferred
/// artwork policy of a metadata fetch.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum ArtworkType {
    /// Don't fetch artwork.
    None,
    #[default]
    Poster,
    Season,
    Square,
    Rectangle,
    Episode,
    Backdrop,
}

impl ArtworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Poster => "poster",
            Self::Season => "season",
            Self::Square => "square",
            Self::Rectangle => "rectangle",
            Self::Episode => "episode",
            Self::Backdrop => "backdrop",
        }
    }
}

/// Artwork a provider can deliver on request.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteArtwork {
    pub url: String,
    pub kind: ArtworkType,
    /// Name of the provider hosting the artwork.
    pub service: String,
}

/// A search result, possibly partially loaded.
#[derive(Debug, Clone)]
pub struct MetadataResult {
    /// Provider-specific identifier.
    pub identifier: String,
    pub kind: ResultKind,
    pub metadata: Metadata,
    pub remote_artworks: Vec<RemoteArtwork>,
}

/// A metadata provider client.
///
/// Calls block the caller; they are only made from the queue worker.
pub trait MetadataImporter: Send + Sync {
    /// Provider name used in settings and action parameters.
    fn name(&self) -> &str;

    /// Search for candidates.
    fn search(&self, query: &SearchQuery, language: &str) -> ImporterResult<Vec<MetadataResult>>;

    /// Load the complete metadata for a search result.
    fn load_full_metadata(
        &self,
        result: &MetadataResult,
        language: &str,
    ) -> ImporterResult<MetadataResult>;

    /// Download an artwork.
    fn load_artwork(&self, artwork: &RemoteArtwork) -> ImporterResult<Artwork>;
}

/// Registry of metadata providers by name.
#[derive(Clone, Default)]
pub struct MetadataProviders {
    providers: BTreeMap<String, Arc<dyn MetadataImporter>>,
}

impl MetadataProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own name.
    pub fn register(&mut self, importer: Arc<dyn MetadataImporter>) {
        self.providers.insert(importer.name().to_string(), importer);
    }

    /// Register a provider (builder pattern).
    pub fn with(mut self, importer: Arc<dyn MetadataImporter>) -> Self {
        self.register(importer);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn MetadataImporter>> {
        self.providers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(|k| k.as_str()).collect()
    }
}

impl fmt::Debug for MetadataProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataProviders")
            .field("providers", &self.names())
            .finish()
    }
}
