//! Metadata tags, artwork and saved presets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Well-known metadata identifiers.
pub mod keys {
    pub const NAME: &str = "Name";
    pub const ARTIST: &str = "Artist";
    pub const GENRE: &str = "Genre";
    pub const RELEASE_DATE: &str = "Release Date";
    pub const DESCRIPTION: &str = "Description";
    pub const TV_SHOW: &str = "TV Show";
    pub const TV_SEASON: &str = "TV Season";
    pub const TV_EPISODE_NUMBER: &str = "TV Episode #";
    pub const MEDIA_KIND: &str = "Media Kind";
    pub const HD_VIDEO: &str = "HD Video";
}

/// A single tag value.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub enum MetadataValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    TextList(Vec<String>),
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Encoded image format of an artwork.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub enum ArtworkFormat {
    Jpeg,
    Png,
    Bmp,
    Gif,
}

/// Cover art embedded in the file.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct Artwork {
    pub format: ArtworkFormat,
    pub data: Vec<u8>,
}

impl Artwork {
    pub fn new(format: ArtworkFormat, data: Vec<u8>) -> Self {
        Self { format, data }
    }
}

/// File-level metadata: identifier → value annotations plus artworks.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct Metadata {
    /// Annotations keyed by identifier.
    #[serde(default)]
    pub tags: BTreeMap<String, MetadataValue>,
    /// Cover art, in display order.
    #[serde(default)]
    pub artworks: Vec<Artwork>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.tags.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<MetadataValue> {
        self.tags.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.artworks.is_empty()
    }

    /// Remove every annotation and artwork.
    pub fn clear(&mut self) {
        self.tags.clear();
        self.artworks.clear();
    }

    /// Merge `other` into self.
    ///
    /// Incoming tags replace tags with the same identifier; incoming
    /// artworks are appended.
    pub fn merge(&mut self, other: &Metadata) {
        for (key, value) in &other.tags {
            self.tags.insert(key.clone(), value.clone());
        }
        self.artworks.extend(other.artworks.iter().cloned());
    }
}

/// A saved metadata snapshot that can be applied to many items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct MetadataPreset {
    /// Preset title (unique within a preset store).
    pub title: String,
    /// Snapshot to apply.
    pub metadata: Metadata,
    /// Drop existing artworks before adding the preset's.
    #[serde(default)]
    pub replace_artworks: bool,
    /// Drop all existing annotations before adding the preset's.
    #[serde(default)]
    pub replace_annotations: bool,
}

impl MetadataPreset {
    pub fn new(title: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            title: title.into(),
            metadata,
            replace_artworks: false,
            replace_annotations: false,
        }
    }

    /// Apply this preset to `target`.
    pub fn apply_to(&self, target: &mut Metadata) {
        if self.replace_annotations {
            target.tags.clear();
        }
        for (key, value) in &self.metadata.tags {
            target.tags.insert(key.clone(), value.clone());
        }

        if self.replace_artworks {
            target.artworks.clear();
        }
        target
            .artworks
            .extend(self.metadata.artworks.iter().cloned());
    }
}
