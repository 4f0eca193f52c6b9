//! In-memory media file representation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::language::UNDETERMINED;
use super::metadata::Metadata;

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
    Subtitle,
    ClosedCaption,
    Chapters,
    Other,
}

impl MediaKind {
    /// Get display string for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
            Self::ClosedCaption => "closed caption",
            Self::Chapters => "chapters",
            Self::Other => "other",
        }
    }
}

/// Color description stamped on a video track (ISO/IEC 23001-8 codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorInfo {
    pub primaries: u16,
    pub transfer: u16,
    pub matrix: u16,
}

impl ColorInfo {
    pub fn new(primaries: u16, transfer: u16, matrix: u16) -> Self {
        Self {
            primaries,
            transfer,
            matrix,
        }
    }
}

/// A single track inside a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Track ID, unique within the file.
    pub id: u32,
    /// Media kind.
    pub kind: MediaKind,
    /// Codec/format identifier (e.g. "avc1", "ac-3", "tx3g").
    pub format: String,
    /// ISO 639-2 language code, `und` when unknown.
    pub language: String,
    /// User-visible track name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Alternate group (0 = none).
    #[serde(default)]
    pub alternate_group: u16,
    /// ID of the track to fall back to when this one can't be played.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_track_id: Option<u32>,
    /// Whether the track is enabled by default.
    pub enabled: bool,
    /// Audio channel count (audio tracks only).
    #[serde(default)]
    pub channels: u16,
    /// Pixel width (video tracks only).
    #[serde(default)]
    pub width: u32,
    /// Pixel height (video tracks only).
    #[serde(default)]
    pub height: u32,
    /// Color description (video tracks only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorInfo>,
    /// External file this track is imported from (sidecar subtitles).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl Track {
    /// Create an enabled track with unknown language.
    pub fn new(id: u32, kind: MediaKind, format: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            format: format.into(),
            language: UNDETERMINED.to_string(),
            name: None,
            alternate_group: 0,
            fallback_track_id: None,
            enabled: true,
            channels: 0,
            width: 0,
            height: 0,
            color: None,
            source_path: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Check if this is an AC-3 family audio track.
    pub fn is_ac3(&self) -> bool {
        self.kind == MediaKind::Audio && matches!(self.format.as_str(), "ac-3" | "ec-3")
    }

    /// Check if this is an AAC audio track.
    pub fn is_aac(&self) -> bool {
        self.kind == MediaKind::Audio && self.format == "mp4a"
    }
}

/// A chapter marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Start time in milliseconds.
    pub start_ms: u64,
    pub title: String,
}

impl Chapter {
    pub fn new(start_ms: u64, title: impl Into<String>) -> Self {
        Self {
            start_ms,
            title: title.into(),
        }
    }
}

/// A loaded, mutable media file.
///
/// Produced by the container library from a source path and written back
/// to the destination once every action has run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Tracks in file order.
    pub tracks: Vec<Track>,
    /// File-level metadata.
    pub metadata: Metadata,
    /// Chapter markers in time order.
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    /// Estimated size of the media data in bytes.
    #[serde(default)]
    pub data_size: u64,
}

impl MediaFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks of the given kind.
    pub fn tracks_of(&self, kind: MediaKind) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(move |t| t.kind == kind)
    }

    /// Mutable tracks of the given kind.
    pub fn tracks_of_mut(&mut self, kind: MediaKind) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut().filter(move |t| t.kind == kind)
    }

    /// Find a track by ID.
    pub fn track(&self, id: u32) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Next free track ID.
    pub fn next_track_id(&self) -> u32 {
        self.tracks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Append a track, assigning it a fresh ID.
    pub fn add_track(&mut self, mut track: Track) -> u32 {
        track.id = self.next_track_id();
        let id = track.id;
        self.tracks.push(track);
        id
    }
}
