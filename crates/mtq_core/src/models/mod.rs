//! Shared data models.
//!
//! These types describe a loaded media file as the actions see it:
//! tracks, metadata tags and artwork. Nothing here holds an open file
//! handle; the container library produces and consumes these values.

mod language;
mod media;
mod metadata;

pub use language::{is_undetermined, normalize_language, UNDETERMINED};
pub use media::{Chapter, ColorInfo, MediaFile, MediaKind, Track};
pub use metadata::{keys, Artwork, ArtworkFormat, Metadata, MetadataPreset, MetadataValue};
