//! Metadata fetch action - searches a provider using the filename.

use crate::collaborators::{ArtworkType, MetadataImporter, RemoteArtwork};
use crate::models::{keys, MediaFile, MediaKind};

use super::{ActionContext, ActionError, ActionOutcome, ActionResult, ActionStep, ItemWorkspace};

/// Searches metadata online and merges the best match into the file.
///
/// Fails soft: an unparseable filename, a provider error or an empty
/// result list leave the file untouched and the item healthy.
#[derive(Debug, Clone, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct MetadataFetch {
    pub movie_language: String,
    pub tv_show_language: String,
    pub movie_provider: String,
    pub tv_show_provider: String,
    pub preferred_artwork: ArtworkType,
}

impl MetadataFetch {
    pub fn new(
        movie_language: impl Into<String>,
        tv_show_language: impl Into<String>,
        movie_provider: impl Into<String>,
        tv_show_provider: impl Into<String>,
        preferred_artwork: ArtworkType,
    ) -> Self {
        Self {
            movie_language: movie_language.into(),
            tv_show_language: tv_show_language.into(),
            movie_provider: movie_provider.into(),
            tv_show_provider: tv_show_provider.into(),
            preferred_artwork,
        }
    }

    fn load_artwork(
        &self,
        importer: &dyn MetadataImporter,
        artworks: &[RemoteArtwork],
        service: &str,
        ctx: &ActionContext<'_>,
    ) -> Option<crate::models::Artwork> {
        if self.preferred_artwork == ArtworkType::None {
            return None;
        }
        let remote = select_artwork(artworks, self.preferred_artwork, service)?;
        match importer.load_artwork(remote) {
            Ok(artwork) => Some(artwork),
            Err(e) => {
                ctx.logger
                    .warn(&format!("Failed to load artwork {}: {}", remote.url, e));
                None
            }
        }
    }
}

/// Pick an artwork: preferred kind, then season, then poster, then any.
///
/// Within a kind, artworks hosted by `service` win.
fn select_artwork<'a>(
    artworks: &'a [RemoteArtwork],
    preferred: ArtworkType,
    service: &str,
) -> Option<&'a RemoteArtwork> {
    let by_kind = |kind: ArtworkType| {
        artworks
            .iter()
            .find(|a| a.kind == kind && a.service == service)
            .or_else(|| artworks.iter().find(|a| a.kind == kind))
    };

    by_kind(preferred)
        .or_else(|| by_kind(ArtworkType::Season))
        .or_else(|| by_kind(ArtworkType::Poster))
        .or_else(|| artworks.first())
}

/// HD flag value for a frame size: 0 = SD, 1 = 720p, 2 = 1080p, 3 = 2160p.
pub fn hd_video_level(width: u32, height: u32) -> i64 {
    if width >= 3840 || height >= 2160 {
        3
    } else if width >= 1920 || height >= 1080 {
        2
    } else if width >= 1280 || height >= 720 {
        1
    } else {
        0
    }
}

fn file_hd_level(file: &MediaFile) -> i64 {
    file.tracks_of(MediaKind::Video)
        .map(|t| hd_video_level(t.width, t.height))
        .max()
        .unwrap_or(0)
}

impl ActionStep for MetadataFetch {
    fn name(&self) -> &'static str {
        "MetadataFetch"
    }

    fn description(&self) -> String {
        "Search Metadata".to_string()
    }

    fn working_description(&self) -> String {
        "Searching metadata".to_string()
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        let file_name = item
            .source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let Some(info) = ctx.collaborators.filename_parser.parse(&file_name) else {
            return Ok(ActionOutcome::Skipped(format!(
                "No title found in '{}'",
                file_name
            )));
        };

        let (provider_name, language) = if info.is_tv_show() {
            (&self.tv_show_provider, &self.tv_show_language)
        } else {
            (&self.movie_provider, &self.movie_language)
        };

        let importer = ctx
            .collaborators
            .providers
            .get(provider_name)
            .ok_or_else(|| ActionError::unknown_provider(provider_name.as_str()))?;

        let query = info.to_query();
        ctx.logger.info(&format!(
            "Searching {} for {:?} ({})",
            provider_name, query, language
        ));

        let results = match importer.search(&query, language) {
            Ok(results) => results,
            Err(e) => {
                ctx.logger.warn(&format!("Search failed: {}", e));
                return Ok(ActionOutcome::Skipped(format!("Search failed: {}", e)));
            }
        };

        let Some(best) = results.first() else {
            return Ok(ActionOutcome::Skipped("No results".to_string()));
        };

        let full = match importer.load_full_metadata(best, language) {
            Ok(full) => full,
            Err(e) => {
                ctx.logger.warn(&format!("Loading result failed: {}", e));
                return Ok(ActionOutcome::Skipped(format!("Loading result failed: {}", e)));
            }
        };

        let mut metadata = full.metadata;
        if let Some(artwork) =
            self.load_artwork(importer.as_ref(), &full.remote_artworks, provider_name, ctx)
        {
            metadata.artworks.push(artwork);
        }

        let hd = file_hd_level(item.file);
        if hd > 0 {
            metadata.set(keys::HD_VIDEO, hd);
        }

        ctx.logger.info(&format!(
            "Merging {} tags, {} artworks",
            metadata.tags.len(),
            metadata.artworks.len()
        ));
        item.file.metadata.merge(&metadata);
        Ok(ActionOutcome::Applied)
    }
}
