//! Subtitles scan action - imports sidecar subtitle files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{normalize_language, MediaKind, Track, UNDETERMINED};

use super::{ActionContext, ActionError, ActionOutcome, ActionResult, ActionStep, ItemWorkspace};

/// Extensions recognized as sidecar subtitles.
const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "ass", "ssa", "vtt"];

/// Alternate group shared by subtitle tracks.
const SUBTITLE_GROUP: u16 = 2;

/// Searches the source directory for subtitles named after the source.
///
/// Matches `<stem>.srt` and `<stem>.<lang>[.forced].srt` (and the other
/// text subtitle extensions) and imports each as a disabled text track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubtitlesScan;

/// A sidecar subtitle found next to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Sidecar {
    path: PathBuf,
    language: &'static str,
    forced: bool,
}

impl SubtitlesScan {
    fn scan(source: &Path) -> ActionResult<Vec<Sidecar>> {
        let Some(stem) = source.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            return Ok(Vec::new());
        };
        let dir = match source.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let entries =
            fs::read_dir(dir).map_err(|e| ActionError::io("scanning subtitles folder", e))?;

        let prefix = format!("{}.", stem);
        let mut found = Vec::new();

        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };

            let mut parts: Vec<&str> = rest.split('.').collect();
            let Some(extension) = parts.pop() else {
                continue;
            };
            if !SUBTITLE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()) {
                continue;
            }

            let language = parts
                .iter()
                .find_map(|p| normalize_language(p))
                .unwrap_or(UNDETERMINED);
            let forced = parts.iter().any(|p| p.eq_ignore_ascii_case("forced"));

            found.push(Sidecar {
                path,
                language,
                forced,
            });
        }

        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }
}

impl ActionStep for SubtitlesScan {
    fn name(&self) -> &'static str {
        "SubtitlesScan"
    }

    fn description(&self) -> String {
        "Load Subtitles".to_string()
    }

    fn working_description(&self) -> String {
        "Loading subtitles".to_string()
    }

    fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        let sidecars = Self::scan(item.source)?;

        let mut imported = 0;
        for sidecar in sidecars {
            let already_imported = item
                .file
                .tracks
                .iter()
                .any(|t| t.source_path.as_deref() == Some(sidecar.path.as_path()));
            if already_imported {
                continue;
            }

            let mut track = Track::new(0, MediaKind::Subtitle, "tx3g").with_language(sidecar.language);
            track.enabled = false;
            track.alternate_group = SUBTITLE_GROUP;
            if sidecar.forced {
                track.name = Some("Forced".to_string());
            }
            ctx.logger.info(&format!(
                "Importing {} ({})",
                sidecar.path.display(),
                sidecar.language
            ));
            track.source_path = Some(sidecar.path);

            item.file.add_track(track);
            imported += 1;
        }

        if imported == 0 {
            Ok(ActionOutcome::Skipped("No sidecar subtitles found".to_string()))
        } else {
            Ok(ActionOutcome::Applied)
        }
    }
}
