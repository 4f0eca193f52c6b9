//! Builds new queue items from the current settings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::actions::{
    Action, ClearExistingMetadata, ClearTrackNames, ColorSpaceFix, ColorSpaceTag, FallbacksFix,
    GroupsOrganize, MetadataFetch, PresetApply, PrettifyAudioTrackNames, RenameChapters,
    SelectAudioLanguage, SelectSubtitleLanguage, SetLanguage, SetOutputFilename, SubtitlesScan,
};
use crate::collaborators::PresetStore;
use crate::config::{ActionSettings, Settings};
use crate::models::MediaFile;

use super::item::QueueItem;
use super::types::{attributes, AttributeValue};

/// Extensions already in the output container family.
const MP4_EXTENSIONS: &[&str] = &["mp4", "m4v", "m4a", "m4b", "m4r"];

/// Creates items with a destination and the configured default actions.
pub struct ItemFactory {
    actions: ActionSettings,
    file_type: String,
    destination_folder: Option<PathBuf>,
    presets: Arc<dyn PresetStore>,
}

impl ItemFactory {
    pub fn new(settings: &Settings, presets: Arc<dyn PresetStore>) -> Self {
        let folder = settings.paths.destination_folder.trim();
        Self {
            actions: settings.actions.clone(),
            file_type: settings.queue.file_type.trim_start_matches('.').to_string(),
            destination_folder: (!folder.is_empty()).then(|| PathBuf::from(folder)),
            presets,
        }
    }

    /// Create an item for a file on disk.
    pub fn create(&self, source: impl Into<PathBuf>) -> QueueItem {
        let source = source.into();
        let destination = self.destination_for(&source);
        self.populate(QueueItem::new(source).with_destination(destination))
    }

    /// Create an item for a file that is already open.
    pub fn create_with_file(&self, source: impl Into<PathBuf>, file: MediaFile) -> QueueItem {
        let source = source.into();
        let destination = self.destination_for(&source);
        self.populate(QueueItem::with_file(source, file).with_destination(destination))
    }

    fn populate(&self, mut item: QueueItem) -> QueueItem {
        for action in self.default_actions() {
            item = item.with_action(action);
        }
        if self.actions.organize_groups {
            item = item.with_attribute(attributes::ORGANIZE, AttributeValue::Bool(true));
        }
        item
    }

    /// Where the output of `source` is written.
    ///
    /// The destination folder when configured, otherwise the source
    /// itself if it is already an MP4, otherwise the source with the
    /// configured extension.
    pub fn destination_for(&self, source: &Path) -> PathBuf {
        if let Some(folder) = &self.destination_folder {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            return folder.join(format!("{}.{}", stem, self.file_type));
        }

        let is_mp4 = source
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|e| MP4_EXTENSIONS.contains(&e.as_str()));
        if is_mp4 {
            source.to_path_buf()
        } else {
            source.with_extension(&self.file_type)
        }
    }

    /// Default action list, in execution order.
    pub fn default_actions(&self) -> Vec<Action> {
        let s = &self.actions;
        let mut actions = Vec::new();

        if s.clear_existing_metadata {
            actions.push(Action::ClearExistingMetadata(ClearExistingMetadata));
        }
        if s.search_metadata {
            actions.push(Action::MetadataFetch(MetadataFetch::new(
                s.movie_language.as_str(),
                s.tv_show_language.as_str(),
                s.movie_provider.as_str(),
                s.tv_show_provider.as_str(),
                s.artwork_policy,
            )));
        }
        if s.set_output_filename {
            actions.push(Action::SetOutputFilename(SetOutputFilename));
        }
        if s.subtitles {
            actions.push(Action::SubtitlesScan(SubtitlesScan));
        }
        if s.organize_groups {
            actions.push(Action::GroupsOrganize(GroupsOrganize));
        }
        if s.fix_fallbacks {
            actions.push(Action::FallbacksFix(FallbacksFix));
        }
        if s.clear_track_names {
            actions.push(Action::ClearTrackNames(ClearTrackNames));
        }
        if s.prettify_audio_track_names {
            actions.push(Action::PrettifyAudioTrackNames(PrettifyAudioTrackNames));
        }
        if s.rename_chapters {
            actions.push(Action::RenameChapters(RenameChapters));
        }
        if s.fix_track_language {
            actions.push(Action::SetLanguage(SetLanguage::new(
                s.fix_track_language_value.as_str(),
            )));
        }
        if s.apply_color_space {
            match ColorSpaceTag::from_code(s.color_space) {
                Some(tag) => actions.push(Action::ColorSpaceFix(ColorSpaceFix::named(tag))),
                None => tracing::warn!("Unknown color space tag {}, skipped", s.color_space),
            }
        }
        let preset_name = s.preset_name.trim();
        if !preset_name.is_empty() {
            match self.presets.preset_named(preset_name) {
                Some(preset) => actions.push(Action::PresetApply(PresetApply::new(preset))),
                None => tracing::warn!("Preset '{}' not found, skipped", preset_name),
            }
        }
        if s.select_audio_language {
            actions.push(Action::SelectAudioLanguage(SelectAudioLanguage::new(
                s.select_audio_language_value.as_str(),
            )));
        }
        if s.select_subtitle_language {
            actions.push(Action::SelectSubtitleLanguage(SelectSubtitleLanguage::new(
                s.select_subtitle_language_value.as_str(),
            )));
        }

        actions
    }
}
