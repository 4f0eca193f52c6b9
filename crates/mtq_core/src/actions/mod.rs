//! Queue actions: the mutation steps run against a loaded file.
//!
//! Actions form a closed set. Each variant carries only its own
//! construction parameters, so a pending queue can be persisted without
//! any open file. Dispatch is an exhaustive match over [`Action`].
//!
//! # Architecture
//!
//! ```text
//! QueueItem::process
//!     ├── prepare (container open)
//!     ├── Action 1 ── ActionStep::run(&mut ItemWorkspace, &ActionContext)
//!     ├── Action 2
//!     ├── ...
//!     └── write (container write, optional optimize)
//! ```

mod chapters;
mod color_space;
mod errors;
mod metadata_fetch;
mod output_name;
mod preset;
mod select_language;
mod set_language;
mod subtitles_scan;
mod tracks;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use chapters::RenameChapters;
pub use color_space::{ColorSpace, ColorSpaceFix, ColorSpaceTag};
pub use errors::{ActionError, ActionResult};
pub use metadata_fetch::{hd_video_level, MetadataFetch};
pub use output_name::SetOutputFilename;
pub use preset::{ClearExistingMetadata, PresetApply};
pub use select_language::{SelectAudioLanguage, SelectSubtitleLanguage};
pub use set_language::SetLanguage;
pub use subtitles_scan::SubtitlesScan;
pub use tracks::{ClearTrackNames, FallbacksFix, GroupsOrganize, PrettifyAudioTrackNames};

use crate::collaborators::Collaborators;
use crate::logging::ItemLogger;
use crate::models::MediaFile;
use crate::queue::AttributeValue;

/// The parts of a queue item an action may read and mutate.
pub struct ItemWorkspace<'a> {
    /// Original source file (never written).
    pub source: &'a Path,
    /// Where the result will be written.
    pub destination: &'a mut PathBuf,
    /// Item annotations.
    pub attributes: &'a mut BTreeMap<String, AttributeValue>,
    /// The loaded file being mutated.
    pub file: &'a mut MediaFile,
}

/// Read-only context passed to actions.
pub struct ActionContext<'a> {
    pub collaborators: &'a Collaborators,
    pub logger: &'a ItemLogger,
}

/// Result of running an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action changed the item.
    Applied,
    /// Nothing to do (not an error).
    Skipped(String),
}

/// Behaviour shared by every action variant.
pub trait ActionStep {
    /// Short name for logs and error context.
    fn name(&self) -> &'static str;

    /// Description for listings ("Apply Kids preset").
    fn description(&self) -> String;

    /// Present-progressive description shown while running
    /// ("Applying Kids preset").
    fn working_description(&self) -> String;

    /// Mutate the item's file in place.
    fn run(&self, item: &mut ItemWorkspace<'_>, ctx: &ActionContext<'_>) -> ActionResult<ActionOutcome>;
}

/// A queue action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MetadataFetch(MetadataFetch),
    SubtitlesScan(SubtitlesScan),
    PresetApply(PresetApply),
    GroupsOrganize(GroupsOrganize),
    FallbacksFix(FallbacksFix),
    ClearTrackNames(ClearTrackNames),
    SetLanguage(SetLanguage),
    ColorSpaceFix(ColorSpaceFix),
    ClearExistingMetadata(ClearExistingMetadata),
    PrettifyAudioTrackNames(PrettifyAudioTrackNames),
    SetOutputFilename(SetOutputFilename),
    RenameChapters(RenameChapters),
    SelectAudioLanguage(SelectAudioLanguage),
    SelectSubtitleLanguage(SelectSubtitleLanguage),
}

impl Action {
    /// Stable tag identifying the variant in persisted queues.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::MetadataFetch(_) => tags::METADATA_FETCH,
            Self::SubtitlesScan(_) => tags::SUBTITLES_SCAN,
            Self::PresetApply(_) => tags::PRESET_APPLY,
            Self::GroupsOrganize(_) => tags::GROUPS_ORGANIZE,
            Self::FallbacksFix(_) => tags::FALLBACKS_FIX,
            Self::ClearTrackNames(_) => tags::CLEAR_TRACK_NAMES,
            Self::SetLanguage(_) => tags::SET_LANGUAGE,
            Self::ColorSpaceFix(_) => tags::COLOR_SPACE_FIX,
            Self::ClearExistingMetadata(_) => tags::CLEAR_EXISTING_METADATA,
            Self::PrettifyAudioTrackNames(_) => tags::PRETTIFY_AUDIO_TRACK_NAMES,
            Self::SetOutputFilename(_) => tags::SET_OUTPUT_FILENAME,
            Self::RenameChapters(_) => tags::RENAME_CHAPTERS,
            Self::SelectAudioLanguage(_) => tags::SELECT_AUDIO_LANGUAGE,
            Self::SelectSubtitleLanguage(_) => tags::SELECT_SUBTITLE_LANGUAGE,
        }
    }

    fn step(&self) -> &dyn ActionStep {
        match self {
            Self::MetadataFetch(a) => a,
            Self::SubtitlesScan(a) => a,
            Self::PresetApply(a) => a,
            Self::GroupsOrganize(a) => a,
            Self::FallbacksFix(a) => a,
            Self::ClearTrackNames(a) => a,
            Self::SetLanguage(a) => a,
            Self::ColorSpaceFix(a) => a,
            Self::ClearExistingMetadata(a) => a,
            Self::PrettifyAudioTrackNames(a) => a,
            Self::SetOutputFilename(a) => a,
            Self::RenameChapters(a) => a,
            Self::SelectAudioLanguage(a) => a,
            Self::SelectSubtitleLanguage(a) => a,
        }
    }

    pub fn name(&self) -> &'static str {
        self.step().name()
    }

    pub fn description(&self) -> String {
        self.step().description()
    }

    pub fn working_description(&self) -> String {
        self.step().working_description()
    }

    pub fn run(
        &self,
        item: &mut ItemWorkspace<'_>,
        ctx: &ActionContext<'_>,
    ) -> ActionResult<ActionOutcome> {
        self.step().run(item, ctx)
    }
}

/// Persisted variant tags. Decoding accepts only these.
pub mod tags {
    pub const METADATA_FETCH: &str = "metadata_fetch";
    pub const SUBTITLES_SCAN: &str = "subtitles_scan";
    pub const PRESET_APPLY: &str = "preset_apply";
    pub const GROUPS_ORGANIZE: &str = "groups_organize";
    pub const FALLBACKS_FIX: &str = "fallbacks_fix";
    pub const CLEAR_TRACK_NAMES: &str = "clear_track_names";
    pub const SET_LANGUAGE: &str = "set_language";
    pub const COLOR_SPACE_FIX: &str = "color_space_fix";
    pub const CLEAR_EXISTING_METADATA: &str = "clear_existing_metadata";
    pub const PRETTIFY_AUDIO_TRACK_NAMES: &str = "prettify_audio_track_names";
    pub const SET_OUTPUT_FILENAME: &str = "set_output_filename";
    pub const RENAME_CHAPTERS: &str = "rename_chapters";
    pub const SELECT_AUDIO_LANGUAGE: &str = "select_audio_language";
    pub const SELECT_SUBTITLE_LANGUAGE: &str = "select_subtitle_language";

    /// Every tag the decoder accepts.
    pub const ALL: &[&str] = &[
        METADATA_FETCH,
        SUBTITLES_SCAN,
        PRESET_APPLY,
        GROUPS_ORGANIZE,
        FALLBACKS_FIX,
        CLEAR_TRACK_NAMES,
        SET_LANGUAGE,
        COLOR_SPACE_FIX,
        CLEAR_EXISTING_METADATA,
        PRETTIFY_AUDIO_TRACK_NAMES,
        SET_OUTPUT_FILENAME,
        RENAME_CHAPTERS,
        SELECT_AUDIO_LANGUAGE,
        SELECT_SUBTITLE_LANGUAGE,
    ];
}
