//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::actions::ColorSpaceTag;
use crate::collaborators::ArtworkType;
use crate::logging::{LogConfig, LogLevel};

use super::APP_DIR_NAME;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub queue: QueueSettings,

    /// Default actions for newly enqueued items.
    #[serde(default)]
    pub actions: ActionSettings,
}

impl Settings {
    /// Per-item logger configuration.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.logging.level,
            error_tail: self.logging.error_tail as usize,
            show_timestamps: true,
        }
    }
}

/// Locations of the queue file, outputs and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Persisted queue file.
    #[serde(default = "default_queue_file")]
    pub queue_file: String,

    /// Output folder; empty writes next to the source.
    #[serde(default)]
    pub destination_folder: String,

    /// Folder for per-item and application logs.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".mtq"))
}

fn default_queue_file() -> String {
    data_dir().join("queue.mtq").to_string_lossy().to_string()
}

fn default_logs_folder() -> String {
    data_dir().join("logs").to_string_lossy().to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            queue_file: default_queue_file(),
            destination_folder: String::new(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for the application log.
    #[serde(default)]
    pub level: LogLevel,

    /// Number of log lines retained with a failed item.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Write one log file per processed item.
    #[serde(default = "default_true")]
    pub item_logs: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            error_tail: default_error_tail(),
            item_logs: true,
        }
    }
}

/// Queue run behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Output file extension.
    #[serde(default = "default_file_type")]
    pub file_type: String,

    /// Run the optimize pass after writing.
    #[serde(default)]
    pub optimize: bool,

    /// Start the queue as soon as items are added.
    #[serde(default)]
    pub auto_start: bool,

    /// End the run at the first failed item instead of continuing.
    #[serde(default)]
    pub stop_on_failure: bool,
}

fn default_file_type() -> String {
    "mp4".to_string()
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            file_type: default_file_type(),
            optimize: false,
            auto_start: false,
            stop_on_failure: false,
        }
    }
}

/// Default actions added to newly enqueued items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSettings {
    #[serde(default)]
    pub clear_existing_metadata: bool,

    #[serde(default = "default_true")]
    pub search_metadata: bool,

    #[serde(default = "default_movie_provider")]
    pub movie_provider: String,

    #[serde(default = "default_language")]
    pub movie_language: String,

    #[serde(default = "default_tv_show_provider")]
    pub tv_show_provider: String,

    #[serde(default = "default_language")]
    pub tv_show_language: String,

    #[serde(default)]
    pub artwork_policy: ArtworkType,

    #[serde(default)]
    pub set_output_filename: bool,

    /// Import sidecar subtitles.
    #[serde(default = "default_true")]
    pub subtitles: bool,

    #[serde(default = "default_true")]
    pub organize_groups: bool,

    #[serde(default = "default_true")]
    pub fix_fallbacks: bool,

    #[serde(default)]
    pub clear_track_names: bool,

    #[serde(default)]
    pub prettify_audio_track_names: bool,

    /// Number chapters as "Chapter N".
    #[serde(default)]
    pub rename_chapters: bool,

    /// Set the language of tracks with unknown language.
    #[serde(default)]
    pub fix_track_language: bool,

    #[serde(default = "default_track_language")]
    pub fix_track_language_value: String,

    #[serde(default)]
    pub apply_color_space: bool,

    /// Numeric color space tag (see `ColorSpaceTag::code`).
    #[serde(default = "default_color_space")]
    pub color_space: u16,

    /// Preset applied to every item; empty for none.
    #[serde(default)]
    pub preset_name: String,

    /// Enable the audio track in `select_audio_language_value`.
    #[serde(default)]
    pub select_audio_language: bool,

    #[serde(default = "default_language")]
    pub select_audio_language_value: String,

    /// Enable the subtitle track in `select_subtitle_language_value`.
    #[serde(default)]
    pub select_subtitle_language: bool,

    #[serde(default = "default_language")]
    pub select_subtitle_language_value: String,
}

fn default_movie_provider() -> String {
    "TheMovieDB".to_string()
}

fn default_tv_show_provider() -> String {
    "TheTVDB".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_track_language() -> String {
    "eng".to_string()
}

fn default_color_space() -> u16 {
    ColorSpaceTag::Rec709.code()
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            clear_existing_metadata: false,
            search_metadata: true,
            movie_provider: default_movie_provider(),
            movie_language: default_language(),
            tv_show_provider: default_tv_show_provider(),
            tv_show_language: default_language(),
            artwork_policy: ArtworkType::default(),
            set_output_filename: false,
            subtitles: true,
            organize_groups: true,
            fix_fallbacks: true,
            clear_track_names: false,
            prettify_audio_track_names: false,
            rename_chapters: false,
            fix_track_language: false,
            fix_track_language_value: default_track_language(),
            apply_color_space: false,
            color_space: default_color_space(),
            preset_name: String::new(),
            select_audio_language: false,
            select_audio_language_value: default_language(),
            select_subtitle_language: false,
            select_subtitle_language_value: default_language(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Queue,
    Actions,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 4] = [Self::Paths, Self::Logging, Self::Queue, Self::Actions];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Queue => "queue",
            ConfigSection::Actions => "actions",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[queue]"));
        assert!(toml.contains("[actions]"));
        assert!(toml.contains("artwork_policy = \"poster\""));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[queue]\nfile_type = \"m4v\"\n[logging]\nlevel = \"debug\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.queue.file_type, "m4v");
        assert!(!parsed.queue.stop_on_failure);
        assert_eq!(parsed.logging.level, LogLevel::Debug);
        assert_eq!(parsed.logging.error_tail, 20);
        assert!(parsed.actions.search_metadata);
        assert_eq!(parsed.actions.color_space, ColorSpaceTag::Rec709.code());
    }

    #[test]
    fn log_config_follows_logging_section() {
        let mut settings = Settings::default();
        settings.logging.error_tail = 7;
        assert_eq!(settings.log_config().error_tail, 7);
    }
}
