//! Config manager for loading, saving, and atomic updates.
//!
//! Key features:
//! - Atomic writes (write to temp file, then rename)
//! - Section-level updates (only modified section is changed)
//! - Unknown sections are dropped on load
//! - Preserves comments and formatting with toml_edit

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};
use super::APP_DIR_NAME;

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Manages application configuration.
///
/// Handles loading, saving, and atomic section-level updates.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// `<platform config dir>/media-tag-queue/settings.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("settings.toml")
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a mutable reference to the current settings.
    ///
    /// Changes stay in memory until `save()` or `update_section()`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load config from file.
    ///
    /// Returns error if file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load config from file, creating with defaults if it doesn't exist.
    ///
    /// Missing keys are filled with defaults and written back.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let (settings, was_modified) = self.parse_and_clean(&content)?;
            self.settings = settings;

            if was_modified {
                tracing::debug!("Rewriting {} with defaults", self.config_path.display());
                self.save()?;
            }
        } else {
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Create the logs folder and the queue file's folder.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        fs::create_dir_all(self.logs_folder())?;
        if let Some(parent) = self.queue_file().parent() {
            fs::create_dir_all(parent)?;
        }
        if let Some(dest) = self.destination_folder() {
            fs::create_dir_all(dest)?;
        }
        Ok(())
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    pub fn queue_file(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.queue_file)
    }

    /// Output folder, `None` when outputs go next to their sources.
    pub fn destination_folder(&self) -> Option<PathBuf> {
        let folder = self.settings.paths.destination_folder.trim();
        (!folder.is_empty()).then(|| PathBuf::from(folder))
    }

    /// Parse content and report whether it needs rewriting.
    fn parse_and_clean(&self, content: &str) -> ConfigResult<(Settings, bool)> {
        let doc: DocumentMut = content.parse()?;
        let settings: Settings = toml::from_str(content)?;

        let valid_sections: Vec<&str> = ConfigSection::ALL.iter().map(|s| s.table_name()).collect();
        let has_unknown = doc.iter().any(|(key, _)| !valid_sections.contains(&key));

        let reserialized = toml::to_string_pretty(&settings)?;
        let was_modified = has_unknown || content.trim() != reserialized.trim();

        Ok((settings, was_modified))
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Update a specific section atomically.
    ///
    /// Re-reads the file from disk, replaces only the given section and
    /// writes back, keeping comments and the other sections as they are.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let current_content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current_content.is_empty() {
            DocumentMut::new()
        } else {
            current_content.parse()?
        };

        let section_doc: DocumentMut = self.section_toml(section)?.parse()?;
        doc[section.table_name()] = Item::Table(section_doc.as_table().clone());

        self.atomic_write(&doc.to_string())?;
        Ok(())
    }

    fn section_toml(&self, section: ConfigSection) -> ConfigResult<String> {
        Ok(match section {
            ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
            ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
            ConfigSection::Queue => toml::to_string_pretty(&self.settings.queue)?,
            ConfigSection::Actions => toml::to_string_pretty(&self.settings.actions)?,
        })
    }

    /// Generate config content with a comment above each section.
    fn generate_config_with_comments(&self) -> ConfigResult<String> {
        let mut output = String::new();
        output.push_str("# Media Tag Queue configuration\n");
        output.push_str(
            "# This file is auto-generated. Comments may be preserved on section updates.\n\n",
        );

        for section in ConfigSection::ALL {
            let comment = match section {
                ConfigSection::Paths => "# Queue file, output and log locations",
                ConfigSection::Logging => "# Logging configuration",
                ConfigSection::Queue => "# Queue run behaviour",
                ConfigSection::Actions => "# Default actions for new items",
            };
            output.push_str(comment);
            output.push('\n');
            output.push_str(&format!("[{}]\n", section.table_name()));
            for line in self.section_toml(section)?.lines() {
                output.push_str(line);
                output.push('\n');
            }
            output.push('\n');
        }

        Ok(output)
    }

    /// Write content to config file atomically.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.config_path)?;
        Ok(())
    }
}
