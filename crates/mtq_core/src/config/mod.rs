//! Configuration management for the queue engine.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Defaults for anything missing
//!
//! # Example
//!
//! ```no_run
//! use mtq_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(ConfigManager::default_path());
//! config.load_or_create().unwrap();
//!
//! println!("Queue file: {}", config.settings().paths.queue_file);
//!
//! config.settings_mut().queue.optimize = true;
//! config.update_section(ConfigSection::Queue).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ActionSettings, ConfigSection, LoggingSettings, PathSettings, QueueSettings, Settings,
};

/// Directory name used under the platform config and data directories.
pub const APP_DIR_NAME: &str = "media-tag-queue";
