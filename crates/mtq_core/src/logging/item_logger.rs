//! Per-item logger with file and callback output.
//!
//! Each processed item gets its own logger that:
//! - Writes to a dedicated log file (when a log folder is configured)
//! - Sends messages to a callback (if provided)
//! - Maintains a tail buffer for the failure description

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-item logger with dual output (file + callback).
pub struct ItemLogger {
    /// Item name for identification.
    item_name: String,
    /// Path to log file, `None` when detached.
    log_path: Option<PathBuf>,
    file_writer: Mutex<Option<BufWriter<File>>>,
    callback: Mutex<Option<LogCallback>>,
    config: LogConfig,
    /// Recent lines (used for the failure description).
    tail_buffer: Mutex<VecDeque<String>>,
}

const SHORT_ID_LEN: usize = 8;

impl ItemLogger {
    /// Create a new item logger writing to `<log_dir>/<item_name>.log`.
    ///
    /// # Arguments
    /// * `item_name` - Name of the item (used in log filename)
    /// * `log_dir` - Directory to write log file to
    /// * `config` - Logging configuration
    /// * `callback` - Optional callback for UI output
    pub fn new(
        item_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let item_name = item_name.into();
        let stem = sanitize_filename(&item_name);
        Self::create(item_name, stem, log_dir.as_ref(), config, callback)
    }

    /// Create a logger for one queue item, writing to
    /// `<log_dir>/<item_name>-<short id>.log`.
    ///
    /// Items sharing a display name get separate files.
    pub fn for_item(
        item_name: impl Into<String>,
        item_id: &str,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let item_name = item_name.into();
        let short_id: String = item_id.chars().take(SHORT_ID_LEN).collect();
        let stem = format!(
            "{}-{}",
            sanitize_filename(&item_name),
            sanitize_filename(&short_id)
        );
        Self::create(item_name, stem, log_dir.as_ref(), config, callback)
    }

    fn create(
        item_name: String,
        stem: String,
        log_dir: &Path,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        fs::create_dir_all(log_dir)?;
        let log_path = log_dir.join(format!("{}.log", stem));
        let file = File::create(&log_path)?;

        Ok(Self {
            item_name,
            log_path: Some(log_path),
            file_writer: Mutex::new(Some(BufWriter::new(file))),
            callback: Mutex::new(callback),
            config,
            tail_buffer: Mutex::new(VecDeque::with_capacity(32)),
        })
    }

    /// Create a logger without a log file.
    ///
    /// Messages still reach the tail buffer and the `tracing` subscriber.
    pub fn detached(item_name: impl Into<String>, config: LogConfig) -> Self {
        Self {
            item_name: item_name.into(),
            log_path: None,
            file_writer: Mutex::new(None),
            callback: Mutex::new(None),
            config,
            tail_buffer: Mutex::new(VecDeque::with_capacity(32)),
        }
    }

    /// Get the item name.
    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    /// Get the log file path.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }
        match level {
            LogLevel::Trace => tracing::trace!(item = %self.item_name, "{}", message),
            LogLevel::Debug => tracing::debug!(item = %self.item_name, "{}", message),
            LogLevel::Info => tracing::info!(item = %self.item_name, "{}", message),
            LogLevel::Warn => tracing::warn!(item = %self.item_name, "{}", message),
            LogLevel::Error => tracing::error!(item = %self.item_name, "{}", message),
        }

        let formatted = self.format_message(message);
        self.push_tail(message);
        self.output(&formatted);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a phase marker (one per action).
    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        self.log(LogLevel::Info, &msg);
    }

    pub fn success(&self, message: &str) {
        let msg = MessagePrefix::Success.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Get the current tail buffer contents.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Clear the tail buffer.
    pub fn clear_tail(&self) {
        self.tail_buffer.lock().clear();
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release the file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    fn push_tail(&self, line: &str) {
        if self.config.error_tail == 0 {
            return;
        }
        let mut buffer = self.tail_buffer.lock();
        if buffer.len() >= self.config.error_tail {
            buffer.pop_front();
        }
        buffer.push_back(line.to_string());
    }

    /// Format a message with timestamp (if enabled).
    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }
        if let Some(ref callback) = *self.callback.lock() {
            callback(formatted);
        }
    }
}

impl Drop for ItemLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sanitize a string to be safe for use as a filename.
pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
