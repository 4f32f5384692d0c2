//! Configuration data structures.
//!
//! All structs reject unknown fields. String overrides are keyed by
//! [`MessageKey`] names, so a misspelt key fails at parse time.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use super::defaults;
use crate::strings::MessageKey;
use crate::types::VolumeType;

/// Logging subsystem settings.
///
/// ```
/// use novade_device_notifications::config::LoggingConfig;
///
/// let config: LoggingConfig = toml::from_str("level = \"debug\"").unwrap();
/// assert_eq!(config.level, "debug");
/// assert_eq!(config.format, "text");
/// assert_eq!(config.file_path, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of "trace", "debug", "info", "warn", "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file; rotated daily.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::default_log_level(),
            file_path: defaults::default_log_file_path(),
            format: defaults::default_log_format(),
        }
    }
}

/// Media import gating.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    #[serde(default)]
    pub cloud_import_disabled: bool,
    #[serde(default = "defaults::default_importable_volume_types")]
    pub importable_volume_types: Vec<VolumeType>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            cloud_import_disabled: false,
            importable_volume_types: defaults::default_importable_volume_types(),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifierConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub import: ImportConfig,
    /// Per-key replacements for the built-in notification texts.
    #[serde(default)]
    pub strings: HashMap<MessageKey, String>,
}
