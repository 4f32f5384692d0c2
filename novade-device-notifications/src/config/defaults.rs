//! Default configuration values, used by `serde`'s `default` attributes.

use std::path::PathBuf;

use crate::types::VolumeType;

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

/// No log file by default.
pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

pub(super) fn default_log_format() -> String {
    "text".to_string()
}

pub(super) fn default_importable_volume_types() -> Vec<VolumeType> {
    vec![VolumeType::Removable, VolumeType::Mtp]
}

/// File name looked up in the system and user configuration directories.
pub const CONFIG_FILE_NAME: &str = "device-notifications.toml";

/// System-wide configuration directory.
pub const SYSTEM_CONFIG_DIR: &str = "/etc/novade";
