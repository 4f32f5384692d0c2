//! Configuration loading.
//!
//! [`ConfigLoader::load`] reads the system file (`/etc/novade/...`) and the
//! user file (XDG config dir), merges the user's values over the system's
//! table by table, deserializes the result and validates it. Either file may
//! be missing or empty.

use directories_next::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::debug;

use super::defaults::{CONFIG_FILE_NAME, SYSTEM_CONFIG_DIR};
use super::NotifierConfig;
use crate::error::{ConfigError, NotifierResult};

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "NovaDE";
const APPLICATION: &str = "NovaDE";

/// Namespace for the loading functions.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the layered system + user configuration from the standard
    /// locations.
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotificationError::Config` if the user configuration
    /// directory cannot be determined, or for any error
    /// [`ConfigLoader::load_layered`] reports.
    pub fn load() -> NotifierResult<NotifierConfig> {
        let system = Self::system_config_path();
        let user = Self::user_config_path()?;
        Ok(Self::load_layered(&system, &user)?)
    }

    pub fn system_config_path() -> PathBuf {
        Path::new(SYSTEM_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    pub fn user_config_path() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or_else(|| ConfigError::DirectoryUnavailable {
                dir_type: "App Config".to_string(),
            })
    }

    /// Loads a single file; defaults apply if it does not exist.
    pub fn load_from_path(path: &Path) -> Result<NotifierConfig, ConfigError> {
        match Self::read_table(path)? {
            Some(table) => Self::from_table(table),
            None => Self::finish(NotifierConfig::default()),
        }
    }

    pub fn load_from_str(content: &str) -> Result<NotifierConfig, ConfigError> {
        let config: NotifierConfig = toml::from_str(content)?;
        Self::finish(config)
    }

    /// Loads `user` merged over `system`.
    ///
    /// # Arguments
    ///
    /// * `system`: Path to the system-wide file. May be missing.
    /// * `user`: Path to the user file. Its values win, table by table.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::ReadError`] if a file exists but cannot be read.
    /// * [`ConfigError::ParseError`] for invalid TOML, unknown fields or
    ///   unknown string keys.
    /// * [`ConfigError::ValidationError`] for an unknown level or format, or
    ///   an empty string override.
    pub fn load_layered(system: &Path, user: &Path) -> Result<NotifierConfig, ConfigError> {
        let merged = match (Self::read_table(system)?, Self::read_table(user)?) {
            (None, None) => return Self::finish(NotifierConfig::default()),
            (Some(base), None) => base,
            (None, Some(overlay)) => overlay,
            (Some(mut base), Some(overlay)) => {
                Self::merge_tables(&mut base, overlay);
                base
            }
        };
        Self::from_table(merged)
    }

    fn read_table(path: &Path) -> Result<Option<Table>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Configuration file not found; skipping");
                return Ok(None);
            }
            Err(e) => {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(toml::from_str::<Table>(&content)?))
    }

    fn from_table(table: Table) -> Result<NotifierConfig, ConfigError> {
        let config: NotifierConfig = Value::Table(table).try_into()?;
        Self::finish(config)
    }

    /// Overlay values win; nested tables are merged key by key.
    fn merge_tables(base: &mut Table, overlay: Table) {
        for (key, overlay_item) in overlay {
            match overlay_item {
                Value::Table(overlay_table) => match base.get_mut(&key) {
                    Some(Value::Table(base_table)) => Self::merge_tables(base_table, overlay_table),
                    _ => {
                        base.insert(key, Value::Table(overlay_table));
                    }
                },
                other => {
                    base.insert(key, other);
                }
            }
        }
    }

    fn finish(mut config: NotifierConfig) -> Result<NotifierConfig, ConfigError> {
        Self::validate(&mut config)?;
        Ok(config)
    }

    /// Normalizes case-insensitive values and rejects the ones that make no
    /// sense.
    fn validate(config: &mut NotifierConfig) -> Result<(), ConfigError> {
        let level = config.logging.level.to_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.logging.level = level,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                )))
            }
        }

        let format = config.logging.format.to_lowercase();
        match format.as_str() {
            "text" | "json" => config.logging.format = format,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                )))
            }
        }

        if let Some((key, _)) = config.strings.iter().find(|(_, text)| text.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "String override for {:?} is empty",
                key
            )));
        }
        Ok(())
    }
}
