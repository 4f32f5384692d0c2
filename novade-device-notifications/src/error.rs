//! Error handling for the device notification layer.
//!
//! Mount failures reported by the device source are *not* errors here: they
//! are classified into outcomes and rendered as notifications. The types in
//! this module cover what can genuinely go wrong around that pipeline:
//! malformed or undecodable events, configuration and logging setup, and
//! reading the event stream.
//!
//! The main error type is [`DeviceNotificationError`], which wraps the more
//! specific [`ConfigError`] and [`LoggingError`]. A notification surface
//! refusing a request is a [`DeliveryError`]; it only ever reaches the
//! delivery completion callback.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate.
pub type NotifierResult<T> = Result<T, DeviceNotificationError>;

/// Top-level error type for the device notification handler.
#[derive(Debug, Error)]
pub enum DeviceNotificationError {
    /// An event lacked a field required to process it (e.g. `devicePath`).
    /// Fatal to that single event only.
    #[error("Malformed device event: missing or invalid '{field}': {reason}")]
    MalformedEvent { field: &'static str, reason: String },

    /// Errors related to configuration loading, parsing, or validation.
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while setting up the logging subsystem.
    #[error("Logging Error: {0}")]
    Logging(#[from] LoggingError),

    /// An event could not be decoded from its JSON representation.
    #[error("Failed to decode device event: {0}")]
    Json(#[from] serde_json::Error),

    /// General I/O errors not covered by other variants.
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeviceNotificationError {
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        DeviceNotificationError::MalformedEvent {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures reported by a [`crate::delivery::NotificationDelivery`] surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The surface refused the request for the given notification id.
    #[error("Notification '{id}' was rejected: {reason}")]
    Rejected { id: String, reason: String },

    /// The surface is gone (e.g. the receiving end of a channel was dropped).
    #[error("Notification surface is closed")]
    SurfaceClosed,
}

/// Error type for configuration-related operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An error occurred while attempting to read a configuration file.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration parsed, but one of its values is not acceptable.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// A required base directory (e.g., XDG config home) could not be determined.
    #[error("Could not determine base directory for {dir_type}")]
    DirectoryUnavailable { dir_type: String },
}

/// Error type for logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    InitializationFailure(String),

    /// The log directory could not be created.
    #[error("Failed to prepare log directory {path:?}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
