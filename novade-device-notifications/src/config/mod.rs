//! Configuration for the device notification handler.
//!
//! - [`types`]: the schema ([`NotifierConfig`], [`LoggingConfig`], [`ImportConfig`]).
//! - [`defaults`]: default values referenced from `#[serde(default = ...)]`.
//! - [`loader`]: [`ConfigLoader`], which reads, merges and validates TOML.
//!
//! A missing configuration file is not an error; defaults apply.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [import]
//! cloud_import_disabled = true
//!
//! [strings]
//! DEVICE_UNKNOWN_MESSAGE = "Unreadable device: $1"
//! ```

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{ImportConfig, LoggingConfig, NotifierConfig};
