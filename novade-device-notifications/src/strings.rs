//! Message lookup for notification texts.
//!
//! Localization itself lives elsewhere; this module only needs a pure
//! `lookup(key, args) -> String`. [`DefaultStringTable`] ships the English
//! texts and accepts per-key overrides from configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Keys of every text the handler can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKey {
    RemovableDeviceDetectionTitle,
    RemovableDeviceNavigationMessage,
    RemovableDeviceNavigationButtonLabel,
    DeviceUnknownMessage,
    DeviceUnknownDefaultMessage,
    DeviceUnknownButtonLabel,
    DeviceUnsupportedMessage,
    DeviceUnsupportedDefaultMessage,
    MultipartDeviceUnsupportedMessage,
    MultipartDeviceUnsupportedDefaultMessage,
    ExternalStorageDisabledMessage,
    FormattingOfDevicePendingTitle,
    FormattingOfDevicePendingMessage,
    FormattingOfDeviceFinishedTitle,
    FormattingFinishedSuccessMessage,
    FormattingOfDeviceFailedTitle,
    FormattingFinishedFailureMessage,
    DeviceHardUnpluggedTitle,
    DeviceHardUnpluggedMessage,
}

impl MessageKey {
    /// Built-in English text. `$1` marks the interpolated device label.
    pub fn default_text(self) -> &'static str {
        match self {
            MessageKey::RemovableDeviceDetectionTitle => "Removable device detected",
            MessageKey::RemovableDeviceNavigationMessage => "Explore the device's content in the Files app.",
            MessageKey::RemovableDeviceNavigationButtonLabel => "Open Files app",
            MessageKey::DeviceUnknownMessage => "Sorry, the device $1 could not be recognized.",
            MessageKey::DeviceUnknownDefaultMessage => {
                "Sorry, your external storage device could not be recognized."
            }
            MessageKey::DeviceUnknownButtonLabel => "Format this device",
            MessageKey::DeviceUnsupportedMessage => "Sorry, your device $1 is not supported at this time.",
            MessageKey::DeviceUnsupportedDefaultMessage => {
                "Sorry, your external storage device is not supported at this time."
            }
            MessageKey::MultipartDeviceUnsupportedMessage => {
                "Sorry, at least one partition on your device $1 could not be mounted."
            }
            MessageKey::MultipartDeviceUnsupportedDefaultMessage => {
                "Sorry, at least one partition on your external storage device could not be mounted."
            }
            MessageKey::ExternalStorageDisabledMessage => {
                "Your administrator has disabled external storage on your account."
            }
            MessageKey::FormattingOfDevicePendingTitle => "Formatting device",
            MessageKey::FormattingOfDevicePendingMessage => "Formatting the removable device. Please wait.",
            MessageKey::FormattingOfDeviceFinishedTitle => "Formatting finished",
            MessageKey::FormattingFinishedSuccessMessage => "The removable device was formatted successfully.",
            MessageKey::FormattingOfDeviceFailedTitle => "Formatting failed",
            MessageKey::FormattingFinishedFailureMessage => "Sorry, the removable device could not be formatted.",
            MessageKey::DeviceHardUnpluggedTitle => "Whoa, there. Be careful.",
            MessageKey::DeviceHardUnpluggedMessage => {
                "Eject your device before unplugging it to avoid losing data."
            }
        }
    }
}

/// Pure text lookup used by the policy engine.
pub trait StringTable: Send + Sync {
    /// Returns the text for `key` with `$1`..`$9` replaced by `args`.
    fn lookup(&self, key: MessageKey, args: &[&str]) -> String;
}

/// English defaults, optionally overridden key by key.
#[derive(Debug, Clone, Default)]
pub struct DefaultStringTable {
    overrides: HashMap<MessageKey, String>,
}

impl DefaultStringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: HashMap<MessageKey, String>) -> Self {
        Self { overrides }
    }

    pub fn set(&mut self, key: MessageKey, text: impl Into<String>) {
        self.overrides.insert(key, text.into());
    }

    fn template(&self, key: MessageKey) -> &str {
        self.overrides
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_text())
    }
}

impl StringTable for DefaultStringTable {
    fn lookup(&self, key: MessageKey, args: &[&str]) -> String {
        interpolate(self.template(key), args)
    }
}

/// Substitutes `$n` placeholders (1-based). `$$` yields a literal `$`;
/// placeholders without a matching argument are dropped. Arguments are copied
/// verbatim, so non-ASCII labels survive unchanged.
pub fn interpolate(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some(d @ '1'..='9') => {
                chars.next();
                let index = d as usize - '1' as usize;
                if let Some(arg) = args.get(index) {
                    out.push_str(arg);
                }
            }
            _ => out.push('$'),
        }
    }
    out
}
