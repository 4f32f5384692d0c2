//! Core value types: device and volume identifiers, notification keys and
//! notification records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key identifying a physical device (not a volume or partition).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DevicePath(String);

impl DevicePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DevicePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of a mounted volume, as understood by the volume manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumeId(String);

impl VolumeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Volume kinds the import eligibility check distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeType {
    Removable,
    Mtp,
}

/// Notification categories. Each device path holds at most one live record
/// per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationCategory {
    DeviceNavigation,
    DeviceFail,
    FormatStart,
    FormatSuccess,
    FormatFail,
    HardUnplugged,
}

impl NotificationCategory {
    pub const ALL: [NotificationCategory; 6] = [
        NotificationCategory::DeviceNavigation,
        NotificationCategory::DeviceFail,
        NotificationCategory::FormatStart,
        NotificationCategory::FormatSuccess,
        NotificationCategory::FormatFail,
        NotificationCategory::HardUnplugged,
    ];

    /// Prefix used when the key is rendered as a delivery id.
    pub fn prefix(self) -> &'static str {
        match self {
            NotificationCategory::DeviceNavigation => "deviceNavigation",
            NotificationCategory::DeviceFail => "deviceFail",
            NotificationCategory::FormatStart => "formatStart",
            NotificationCategory::FormatSuccess => "formatSuccess",
            NotificationCategory::FormatFail => "formatFail",
            NotificationCategory::HardUnplugged => "hardUnplugged",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.prefix() == prefix)
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Structured notification identity.
///
/// Equality is on the pair, never on the rendered id, so a `:` inside a
/// device path cannot make two keys collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationKey {
    pub category: NotificationCategory,
    pub device_path: DevicePath,
}

impl NotificationKey {
    pub fn new(category: NotificationCategory, device_path: DevicePath) -> Self {
        Self { category, device_path }
    }

    /// Renders the `category:devicePath` id handed to the delivery surface.
    pub fn to_id(&self) -> String {
        self.to_string()
    }

    /// Parses a delivery id back into a key. Splits on the first `:` only.
    pub fn parse_id(id: &str) -> Option<Self> {
        let (prefix, path) = id.split_once(':')?;
        let category = NotificationCategory::from_prefix(prefix)?;
        Some(Self::new(category, DevicePath::new(path)))
    }
}

impl fmt::Display for NotificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.device_path)
    }
}

/// What pressing a notification button asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ButtonAction {
    OpenDevice,
    FormatDevice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationButton {
    pub title: String,
    pub action: ButtonAction,
}

/// Content of one live notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<NotificationButton>,
}

impl NotificationRecord {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_button(mut self, title: impl Into<String>, action: ButtonAction) -> Self {
        self.buttons.push(NotificationButton {
            title: title.into(),
            action,
        });
        self
    }
}
