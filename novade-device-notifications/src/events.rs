//! Raw events delivered by the device/mount event source.
//!
//! The shapes mirror what the disk daemon publishes, so they deserialize from
//! camelCase JSON such as
//! `{"mountCompleted": {"eventType": "mount", "status": "success", ...}}`.

use serde::{Deserialize, Serialize};

use crate::error::NotifierResult;
use crate::types::{DevicePath, VolumeId, VolumeType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceEvent {
    MountCompleted(MountCompletedEvent),
    DeviceChanged(DeviceChangedEvent),
}

impl DeviceEvent {
    /// Decodes one event from its JSON form.
    pub fn from_json(json: &str) -> NotifierResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Device path the event refers to, if it carries one.
    pub fn device_path(&self) -> Option<&DevicePath> {
        match self {
            DeviceEvent::MountCompleted(event) => event.volume_metadata.device_path.as_ref(),
            DeviceEvent::DeviceChanged(event) => event.device_path.as_ref(),
        }
    }
}

impl From<MountCompletedEvent> for DeviceEvent {
    fn from(event: MountCompletedEvent) -> Self {
        DeviceEvent::MountCompleted(event)
    }
}

impl From<DeviceChangedEvent> for DeviceEvent {
    fn from(event: DeviceChangedEvent) -> Self {
        DeviceEvent::DeviceChanged(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MountEventType {
    #[default]
    Mount,
    Unmount,
}

/// Mount result reported by the disk daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountStatus {
    Success,
    ErrorInternal,
    ErrorUnknown,
    ErrorUnsupportedFilesystem,
    ErrorUnknownFilesystem,
    /// Any other error status (path already mounted, invalid archive, ...).
    #[serde(other)]
    ErrorOther,
}

impl MountStatus {
    pub fn is_success(self) -> bool {
        self == MountStatus::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Usb,
    Sd,
    Optical,
    Mobile,
    Mtp,
    #[default]
    #[serde(other)]
    Unknown,
}

impl DeviceType {
    /// Volume kind the device mounts as. MTP devices are their own kind;
    /// everything else surfaces as a removable volume.
    pub fn volume_type(self) -> VolumeType {
        match self {
            DeviceType::Mtp => VolumeType::Mtp,
            _ => VolumeType::Removable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMetadata {
    #[serde(default)]
    pub is_parent_device: bool,
    #[serde(default)]
    pub device_type: DeviceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_path: Option<DevicePath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_label: Option<String>,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<VolumeId>,
}

impl VolumeMetadata {
    pub fn for_device(device_path: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            device_path: Some(DevicePath::new(device_path)),
            device_type,
            ..Default::default()
        }
    }

    pub fn parent(mut self, is_parent_device: bool) -> Self {
        self.is_parent_device = is_parent_device;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.device_label = Some(label.into());
        self
    }

    pub fn read_only(mut self, is_read_only: bool) -> Self {
        self.is_read_only = is_read_only;
        self
    }

    pub fn volume(mut self, volume_id: impl Into<String>) -> Self {
        self.volume_id = Some(VolumeId::new(volume_id));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountCompletedEvent {
    #[serde(default)]
    pub event_type: MountEventType,
    pub status: MountStatus,
    pub volume_metadata: VolumeMetadata,
    pub should_notify: bool,
}

impl MountCompletedEvent {
    /// A `mount` event that asks for user notification.
    pub fn mount(status: MountStatus, volume_metadata: VolumeMetadata) -> Self {
        Self {
            event_type: MountEventType::Mount,
            status,
            volume_metadata,
            should_notify: true,
        }
    }

    pub fn unmount(status: MountStatus, volume_metadata: VolumeMetadata) -> Self {
        Self {
            event_type: MountEventType::Unmount,
            ..Self::mount(status, volume_metadata)
        }
    }

    pub fn silent(mut self) -> Self {
        self.should_notify = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceChangeKind {
    Disabled,
    Removed,
    FormatStart,
    FormatSuccess,
    FormatFail,
    HardUnplugged,
    /// Changes this handler has no notification for (added, scan_canceled, ...).
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceChangedEvent {
    #[serde(rename = "type")]
    pub kind: DeviceChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_path: Option<DevicePath>,
}

impl DeviceChangedEvent {
    pub fn new(kind: DeviceChangeKind, device_path: impl Into<String>) -> Self {
        Self {
            kind,
            device_path: Some(DevicePath::new(device_path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mount_completed_deserializes_from_daemon_json() {
        let json = r#"{
            "mountCompleted": {
                "eventType": "mount",
                "status": "error_unknown_filesystem",
                "volumeMetadata": {
                    "isParentDevice": false,
                    "isReadOnly": true,
                    "deviceType": "sd",
                    "devicePath": "/device/path"
                },
                "shouldNotify": true
            }
        }"#;
        let event: DeviceEvent = serde_json::from_str(json).unwrap();
        let expected = DeviceEvent::MountCompleted(MountCompletedEvent::mount(
            MountStatus::ErrorUnknownFilesystem,
            VolumeMetadata::for_device("/device/path", DeviceType::Sd).read_only(true),
        ));
        assert_eq!(event, expected);
    }

    #[test]
    fn unrecognised_statuses_and_kinds_fall_back() {
        let status: MountStatus = serde_json::from_str("\"error_path_already_mounted\"").unwrap();
        assert_eq!(status, MountStatus::ErrorOther);
        let kind: DeviceChangeKind = serde_json::from_str("\"scan_canceled\"").unwrap();
        assert_eq!(kind, DeviceChangeKind::Other);
        let device_type: DeviceType = serde_json::from_str("\"floppy\"").unwrap();
        assert_eq!(device_type, DeviceType::Unknown);
    }

    #[test]
    fn device_changed_uses_type_field() {
        let json = r#"{"deviceChanged": {"type": "hard_unplugged", "devicePath": "/device/path"}}"#;
        let event: DeviceEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            DeviceEvent::DeviceChanged(DeviceChangedEvent::new(DeviceChangeKind::HardUnplugged, "/device/path"))
        );
        assert_eq!(event.device_path().unwrap().as_str(), "/device/path");
    }

    #[test]
    fn mtp_devices_mount_as_mtp_volumes() {
        assert_eq!(DeviceType::Mtp.volume_type(), VolumeType::Mtp);
        assert_eq!(DeviceType::Usb.volume_type(), VolumeType::Removable);
        assert_eq!(DeviceType::Optical.volume_type(), VolumeType::Removable);
    }

    #[test]
    fn undecodable_json_is_a_json_error() {
        let err = DeviceEvent::from_json("{\"unplugged\": {}}").unwrap_err();
        assert!(matches!(err, crate::error::DeviceNotificationError::Json(_)));
    }
}
