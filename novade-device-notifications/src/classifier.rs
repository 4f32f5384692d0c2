//! Event classification: raw mount/device events in, semantic outcomes out.
//!
//! Classification is pure. It never looks at notification or session state;
//! that is the policy engine's job.

use tracing::debug;

use crate::error::{DeviceNotificationError, NotifierResult};
use crate::events::{
    DeviceChangeKind, DeviceChangedEvent, DeviceEvent, MountCompletedEvent, MountEventType, MountStatus,
};
use crate::import::ImportEligibility;
use crate::navigation::NavigationRequest;
use crate::types::DevicePath;

/// How a mount attempt failed, as far as the user is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MountFailure {
    /// Internal or unknown errors.
    Unknown,
    /// The filesystem is recognised but not supported.
    Unsupported,
    /// No filesystem could be recognised; formatting may be offered.
    UnknownFilesystem { offer_format: bool },
}

impl MountFailure {
    fn from_status(status: MountStatus, is_read_only: bool) -> Self {
        match status {
            MountStatus::ErrorUnsupportedFilesystem => MountFailure::Unsupported,
            MountStatus::ErrorUnknownFilesystem => MountFailure::UnknownFilesystem {
                offer_format: !is_read_only,
            },
            _ => MountFailure::Unknown,
        }
    }
}

/// The device-side facts a mount outcome carries into the policy engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountContext {
    pub device_path: DevicePath,
    pub is_parent_device: bool,
    /// `None` when the daemon reported no (or an empty) label.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedOutcome {
    /// `shouldNotify` was false; nothing at all happens.
    Suppressed,
    /// A device change this handler does not react to.
    Ignored,
    Unmounted { device_path: DevicePath, success: bool },
    MountSuccess {
        context: MountContext,
        navigation: Option<NavigationRequest>,
    },
    MountFailure { context: MountContext, failure: MountFailure },
    ExternalStorageDisabled(DevicePath),
    Removed(DevicePath),
    FormatPending(DevicePath),
    FormatSuccess(DevicePath),
    FormatFailure(DevicePath),
    HardUnplugged(DevicePath),
}

impl ClassifiedOutcome {
    pub fn navigation(&self) -> Option<&NavigationRequest> {
        match self {
            ClassifiedOutcome::MountSuccess { navigation, .. } => navigation.as_ref(),
            _ => None,
        }
    }
}

/// Classifies one event.
///
/// Fails with [`DeviceNotificationError::MalformedEvent`] when the event needs
/// a device path and does not carry a usable one.
pub fn classify(event: &DeviceEvent, eligibility: &dyn ImportEligibility) -> NotifierResult<ClassifiedOutcome> {
    let outcome = match event {
        DeviceEvent::MountCompleted(mount) => classify_mount(mount, eligibility)?,
        DeviceEvent::DeviceChanged(change) => classify_change(change)?,
    };
    debug!(?outcome, "Classified device event");
    Ok(outcome)
}

/// Navigation request for a successful mount of importable media, if any.
///
/// Depends only on the volume, not on the device path, so it is available
/// even for events that are otherwise malformed.
pub fn navigation_request(
    event: &MountCompletedEvent,
    eligibility: &dyn ImportEligibility,
) -> Option<NavigationRequest> {
    if !event.should_notify
        || event.event_type != MountEventType::Mount
        || !event.status.is_success()
        || eligibility.cloud_import_disabled()
    {
        return None;
    }
    let metadata = &event.volume_metadata;
    if !eligibility.is_importable(metadata.device_type.volume_type()) {
        return None;
    }
    metadata
        .volume_id
        .clone()
        .map(|volume_id| NavigationRequest { volume_id })
}

fn classify_mount(
    event: &MountCompletedEvent,
    eligibility: &dyn ImportEligibility,
) -> NotifierResult<ClassifiedOutcome> {
    if !event.should_notify {
        return Ok(ClassifiedOutcome::Suppressed);
    }
    let metadata = &event.volume_metadata;
    let device_path = require_path(metadata.device_path.as_ref())?;

    if event.event_type == MountEventType::Unmount {
        return Ok(ClassifiedOutcome::Unmounted {
            device_path,
            success: event.status.is_success(),
        });
    }

    let context = MountContext {
        device_path,
        is_parent_device: metadata.is_parent_device,
        label: metadata.device_label.clone().filter(|label| !label.is_empty()),
    };

    if event.status.is_success() {
        Ok(ClassifiedOutcome::MountSuccess {
            context,
            navigation: navigation_request(event, eligibility),
        })
    } else {
        Ok(ClassifiedOutcome::MountFailure {
            context,
            failure: MountFailure::from_status(event.status, metadata.is_read_only),
        })
    }
}

fn classify_change(event: &DeviceChangedEvent) -> NotifierResult<ClassifiedOutcome> {
    if event.kind == DeviceChangeKind::Other {
        return Ok(ClassifiedOutcome::Ignored);
    }
    let path = require_path(event.device_path.as_ref())?;
    Ok(match event.kind {
        DeviceChangeKind::Disabled => ClassifiedOutcome::ExternalStorageDisabled(path),
        DeviceChangeKind::Removed => ClassifiedOutcome::Removed(path),
        DeviceChangeKind::FormatStart => ClassifiedOutcome::FormatPending(path),
        DeviceChangeKind::FormatSuccess => ClassifiedOutcome::FormatSuccess(path),
        DeviceChangeKind::FormatFail => ClassifiedOutcome::FormatFailure(path),
        DeviceChangeKind::HardUnplugged => ClassifiedOutcome::HardUnplugged(path),
        DeviceChangeKind::Other => ClassifiedOutcome::Ignored,
    })
}

fn require_path(path: Option<&DevicePath>) -> NotifierResult<DevicePath> {
    match path {
        Some(path) if !path.as_str().is_empty() => Ok(path.clone()),
        Some(_) => Err(DeviceNotificationError::malformed("devicePath", "device path is empty")),
        None => Err(DeviceNotificationError::malformed("devicePath", "device path is absent")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DeviceType, VolumeMetadata};
    use crate::import::ConfiguredImportEligibility;
    use crate::types::{VolumeId, VolumeType};
    use rstest::rstest;

    fn eligibility() -> ConfiguredImportEligibility {
        ConfiguredImportEligibility::default()
    }

    fn usb(path: &str) -> VolumeMetadata {
        VolumeMetadata::for_device(path, DeviceType::Usb)
    }

    #[rstest]
    #[case(MountStatus::ErrorInternal, false, MountFailure::Unknown)]
    #[case(MountStatus::ErrorUnknown, false, MountFailure::Unknown)]
    #[case(MountStatus::ErrorOther, false, MountFailure::Unknown)]
    #[case(MountStatus::ErrorUnsupportedFilesystem, false, MountFailure::Unsupported)]
    #[case(MountStatus::ErrorUnknownFilesystem, false, MountFailure::UnknownFilesystem { offer_format: true })]
    #[case(MountStatus::ErrorUnknownFilesystem, true, MountFailure::UnknownFilesystem { offer_format: false })]
    fn classifies_mount_failures(#[case] status: MountStatus, #[case] read_only: bool, #[case] expected: MountFailure) {
        let event = DeviceEvent::from(MountCompletedEvent::mount(status, usb("/device/path").read_only(read_only)));
        match classify(&event, &eligibility()).unwrap() {
            ClassifiedOutcome::MountFailure { failure, .. } => assert_eq!(failure, expected),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn silent_events_are_suppressed_before_validation() {
        let mut metadata = usb("/device/path");
        metadata.device_path = None;
        let event = DeviceEvent::from(MountCompletedEvent::mount(MountStatus::Success, metadata).silent());
        assert_eq!(classify(&event, &eligibility()).unwrap(), ClassifiedOutcome::Suppressed);
    }

    #[test]
    fn empty_label_counts_as_absent() {
        let event = DeviceEvent::from(MountCompletedEvent::mount(MountStatus::ErrorInternal, usb("/p").label("")));
        match classify(&event, &eligibility()).unwrap() {
            ClassifiedOutcome::MountFailure { context, .. } => assert_eq!(context.label, None),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn missing_path_is_malformed() {
        let event = DeviceEvent::DeviceChanged(DeviceChangedEvent {
            kind: DeviceChangeKind::Removed,
            device_path: None,
        });
        let err = classify(&event, &eligibility()).unwrap_err();
        assert!(matches!(err, DeviceNotificationError::MalformedEvent { field: "devicePath", .. }));
    }

    #[test]
    fn unmount_is_classified_separately() {
        let event = DeviceEvent::from(MountCompletedEvent::unmount(MountStatus::Success, usb("/p")));
        assert_eq!(
            classify(&event, &eligibility()).unwrap(),
            ClassifiedOutcome::Unmounted {
                device_path: DevicePath::new("/p"),
                success: true
            }
        );
    }

    #[test]
    fn importable_media_yields_navigation_request() {
        let event = MountCompletedEvent::mount(
            MountStatus::Success,
            VolumeMetadata::for_device("/p", DeviceType::Mtp).volume("blabbity"),
        );
        let outcome = classify(&DeviceEvent::from(event.clone()), &eligibility()).unwrap();
        assert_eq!(
            outcome.navigation(),
            Some(&NavigationRequest {
                volume_id: VolumeId::new("blabbity")
            })
        );

        let disabled = ConfiguredImportEligibility::new([VolumeType::Removable, VolumeType::Mtp], true);
        assert_eq!(navigation_request(&event, &disabled), None);

        let removable_only = ConfiguredImportEligibility::new([VolumeType::Removable], false);
        assert_eq!(navigation_request(&event, &removable_only), None);
    }

    #[test]
    fn navigation_needs_a_volume_id() {
        let event = MountCompletedEvent::mount(MountStatus::Success, usb("/p"));
        assert_eq!(navigation_request(&event, &eligibility()), None);
    }

    #[rstest]
    #[case(DeviceChangeKind::Disabled, ClassifiedOutcome::ExternalStorageDisabled(DevicePath::new("/p")))]
    #[case(DeviceChangeKind::Removed, ClassifiedOutcome::Removed(DevicePath::new("/p")))]
    #[case(DeviceChangeKind::FormatStart, ClassifiedOutcome::FormatPending(DevicePath::new("/p")))]
    #[case(DeviceChangeKind::FormatSuccess, ClassifiedOutcome::FormatSuccess(DevicePath::new("/p")))]
    #[case(DeviceChangeKind::FormatFail, ClassifiedOutcome::FormatFailure(DevicePath::new("/p")))]
    #[case(DeviceChangeKind::HardUnplugged, ClassifiedOutcome::HardUnplugged(DevicePath::new("/p")))]
    #[case(DeviceChangeKind::Other, ClassifiedOutcome::Ignored)]
    fn classifies_device_changes(#[case] kind: DeviceChangeKind, #[case] expected: ClassifiedOutcome) {
        let event = DeviceEvent::from(DeviceChangedEvent::new(kind, "/p"));
        assert_eq!(classify(&event, &eligibility()).unwrap(), expected);
    }
}
