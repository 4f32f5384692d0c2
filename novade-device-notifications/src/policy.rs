//! Merge/replace policy: turns a classified outcome into notification actions.
//!
//! The engine owns no state. It mutates the per-device [`SessionTable`] it is
//! handed and reads the [`NotificationStore`] to decide whether a record has
//! to be created, replaced, or can be left alone.
//!
//! Mount results for one device are folded into a [`MountProgress`]:
//!
//! | previous            | incoming result               | next                 |
//! |---------------------|-------------------------------|----------------------|
//! | `NoResult`          | any                           | first status         |
//! | `OnlyParentError`   | child result (fail record hidden on success) | first status |
//! | `OnlyParentError`   | parent result                 | first status         |
//! | `Success`           | success                       | `Success`            |
//! | `Success`/`ChildError` | anything else              | `MultipartError`     |
//! | `MultipartError`    | any                           | unchanged, no action |
//!
//! where the first status of a result is `Success`, `OnlyParentError` for a
//! failing parent, or `ChildError` for a failing partition.

use std::sync::Arc;

use tracing::debug;

use crate::classifier::{ClassifiedOutcome, MountContext, MountFailure};
use crate::session::{FailureKind, MountProgress, SessionTable};
use crate::store::NotificationStore;
use crate::strings::{MessageKey, StringTable};
use crate::types::{ButtonAction, DevicePath, NotificationCategory, NotificationKey, NotificationRecord};

/// One mutation of the notification surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAction {
    Create(NotificationKey, NotificationRecord),
    Replace(NotificationKey, NotificationRecord),
    Clear(NotificationKey),
}

impl NotificationAction {
    pub fn key(&self) -> &NotificationKey {
        match self {
            NotificationAction::Create(key, _)
            | NotificationAction::Replace(key, _)
            | NotificationAction::Clear(key) => key,
        }
    }
}

/// Collects actions for one outcome, resolving each intent against the
/// current store contents.
struct Plan<'a> {
    store: &'a NotificationStore,
    actions: Vec<NotificationAction>,
}

impl<'a> Plan<'a> {
    fn new(store: &'a NotificationStore) -> Self {
        Self {
            store,
            actions: Vec::new(),
        }
    }

    fn show(&mut self, key: NotificationKey, record: NotificationRecord) {
        match self.store.get(&key) {
            None => self.actions.push(NotificationAction::Create(key, record)),
            Some(existing) if *existing != record => self.actions.push(NotificationAction::Replace(key, record)),
            Some(_) => debug!(id = %key, "Notification unchanged; skipping"),
        }
    }

    fn hide(&mut self, key: NotificationKey) {
        if self.store.contains(&key) {
            self.actions.push(NotificationAction::Clear(key));
        }
    }
}

#[derive(Clone)]
pub struct PolicyEngine {
    strings: Arc<dyn StringTable>,
}

impl PolicyEngine {
    pub fn new(strings: Arc<dyn StringTable>) -> Self {
        Self { strings }
    }

    /// Folds `outcome` into the session state and returns the actions needed
    /// to bring the notification surface in line. An empty vector means no
    /// visible change.
    pub fn apply(
        &self,
        sessions: &mut SessionTable,
        store: &NotificationStore,
        outcome: &ClassifiedOutcome,
    ) -> Vec<NotificationAction> {
        let mut plan = Plan::new(store);
        match outcome {
            ClassifiedOutcome::Suppressed | ClassifiedOutcome::Ignored => {}
            ClassifiedOutcome::Unmounted { device_path, success } => {
                if *success {
                    sessions.remove(device_path);
                }
            }
            ClassifiedOutcome::MountSuccess { context, .. } => {
                plan.show(
                    key(NotificationCategory::DeviceNavigation, &context.device_path),
                    self.navigation_record(),
                );
                self.fold_mount_result(sessions, &mut plan, context, None);
            }
            ClassifiedOutcome::MountFailure { context, failure } => {
                self.fold_mount_result(sessions, &mut plan, context, Some(*failure));
            }
            ClassifiedOutcome::ExternalStorageDisabled(path) => {
                plan.show(
                    key(NotificationCategory::DeviceFail, path),
                    self.record(MessageKey::ExternalStorageDisabledMessage, &[]),
                );
            }
            ClassifiedOutcome::Removed(path) => {
                for live in store.keys_for_path(path) {
                    plan.hide(live);
                }
                sessions.remove(path);
            }
            ClassifiedOutcome::FormatPending(path) => {
                plan.hide(key(NotificationCategory::FormatSuccess, path));
                plan.hide(key(NotificationCategory::FormatFail, path));
                plan.show(
                    key(NotificationCategory::FormatStart, path),
                    self.titled_record(
                        MessageKey::FormattingOfDevicePendingTitle,
                        MessageKey::FormattingOfDevicePendingMessage,
                    ),
                );
            }
            ClassifiedOutcome::FormatSuccess(path) => {
                plan.hide(key(NotificationCategory::FormatStart, path));
                plan.hide(key(NotificationCategory::FormatFail, path));
                plan.show(
                    key(NotificationCategory::FormatSuccess, path),
                    self.titled_record(
                        MessageKey::FormattingOfDeviceFinishedTitle,
                        MessageKey::FormattingFinishedSuccessMessage,
                    ),
                );
            }
            ClassifiedOutcome::FormatFailure(path) => {
                plan.hide(key(NotificationCategory::FormatStart, path));
                plan.hide(key(NotificationCategory::FormatSuccess, path));
                plan.show(
                    key(NotificationCategory::FormatFail, path),
                    self.titled_record(
                        MessageKey::FormattingOfDeviceFailedTitle,
                        MessageKey::FormattingFinishedFailureMessage,
                    ),
                );
            }
            ClassifiedOutcome::HardUnplugged(path) => {
                plan.show(
                    key(NotificationCategory::HardUnplugged, path),
                    self.titled_record(MessageKey::DeviceHardUnpluggedTitle, MessageKey::DeviceHardUnpluggedMessage),
                );
            }
        }
        plan.actions
    }

    /// `failure` is `None` for a successful mount.
    fn fold_mount_result(
        &self,
        sessions: &mut SessionTable,
        plan: &mut Plan<'_>,
        context: &MountContext,
        failure: Option<MountFailure>,
    ) {
        let path = &context.device_path;
        let fail_key = key(NotificationCategory::DeviceFail, path);
        let session = sessions.entry(path);

        if let Some(failure) = failure {
            if context.is_parent_device {
                session.parent_error_seen = true;
            } else {
                session.child_error_count += 1;
                session.distinct_child_failures.insert(FailureKind::from(failure));
            }
        }

        let first_status = match (failure, context.is_parent_device) {
            (None, _) => MountProgress::Success,
            (Some(_), true) => MountProgress::OnlyParentError,
            (Some(_), false) => MountProgress::ChildError,
        };

        let previous = session.last_status;
        let next = match previous {
            MountProgress::MultipartError => return,
            MountProgress::NoResult => first_status,
            MountProgress::OnlyParentError => {
                if !context.is_parent_device && failure.is_none() {
                    plan.hide(fail_key.clone());
                }
                first_status
            }
            MountProgress::Success if failure.is_none() => MountProgress::Success,
            MountProgress::Success | MountProgress::ChildError => MountProgress::MultipartError,
        };
        session.last_status = next;
        debug!(
            device_path = %path,
            ?previous,
            ?next,
            child_errors = session.child_error_count,
            distinct_child_failures = session.distinct_child_failures.len(),
            "Mount progress updated"
        );

        let label = context.label.as_deref();
        let record = match (next, failure) {
            (MountProgress::MultipartError, _) => Some(self.labelled_record(
                label,
                MessageKey::MultipartDeviceUnsupportedMessage,
                MessageKey::MultipartDeviceUnsupportedDefaultMessage,
            )),
            (MountProgress::ChildError | MountProgress::OnlyParentError, Some(failure)) => {
                Some(self.failure_record(label, failure))
            }
            _ => None,
        };
        if let Some(record) = record {
            plan.show(fail_key, record);
        }
    }

    fn failure_record(&self, label: Option<&str>, failure: MountFailure) -> NotificationRecord {
        match failure {
            MountFailure::Unsupported => self.labelled_record(
                label,
                MessageKey::DeviceUnsupportedMessage,
                MessageKey::DeviceUnsupportedDefaultMessage,
            ),
            MountFailure::Unknown => {
                self.labelled_record(label, MessageKey::DeviceUnknownMessage, MessageKey::DeviceUnknownDefaultMessage)
            }
            MountFailure::UnknownFilesystem { offer_format } => {
                let record = self.labelled_record(
                    label,
                    MessageKey::DeviceUnknownMessage,
                    MessageKey::DeviceUnknownDefaultMessage,
                );
                if offer_format {
                    record.with_button(
                        self.strings.lookup(MessageKey::DeviceUnknownButtonLabel, &[]),
                        ButtonAction::FormatDevice,
                    )
                } else {
                    record
                }
            }
        }
    }

    fn navigation_record(&self) -> NotificationRecord {
        self.record(MessageKey::RemovableDeviceNavigationMessage, &[]).with_button(
            self.strings.lookup(MessageKey::RemovableDeviceNavigationButtonLabel, &[]),
            ButtonAction::OpenDevice,
        )
    }

    fn labelled_record(&self, label: Option<&str>, with_label: MessageKey, without_label: MessageKey) -> NotificationRecord {
        match label {
            Some(label) => self.record(with_label, &[label]),
            None => self.record(without_label, &[]),
        }
    }

    /// Record under the generic "device detected" title.
    fn record(&self, message: MessageKey, args: &[&str]) -> NotificationRecord {
        NotificationRecord::new(
            self.strings.lookup(MessageKey::RemovableDeviceDetectionTitle, &[]),
            self.strings.lookup(message, args),
        )
    }

    fn titled_record(&self, title: MessageKey, message: MessageKey) -> NotificationRecord {
        NotificationRecord::new(self.strings.lookup(title, &[]), self.strings.lookup(message, &[]))
    }
}

fn key(category: NotificationCategory, path: &DevicePath) -> NotificationKey {
    NotificationKey::new(category, path.clone())
}
