//! The device notification controller.
//!
//! One controller owns every piece of mutable state: the per-device mount
//! sessions and the live notification store. Events are processed one at a
//! time, each to completion: classify, apply the policy, update the store,
//! issue the delivery calls, notify listeners.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classifier::{self, ClassifiedOutcome};
use crate::config::NotifierConfig;
use crate::delivery::NotificationDelivery;
use crate::error::NotifierResult;
use crate::events::{DeviceChangedEvent, DeviceEvent, MountCompletedEvent};
use crate::import::{ConfiguredImportEligibility, ImportEligibility};
use crate::navigation::{DeviceActionRequest, NavigationEmitter, NavigationRequest};
use crate::policy::{NotificationAction, PolicyEngine};
use crate::session::{DeviceSessionState, SessionTable};
use crate::store::NotificationStore;
use crate::strings::{DefaultStringTable, StringTable};
use crate::subscription::{EventBus, SubscriptionToken};
use crate::types::{ButtonAction, DevicePath, NotificationKey, NotificationRecord};

/// What one dispatched event changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub actions: Vec<NotificationAction>,
    pub navigation: Option<NavigationRequest>,
}

impl DispatchReport {
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty() && self.navigation.is_none()
    }
}

pub struct DeviceNotificationController {
    sessions: SessionTable,
    store: NotificationStore,
    policy: PolicyEngine,
    eligibility: Arc<dyn ImportEligibility>,
    delivery: Arc<dyn NotificationDelivery>,
    navigation: NavigationEmitter,
    device_actions: EventBus<DeviceActionRequest>,
}

impl DeviceNotificationController {
    pub fn new(
        delivery: Arc<dyn NotificationDelivery>,
        strings: Arc<dyn StringTable>,
        eligibility: Arc<dyn ImportEligibility>,
    ) -> Self {
        Self {
            sessions: SessionTable::new(),
            store: NotificationStore::new(),
            policy: PolicyEngine::new(strings),
            eligibility,
            delivery,
            navigation: NavigationEmitter::new(),
            device_actions: EventBus::new(),
        }
    }

    /// Builds a controller with the string overrides and import settings
    /// from `config`.
    pub fn from_config(config: &NotifierConfig, delivery: Arc<dyn NotificationDelivery>) -> Self {
        let strings = DefaultStringTable::with_overrides(config.strings.clone());
        let eligibility = ConfiguredImportEligibility::from(&config.import);
        Self::new(delivery, Arc::new(strings), Arc::new(eligibility))
    }

    /// Processes one event to completion: classification, policy, store
    /// update, one delivery call per action, then navigation listeners.
    ///
    /// A malformed event is rejected without touching any state, except that
    /// a navigation request it qualifies for is still emitted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DeviceNotificationError::MalformedEvent`] when the event
    /// needs a device path and carries none (or an empty one). Delivery
    /// failures are not errors here; they are logged when the surface
    /// reports completion.
    pub fn dispatch(&mut self, event: DeviceEvent) -> NotifierResult<DispatchReport> {
        let outcome = match classifier::classify(&event, self.eligibility.as_ref()) {
            Ok(outcome) => outcome,
            Err(err) => {
                if let DeviceEvent::MountCompleted(mount) = &event {
                    if let Some(request) = classifier::navigation_request(mount, self.eligibility.as_ref()) {
                        self.navigation.emit(&request);
                    }
                }
                warn!(error = %err, ?event, "Rejected device event");
                return Err(err);
            }
        };

        let actions = self.policy.apply(&mut self.sessions, &self.store, &outcome);
        for action in &actions {
            self.commit(action);
        }
        if actions.is_empty() && !matches!(outcome, ClassifiedOutcome::Suppressed | ClassifiedOutcome::Ignored) {
            debug!("No notification change");
        }

        // Store and surface are up to date before listeners run.
        let navigation = outcome.navigation().cloned();
        if let Some(request) = &navigation {
            self.navigation.emit(request);
        }
        Ok(DispatchReport { actions, navigation })
    }

    pub fn handle_mount_completed(&mut self, event: MountCompletedEvent) -> NotifierResult<DispatchReport> {
        self.dispatch(DeviceEvent::MountCompleted(event))
    }

    pub fn handle_device_changed(&mut self, event: DeviceChangedEvent) -> NotifierResult<DispatchReport> {
        self.dispatch(DeviceEvent::DeviceChanged(event))
    }

    /// Store first, then exactly one delivery call.
    fn commit(&mut self, action: &NotificationAction) {
        let id = action.key().to_id();
        match action {
            NotificationAction::Create(key, record) | NotificationAction::Replace(key, record) => {
                let outcome = self.store.upsert(key.clone(), record.clone());
                info!(id = %id, ?outcome, message = %record.message, "Showing notification");
                let failed_id = id.clone();
                self.delivery.create(
                    &id,
                    record,
                    Box::new(move |result| {
                        if let Err(e) = result {
                            warn!(id = %failed_id, error = %e, "Notification create failed");
                        }
                    }),
                );
            }
            NotificationAction::Clear(key) => {
                self.store.clear(key);
                info!(id = %id, "Clearing notification");
                let failed_id = id.clone();
                self.delivery.clear(
                    &id,
                    Box::new(move |result| {
                        if let Err(e) = result {
                            warn!(id = %failed_id, error = %e, "Notification clear failed");
                        }
                    }),
                );
            }
        }
    }

    /// Turns a button press on a live notification into a device action
    /// request. Returns the request that was published, if any.
    pub fn handle_button_clicked(&mut self, notification_id: &str, button_index: usize) -> Option<DeviceActionRequest> {
        let Some(key) = NotificationKey::parse_id(notification_id) else {
            warn!(id = notification_id, "Button click for unrecognised notification id");
            return None;
        };
        let Some(button) = self.store.get(&key).and_then(|record| record.buttons.get(button_index)) else {
            warn!(id = notification_id, button_index, "Button click for unknown notification or button");
            return None;
        };
        let request = match button.action {
            ButtonAction::OpenDevice => DeviceActionRequest::OpenDevice(key.device_path.clone()),
            ButtonAction::FormatDevice => DeviceActionRequest::FormatDevice(key.device_path.clone()),
        };
        let delivered = self.device_actions.publish(&request);
        info!(id = notification_id, ?request, listeners = delivered, "Device action requested");
        Some(request)
    }

    pub fn subscribe_navigation<F>(&mut self, listener: F) -> SubscriptionToken
    where
        F: Fn(&NavigationRequest) + Send + Sync + 'static,
    {
        self.navigation.add_listener(listener)
    }

    pub fn unsubscribe_navigation(&mut self, token: SubscriptionToken) -> bool {
        self.navigation.remove_listener(token)
    }

    pub fn subscribe_device_actions<F>(&mut self, listener: F) -> SubscriptionToken
    where
        F: Fn(&DeviceActionRequest) + Send + Sync + 'static,
    {
        self.device_actions.subscribe(listener)
    }

    pub fn unsubscribe_device_actions(&mut self, token: SubscriptionToken) -> bool {
        self.device_actions.unsubscribe(token)
    }

    /// Live notifications ordered by key.
    pub fn notifications(&self) -> Vec<(NotificationKey, NotificationRecord)> {
        self.store.get_all()
    }

    pub fn notification(&self, key: &NotificationKey) -> Option<&NotificationRecord> {
        self.store.get(key)
    }

    pub fn session(&self, device_path: &DevicePath) -> Option<&DeviceSessionState> {
        self.sessions.get(device_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::{ChannelDelivery, DeliveryCommand, InMemoryDelivery};
    use crate::events::{DeviceChangeKind, DeviceType, MountStatus, VolumeMetadata};
    use crate::types::NotificationCategory;
    use std::sync::Mutex;
    use tokio::runtime::Handle;
    use tokio::sync::mpsc;

    fn controller() -> (DeviceNotificationController, InMemoryDelivery) {
        let delivery = InMemoryDelivery::new();
        let controller = DeviceNotificationController::from_config(&NotifierConfig::default(), Arc::new(delivery.clone()));
        (controller, delivery)
    }

    fn mount(status: MountStatus, metadata: VolumeMetadata) -> DeviceEvent {
        DeviceEvent::from(MountCompletedEvent::mount(status, metadata))
    }

    #[test]
    fn store_and_surface_stay_in_step() {
        let (mut controller, delivery) = controller();
        controller
            .dispatch(mount(
                MountStatus::ErrorUnknownFilesystem,
                VolumeMetadata::for_device("/p", DeviceType::Usb).label("stick"),
            ))
            .unwrap();
        controller
            .dispatch(DeviceEvent::from(DeviceChangedEvent::new(DeviceChangeKind::FormatStart, "/p")))
            .unwrap();

        let ids: Vec<String> = controller.notifications().iter().map(|(k, _)| k.to_id()).collect();
        assert_eq!(ids, delivery.items().keys().cloned().collect::<Vec<_>>());
        assert_eq!(delivery.calls().len(), 2);
    }

    #[test]
    fn repeated_success_issues_one_delivery_call() {
        let (mut controller, delivery) = controller();
        for _ in 0..2 {
            controller
                .dispatch(mount(MountStatus::Success, VolumeMetadata::for_device("/p", DeviceType::Usb).parent(true)))
                .unwrap();
        }
        assert_eq!(delivery.calls().len(), 1);
        assert_eq!(controller.notifications().len(), 1);
    }

    #[test]
    fn rejected_delivery_keeps_controller_state() {
        let (mut controller, delivery) = controller();
        delivery.set_rejecting(true);
        controller
            .dispatch(DeviceEvent::from(DeviceChangedEvent::new(DeviceChangeKind::HardUnplugged, "/p")))
            .unwrap();
        assert_eq!(controller.notifications().len(), 1);
        assert!(delivery.items().is_empty());
        assert!(matches!(&delivery.calls()[0], DeliveryCommand::Create { id, .. } if id == "hardUnplugged:/p"));
    }

    #[test]
    fn malformed_mount_still_emits_navigation() {
        let (mut controller, delivery) = controller();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        controller.subscribe_navigation(move |request| sink.lock().unwrap().push(request.clone()));

        let mut metadata = VolumeMetadata::for_device("", DeviceType::Sd).volume("vol-1");
        metadata.device_path = None;
        assert!(controller.dispatch(mount(MountStatus::Success, metadata)).is_err());

        assert_eq!(received.lock().unwrap().len(), 1);
        assert!(controller.notifications().is_empty());
        assert!(delivery.calls().is_empty());
    }

    #[test]
    fn button_clicks_publish_device_actions() {
        let (mut controller, _delivery) = controller();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let token = controller.subscribe_device_actions(move |request| sink.lock().unwrap().push(request.clone()));

        controller
            .dispatch(mount(MountStatus::Success, VolumeMetadata::for_device("/p", DeviceType::Usb)))
            .unwrap();
        controller
            .dispatch(mount(
                MountStatus::ErrorUnknownFilesystem,
                VolumeMetadata::for_device("/q", DeviceType::Usb),
            ))
            .unwrap();

        assert_eq!(
            controller.handle_button_clicked("deviceNavigation:/p", 0),
            Some(DeviceActionRequest::OpenDevice(DevicePath::new("/p")))
        );
        assert_eq!(
            controller.handle_button_clicked("deviceFail:/q", 0),
            Some(DeviceActionRequest::FormatDevice(DevicePath::new("/q")))
        );
        assert_eq!(controller.handle_button_clicked("deviceFail:/q", 1), None);
        assert_eq!(controller.handle_button_clicked("bogus", 0), None);
        assert_eq!(controller.handle_button_clicked("hardUnplugged:/q", 0), None);
        assert_eq!(received.lock().unwrap().len(), 2);

        assert!(controller.unsubscribe_device_actions(token));
        controller.handle_button_clicked("deviceNavigation:/p", 0);
        assert_eq!(received.lock().unwrap().len(), 2);
    }

    #[test]
    fn session_is_exposed_per_path() {
        let (mut controller, _delivery) = controller();
        controller
            .handle_mount_completed(MountCompletedEvent::mount(
                MountStatus::ErrorInternal,
                VolumeMetadata::for_device("/p", DeviceType::Usb).parent(true),
            ))
            .unwrap();
        assert!(controller.session(&DevicePath::new("/p")).unwrap().parent_error_seen);
        controller
            .handle_device_changed(DeviceChangedEvent::new(DeviceChangeKind::Removed, "/p"))
            .unwrap();
        assert!(controller.session(&DevicePath::new("/p")).is_none());
        assert!(controller
            .notification(&NotificationKey::new(NotificationCategory::DeviceFail, DevicePath::new("/p")))
            .is_none());
    }

    #[test]
    fn navigation_listeners_see_the_applied_notification() {
        let (mut controller, delivery) = controller();
        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);
        let surface = delivery.clone();
        controller.subscribe_navigation(move |_| {
            *sink.lock().unwrap() = Some(surface.item("deviceNavigation:/device/path").is_some());
        });

        let report = controller
            .dispatch(mount(
                MountStatus::Success,
                VolumeMetadata::for_device("/device/path", DeviceType::Usb)
                    .parent(true)
                    .volume("blabbity"),
            ))
            .unwrap();

        assert!(report.navigation.is_some());
        assert_eq!(*observed.lock().unwrap(), Some(true));
    }

    #[tokio::test]
    async fn state_is_applied_before_the_surface_acknowledges() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let delivery = ChannelDelivery::new(tx, Handle::current());
        let mut controller = DeviceNotificationController::from_config(&NotifierConfig::default(), Arc::new(delivery));

        let parent_error = || {
            mount(
                MountStatus::ErrorInternal,
                VolumeMetadata::for_device("/device/path", DeviceType::Usb).parent(true),
            )
        };
        controller.dispatch(parent_error()).unwrap();
        let second = controller.dispatch(parent_error()).unwrap();
        assert!(second.is_noop());

        let mut queued = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            queued.push(envelope.command);
        }
        assert_eq!(queued.len(), 1);
        assert!(matches!(&queued[0], DeliveryCommand::Create { id, .. } if id == "deviceFail:/device/path"));
        assert_eq!(controller.notifications().len(), 1);
    }
}
