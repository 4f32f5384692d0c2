//! Navigation requests for newly mounted importable media, and the
//! device actions requested through notification buttons.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::subscription::{EventBus, SubscriptionToken};
use crate::types::{DevicePath, VolumeId};

/// Asks the import UI to offer browsing `volume_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationRequest {
    pub volume_id: VolumeId,
}

/// Emitted when the user presses a notification button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "action", content = "devicePath")]
pub enum DeviceActionRequest {
    OpenDevice(DevicePath),
    FormatDevice(DevicePath),
}

/// Fans navigation requests out to the registered listeners.
#[derive(Debug, Default)]
pub struct NavigationEmitter {
    bus: EventBus<NavigationRequest>,
}

impl NavigationEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&mut self, listener: F) -> SubscriptionToken
    where
        F: Fn(&NavigationRequest) + Send + Sync + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn remove_listener(&mut self, token: SubscriptionToken) -> bool {
        self.bus.unsubscribe(token)
    }

    /// Fires exactly one request to every current listener.
    pub fn emit(&self, request: &NavigationRequest) {
        let delivered = self.bus.publish(request);
        info!(volume_id = %request.volume_id, listeners = delivered, "Volume navigation requested");
    }
}
