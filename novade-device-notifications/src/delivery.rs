//! The notification surface the controller drives.
//!
//! Every create/replace/clear decision maps onto exactly one call here.
//! Completion is reported through a callback; the controller has already
//! updated its own state by the time the call is made, so a failed
//! completion only gets logged.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::error::DeliveryError;
use crate::types::NotificationRecord;

pub type DeliveryCallback = Box<dyn FnOnce(Result<(), DeliveryError>) + Send + 'static>;

pub trait NotificationDelivery: Send + Sync {
    /// Shows `record` under `id`, replacing any notification with that id.
    fn create(&self, id: &str, record: &NotificationRecord, on_done: DeliveryCallback);

    fn clear(&self, id: &str, on_done: DeliveryCallback);
}

/// A single call made against a delivery surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum DeliveryCommand {
    Create { id: String, record: NotificationRecord },
    Clear { id: String },
}

#[derive(Debug, Default)]
struct InMemoryState {
    items: BTreeMap<String, NotificationRecord>,
    calls: Vec<DeliveryCommand>,
    rejecting: bool,
}

/// Keeps the shown notifications in memory, the way a notification centre
/// would. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDelivery {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Currently shown notifications by id.
    pub fn items(&self) -> BTreeMap<String, NotificationRecord> {
        self.lock().items.clone()
    }

    pub fn item(&self, id: &str) -> Option<NotificationRecord> {
        self.lock().items.get(id).cloned()
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<DeliveryCommand> {
        self.lock().calls.clone()
    }

    /// While set, calls are recorded but rejected and leave `items` untouched.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.lock().rejecting = rejecting;
    }
}

impl NotificationDelivery for InMemoryDelivery {
    fn create(&self, id: &str, record: &NotificationRecord, on_done: DeliveryCallback) {
        let result = {
            let mut state = self.lock();
            state.calls.push(DeliveryCommand::Create {
                id: id.to_string(),
                record: record.clone(),
            });
            if state.rejecting {
                Err(DeliveryError::Rejected {
                    id: id.to_string(),
                    reason: "surface is rejecting requests".to_string(),
                })
            } else {
                state.items.insert(id.to_string(), record.clone());
                Ok(())
            }
        };
        on_done(result);
    }

    fn clear(&self, id: &str, on_done: DeliveryCallback) {
        let result = {
            let mut state = self.lock();
            state.calls.push(DeliveryCommand::Clear { id: id.to_string() });
            if state.rejecting {
                Err(DeliveryError::Rejected {
                    id: id.to_string(),
                    reason: "surface is rejecting requests".to_string(),
                })
            } else {
                state.items.remove(id);
                Ok(())
            }
        };
        on_done(result);
    }
}

/// A command plus the channel its completion is reported on.
#[derive(Debug)]
pub struct DeliveryEnvelope {
    pub command: DeliveryCommand,
    pub ack: oneshot::Sender<Result<(), DeliveryError>>,
}

/// Forwards commands to a surface living in another task (a D-Bus
/// notification client, a shell panel). Completion callbacks run on the
/// runtime once the receiver acknowledges, or with
/// [`DeliveryError::SurfaceClosed`] if it never does.
#[derive(Debug, Clone)]
pub struct ChannelDelivery {
    sender: mpsc::UnboundedSender<DeliveryEnvelope>,
    runtime: Handle,
}

impl ChannelDelivery {
    pub fn new(sender: mpsc::UnboundedSender<DeliveryEnvelope>, runtime: Handle) -> Self {
        Self { sender, runtime }
    }

    fn forward(&self, command: DeliveryCommand, on_done: DeliveryCallback) {
        let (ack, acked) = oneshot::channel();
        if self.sender.send(DeliveryEnvelope { command, ack }).is_err() {
            on_done(Err(DeliveryError::SurfaceClosed));
            return;
        }
        self.runtime.spawn(async move {
            let result = acked.await.unwrap_or(Err(DeliveryError::SurfaceClosed));
            on_done(result);
        });
    }
}

impl NotificationDelivery for ChannelDelivery {
    fn create(&self, id: &str, record: &NotificationRecord, on_done: DeliveryCallback) {
        self.forward(
            DeliveryCommand::Create {
                id: id.to_string(),
                record: record.clone(),
            },
            on_done,
        );
    }

    fn clear(&self, id: &str, on_done: DeliveryCallback) {
        self.forward(DeliveryCommand::Clear { id: id.to_string() }, on_done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> DeliveryCallback {
        Box::new(|_| {})
    }

    #[test]
    fn in_memory_create_replaces_by_id() {
        let delivery = InMemoryDelivery::new();
        delivery.create("deviceFail:/p", &NotificationRecord::new("t", "a"), noop());
        delivery.create("deviceFail:/p", &NotificationRecord::new("t", "b"), noop());
        assert_eq!(delivery.items().len(), 1);
        assert_eq!(delivery.item("deviceFail:/p").unwrap().message, "b");
        delivery.clear("deviceFail:/p", noop());
        assert!(delivery.items().is_empty());
        assert_eq!(delivery.calls().len(), 3);
    }

    #[test]
    fn rejecting_surface_reports_error() {
        let delivery = InMemoryDelivery::new();
        delivery.set_rejecting(true);
        let outcome = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&outcome);
        delivery.create(
            "hardUnplugged:/p",
            &NotificationRecord::new("t", "m"),
            Box::new(move |result| *slot.lock().unwrap() = Some(result)),
        );
        assert!(delivery.items().is_empty());
        assert!(matches!(
            outcome.lock().unwrap().clone(),
            Some(Err(DeliveryError::Rejected { .. }))
        ));
    }

    #[tokio::test]
    async fn channel_delivery_completes_on_ack() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let delivery = ChannelDelivery::new(tx, Handle::current());
        let (done_tx, done_rx) = oneshot::channel();
        delivery.clear(
            "formatStart:/p",
            Box::new(move |result| {
                let _ = done_tx.send(result);
            }),
        );
        let envelope = rx.recv().await.unwrap();
        assert_eq!(
            envelope.command,
            DeliveryCommand::Clear {
                id: "formatStart:/p".to_string()
            }
        );
        envelope.ack.send(Ok(())).unwrap();
        assert_eq!(done_rx.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn channel_delivery_reports_closed_surface() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let delivery = ChannelDelivery::new(tx, Handle::current());
        let (done_tx, done_rx) = oneshot::channel();
        delivery.clear(
            "formatStart:/p",
            Box::new(move |result| {
                let _ = done_tx.send(result);
            }),
        );
        assert_eq!(done_rx.await.unwrap(), Err(DeliveryError::SurfaceClosed));
    }
}
