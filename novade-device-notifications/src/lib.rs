//! # NovaDE Device Notifications (`novade-device-notifications`)
//!
//! Turns removable-storage events (mount results, device changes) into a
//! deduplicated set of user notifications, and asks the import UI to open
//! freshly mounted media.
//!
//! A device with several partitions produces a burst of mount results. The
//! crate folds that burst into one notification per device and category:
//! the first failure is reported once, a repeat is swallowed, and a second
//! partition failure escalates to a single "at least one partition could not
//! be mounted" message. Removing the device clears everything shown for it.
//!
//! ## Pipeline
//!
//! - [`classifier`]: raw [`DeviceEvent`] to [`ClassifiedOutcome`].
//! - [`policy`]: outcome plus per-device session to create/replace/clear
//!   actions.
//! - [`store`]: live notifications by [`NotificationKey`].
//! - [`navigation`]: volume navigation and button action requests.
//! - [`controller`]: owns the state and runs the pipeline for one event at a
//!   time; [`event_loop`] feeds it from a tokio channel.
//!
//! ```rust,ignore
//! use novade_device_notifications::{DeviceNotificationController, InMemoryDelivery, NotifierConfig};
//! use std::sync::Arc;
//!
//! let delivery = InMemoryDelivery::new();
//! let mut controller = DeviceNotificationController::from_config(&NotifierConfig::default(), Arc::new(delivery));
//! controller.dispatch(event)?;
//! ```

pub mod classifier;
pub mod config;
pub mod controller;
pub mod delivery;
pub mod error;
pub mod event_loop;
pub mod events;
pub mod import;
pub mod logging;
pub mod navigation;
pub mod policy;
pub mod session;
pub mod store;
pub mod strings;
pub mod subscription;
pub mod types;

pub use classifier::{classify, ClassifiedOutcome, MountContext, MountFailure};
pub use config::{ConfigLoader, NotifierConfig};
pub use controller::{DeviceNotificationController, DispatchReport};
pub use delivery::{ChannelDelivery, DeliveryCommand, InMemoryDelivery, NotificationDelivery};
pub use error::{ConfigError, DeliveryError, DeviceNotificationError, LoggingError, NotifierResult};
pub use event_loop::{read_json_events, run_event_loop, LoopSummary};
pub use events::{
    DeviceChangeKind, DeviceChangedEvent, DeviceEvent, DeviceType, MountCompletedEvent, MountEventType, MountStatus,
    VolumeMetadata,
};
pub use import::{ConfiguredImportEligibility, ImportEligibility};
pub use logging::{init_logging, init_minimal_logging};
pub use navigation::{DeviceActionRequest, NavigationRequest};
pub use policy::{NotificationAction, PolicyEngine};
pub use strings::{DefaultStringTable, MessageKey, StringTable};
pub use types::{
    ButtonAction, DevicePath, NotificationButton, NotificationCategory, NotificationKey, NotificationRecord, VolumeId,
    VolumeType,
};
