//! Drains a channel of device events into the controller, and fills that
//! channel from a JSON-lines stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::controller::DeviceNotificationController;
use crate::error::NotifierResult;
use crate::events::DeviceEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Events dispatched successfully.
    pub processed: usize,
    /// Events the controller refused (malformed).
    pub rejected: usize,
}

/// Dispatches events until every sender is dropped. A rejected event is
/// logged and skipped; it never stops the loop.
pub async fn run_event_loop(
    controller: &mut DeviceNotificationController,
    mut events: mpsc::Receiver<DeviceEvent>,
) -> LoopSummary {
    let mut summary = LoopSummary::default();
    while let Some(event) = events.recv().await {
        match controller.dispatch(event) {
            Ok(_) => summary.processed += 1,
            Err(e) => {
                warn!(error = %e, "Skipping device event");
                summary.rejected += 1;
            }
        }
    }
    info!(
        processed = summary.processed,
        rejected = summary.rejected,
        "Device event source closed"
    );
    summary
}

/// Decodes one event per line from `reader` and queues it on `events`.
/// Blank lines are skipped; undecodable lines are logged and skipped.
/// Returns how many events were queued once the stream ends or the
/// receiving side goes away.
///
/// # Errors
///
/// Returns `DeviceNotificationError::Io` if reading the stream fails.
pub async fn read_json_events<R>(reader: R, events: mpsc::Sender<DeviceEvent>) -> NotifierResult<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_number = 0usize;
    let mut queued = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        match DeviceEvent::from_json(&line) {
            Ok(event) => {
                if events.send(event).await.is_err() {
                    break;
                }
                queued += 1;
            }
            Err(e) => warn!(line = line_number, error = %e, "Ignoring undecodable event"),
        }
    }
    Ok(queued)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotifierConfig;
    use crate::delivery::InMemoryDelivery;
    use crate::events::{DeviceChangeKind, DeviceChangedEvent, DeviceType, MountCompletedEvent, MountStatus, VolumeMetadata};
    use std::sync::Arc;

    #[tokio::test]
    async fn bad_events_do_not_stop_the_loop() {
        let delivery = InMemoryDelivery::new();
        let mut controller =
            DeviceNotificationController::from_config(&NotifierConfig::default(), Arc::new(delivery.clone()));
        let (tx, rx) = mpsc::channel(8);

        tx.send(DeviceEvent::from(MountCompletedEvent::mount(
            MountStatus::ErrorUnsupportedFilesystem,
            VolumeMetadata::for_device("/a", DeviceType::Usb),
        )))
        .await
        .unwrap();
        tx.send(DeviceEvent::DeviceChanged(DeviceChangedEvent {
            kind: DeviceChangeKind::HardUnplugged,
            device_path: None,
        }))
        .await
        .unwrap();
        tx.send(DeviceEvent::from(DeviceChangedEvent::new(DeviceChangeKind::HardUnplugged, "/b")))
            .await
            .unwrap();
        drop(tx);

        let summary = run_event_loop(&mut controller, rx).await;
        assert_eq!(summary, LoopSummary { processed: 2, rejected: 1 });
        assert_eq!(delivery.items().len(), 2);
    }

    #[tokio::test]
    async fn json_lines_feed_the_loop() {
        let input = concat!(
            r#"{"deviceChanged":{"type":"hard_unplugged","devicePath":"/a"}}"#,
            "\n\n",
            "not json\n",
            r#"{"deviceChanged":{"type":"format_start","devicePath":"/b"}}"#,
            "\n",
        );
        let (tx, rx) = mpsc::channel(8);
        let queued = read_json_events(input.as_bytes(), tx).await.unwrap();
        assert_eq!(queued, 2);

        let delivery = InMemoryDelivery::new();
        let mut controller =
            DeviceNotificationController::from_config(&NotifierConfig::default(), Arc::new(delivery.clone()));
        let summary = run_event_loop(&mut controller, rx).await;
        assert_eq!(summary, LoopSummary { processed: 2, rejected: 0 });
        assert!(delivery.item("hardUnplugged:/a").is_some());
        assert!(delivery.item("formatStart:/b").is_some());
    }
}
