// NovaDE device notifier entry point.
//
// Reads device events as JSON lines on stdin, runs them through the
// notification controller and prints the notifications left showing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{info, warn};

use novade_device_notifications::{
    init_logging, init_minimal_logging, read_json_events, run_event_loop, ConfigLoader, DeviceEvent,
    DeviceNotificationController, InMemoryDelivery,
};

const CONFIG_ENV_VAR: &str = "NOVADE_DEVICE_NOTIFIER_CONFIG";
const EVENT_QUEUE_DEPTH: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
        .map(PathBuf::from);
    let config = match &config_path {
        Some(path) => ConfigLoader::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load().context("Failed to load configuration")?,
    };

    if let Err(e) = init_logging(&config.logging) {
        init_minimal_logging();
        warn!(error = %e, "Falling back to minimal logging");
    }

    info!("Starting NovaDE device notifier...");

    let delivery = InMemoryDelivery::new();
    let mut controller = DeviceNotificationController::from_config(&config, Arc::new(delivery.clone()));
    controller.subscribe_navigation(|request| info!(volume_id = %request.volume_id, "Open import UI"));
    controller.subscribe_device_actions(|request| info!(?request, "Device action"));

    let (sender, receiver) = mpsc::channel::<DeviceEvent>(EVENT_QUEUE_DEPTH);
    let reader = tokio::spawn(read_json_events(BufReader::new(tokio::io::stdin()), sender));
    let summary = run_event_loop(&mut controller, receiver).await;
    let queued = reader
        .await
        .context("Event reader task panicked")?
        .context("Failed to read events from stdin")?;

    let shown = serde_json::to_string_pretty(&delivery.items()).context("Failed to encode notifications")?;
    println!("{}", shown);

    info!(
        queued,
        processed = summary.processed,
        rejected = summary.rejected,
        "NovaDE device notifier shutting down."
    );
    Ok(())
}
