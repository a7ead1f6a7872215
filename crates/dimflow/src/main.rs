//! DimFlow daemon entry point
//!
//! Wires the shared context to the serial, Art-Net and MQTT tasks and
//! runs until Ctrl-C. Only the serial open is allowed to kill the
//! process; everything else degrades and retries.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::filter::{Directive, EnvFilter, LevelFilter};

use dimflow::{config::Config, context::BridgeContext, dispatcher, dmx, mqtt, panel};

fn init_tracing(config: &Config) {
    let default: Directive = config
        .log
        .level
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    let filter = EnvFilter::builder()
        .with_default_directive(default)
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "dimflow.toml".to_string());
    let config = Config::load(Path::new(&config_path))
        .with_context(|| format!("failed to load config from {config_path}"))?;
    init_tracing(&config);

    info!(
        "DimFlow starting: {} zones, Art-Net universe {}, panel on {}",
        config.panel.zones, config.dmx.universe, config.serial.device
    );

    let ctx = Arc::new(BridgeContext::new(config.panel.zones));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Panel link first: without it there is nothing to bridge.
    let (reader, writer) = panel::open_panel(&config.serial).context("cannot reach the panel")?;

    let (event_tx, event_rx) = mpsc::channel(64);
    let reader_handle = {
        let shutdown = shutdown_rx.clone();
        thread::spawn(move || reader.run(event_tx, shutdown))
    };

    let dispatcher_handle = {
        let ctx = Arc::clone(&ctx);
        let shutdown = shutdown_rx.clone();
        thread::spawn(move || dispatcher::run_dispatcher(ctx, writer, shutdown))
    };

    let (client, event_loop) = mqtt::connect(&config.mqtt);
    let publisher = mqtt::StatePublisher::new(client.clone(), &config.mqtt.base_topic);

    tokio::spawn(mqtt::run_remote_bridge(
        Arc::clone(&ctx),
        config.mqtt.clone(),
        client,
        event_loop,
        shutdown_rx.clone(),
    ));
    tokio::spawn(dispatcher::run_panel_events(
        Arc::clone(&ctx),
        event_rx,
        publisher,
        shutdown_rx.clone(),
    ));
    tokio::spawn(dispatcher::run_resync(
        Arc::clone(&ctx),
        shutdown_rx.clone(),
    ));
    tokio::spawn({
        let ctx = Arc::clone(&ctx);
        let dmx_config = config.dmx.clone();
        let shutdown = shutdown_rx.clone();
        async move {
            if let Err(e) = dmx::run_dmx_ingest(ctx, dmx_config, shutdown).await {
                error!("DMX ingest failed: {e}");
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to wait for Ctrl-C")?;
    info!("shutdown requested");
    let _ = shutdown_tx.send(true);

    // The blocking loops notice the signal within one sleep/read timeout.
    let _ = dispatcher_handle.join();
    let _ = reader_handle.join();

    info!("goodbye");
    Ok(())
}
