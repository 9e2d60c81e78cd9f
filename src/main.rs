//! SmartNet Capture - decodes SmartNet control channel messages into OSW events
//!
//! Reads line-encoded transport messages from a file or stdin, decodes them,
//! and writes each decoded OSW to stdout as a JSON line.

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use smartnet_capture::receiver::{ChannelManager, OswEvent};
use smartnet_capture::source::MessageSource;
use smartnet_capture::{Config, TransportMessage};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging on stderr; stdout carries events
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("smartnet_capture=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    info!("===========================================");
    info!("   SmartNet Capture - OSW decoder");
    info!("===========================================");

    let config = Config::from_env()?;
    let plan = config.band_plan().context("Invalid control channel configuration")?;

    info!("Configuration:");
    info!("  Band plan: {} ({:?})", plan.family, plan.subtype);
    if let Some(uhf) = &plan.uhf {
        info!(
            "  UHF: offset={} base={} high={} spacing={}",
            uhf.offset, uhf.base, uhf.high, uhf.spacing
        );
    }
    info!(
        "  Input: {}",
        config
            .input_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdin".to_string())
    );

    let (msg_tx, msg_rx) = mpsc::channel::<TransportMessage>(1000);
    let (event_tx, mut event_rx) = mpsc::channel::<OswEvent>(1000);

    let source = MessageSource::new(config.input_path.clone());
    let source_handle = tokio::spawn(async move {
        if let Err(e) = source.run(msg_tx).await {
            error!("Message source failed: {:#}", e);
        }
    });

    let writer_handle = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = event_rx.recv().await {
            let mut line = match serde_json::to_string(&event) {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to encode event: {}", e);
                    continue;
                }
            };
            line.push('\n');
            if let Err(e) = stdout.write_all(line.as_bytes()).await {
                error!("Failed to write event: {}", e);
                break;
            }
        }
        let _ = stdout.flush().await;
    });

    let manager = ChannelManager::new(plan, event_tx, config.stats_interval_secs);
    let stats = manager.run(msg_rx).await?;

    let _ = source_handle.await;
    let _ = writer_handle.await;

    info!("Shutdown complete. {}", stats);
    Ok(())
}
