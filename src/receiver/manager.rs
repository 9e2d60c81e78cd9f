//! Channel manager - coordinates message dispatch and event delivery

use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

use crate::smartnet::{
    BandPlan, ChannelStats, ControlChannel, DecodedOsw, Dispatch, TransportMessage,
};

use super::registry::{LocalRegistry, ReceiverRegistry};

/// Decoded OSW plus the message that released it from the queue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OswEvent {
    pub receiver_id: u32,
    pub timestamp: f64,
    #[serde(flatten)]
    pub osw: DecodedOsw,
}

/// Owns one control channel session and its receivers
pub struct ChannelManager {
    channel: ControlChannel,
    registry: LocalRegistry,
    event_tx: mpsc::Sender<OswEvent>,
    stats_interval: Duration,
}

impl ChannelManager {
    pub fn new(
        plan: BandPlan,
        event_tx: mpsc::Sender<OswEvent>,
        stats_interval_secs: u64,
    ) -> Self {
        Self {
            channel: ControlChannel::new(plan),
            registry: LocalRegistry::new(),
            event_tx,
            stats_interval: Duration::from_secs(stats_interval_secs.max(1)),
        }
    }

    pub fn stats(&self) -> ChannelStats {
        self.channel.stats()
    }

    pub fn registry(&self) -> &LocalRegistry {
        &self.registry
    }

    /// Dispatch one message and update receiver bookkeeping.
    ///
    /// Receivers are registered on their first OSW or timeout. A malformed
    /// message is only counted against a receiver that is already known.
    pub fn handle(&mut self, msg: &TransportMessage) -> Option<OswEvent> {
        let ts = msg.timestamp();
        let dispatch = match self.channel.dispatch(msg) {
            Ok(Dispatch::Ignored) => return None,
            Ok(dispatch) => dispatch,
            Err(_) => {
                // Already logged by the session
                if let Some(state) = self.registry.get(msg.receiver_id()) {
                    state.stats.record_malformed(ts);
                }
                return None;
            }
        };

        let handle = self.registry.register(msg.receiver_id());
        let stats = &self.registry.lookup(handle)?.stats;

        match dispatch {
            Dispatch::Emitted(osw) => {
                stats.record_osw(ts);
                Some(OswEvent {
                    receiver_id: handle.receiver_id(),
                    timestamp: ts,
                    osw,
                })
            }
            Dispatch::Timeout { .. } => {
                stats.record_timeout(ts);
                None
            }
            Dispatch::Queued | Dispatch::Ignored => {
                stats.record_osw(ts);
                None
            }
        }
    }

    /// Run until the message channel closes
    pub async fn run(mut self, mut rx: mpsc::Receiver<TransportMessage>) -> Result<ChannelStats> {
        info!(
            "Starting control channel manager, band plan {} ({:?})",
            self.channel.band_plan().family,
            self.channel.band_plan().subtype
        );

        let period = self.stats_interval;
        let mut stats_timer = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        info!("Message channel closed");
                        break;
                    };
                    if let Some(event) = self.handle(&msg) {
                        if self.event_tx.send(event).await.is_err() {
                            warn!("Event consumer closed, stopping");
                            break;
                        }
                    }
                }
                _ = stats_timer.tick() => {
                    info!("[Stats] {}", self.channel.stats());
                }
            }
        }

        for rx_state in self.registry.iter() {
            debug!(
                "Receiver {}: {} OSWs, {} timeouts, {} malformed",
                rx_state.receiver_id,
                rx_state.stats.get_osws(),
                rx_state.stats.get_timeouts(),
                rx_state.stats.get_malformed()
            );
        }

        let stats = self.channel.stats();
        info!("Control channel manager stopped. {}", stats);
        Ok(stats)
    }
}
