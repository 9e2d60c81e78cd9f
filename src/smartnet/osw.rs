//! OSW decoding: channel classification, frequency lookup, lagged emission

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use super::bandplan::BandPlan;
use super::queue::{OswQueue, OSW_QUEUE_SIZE};

/// A decoded outbound status word
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecodedOsw {
    /// Radio or talkgroup address
    pub address: u16,
    /// Group call flag
    pub group: bool,
    /// Command word; a channel number when `is_channel` is set
    pub command: u16,
    pub is_channel: bool,
    /// Resolved RF frequency, 0.0 when not a channel or outside the band plan
    pub frequency_mhz: f64,
}

impl DecodedOsw {
    /// Frequency, if the command resolved to one
    pub fn frequency(&self) -> Option<f64> {
        (self.frequency_mhz > 0.0).then_some(self.frequency_mhz)
    }
}

impl fmt::Display for DecodedOsw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_channel {
            write!(
                f,
                "SMARTNET OSW ({},{},0x{:03x},{:.6})",
                self.address, self.group, self.command, self.frequency_mhz
            )
        } else {
            write!(
                f,
                "SMARTNET OSW ({},{},0x{:03x})",
                self.address, self.group, self.command
            )
        }
    }
}

/// Per-session OSW decoder
///
/// Owns the correlation queue exclusively. The band plan is fixed for the
/// lifetime of the decoder.
#[derive(Debug)]
pub struct OswDecoder {
    plan: BandPlan,
    queue: OswQueue<DecodedOsw>,
}

impl OswDecoder {
    pub fn new(plan: BandPlan) -> Self {
        Self {
            plan,
            queue: OswQueue::new(OSW_QUEUE_SIZE),
        }
    }

    pub fn band_plan(&self) -> &BandPlan {
        &self.plan
    }

    /// Number of OSWs waiting in the correlation queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Decode one OSW and queue it.
    ///
    /// Returns the OSW that falls out of the queue, which lags the one just
    /// pushed by two words. The first two calls of a session return `None`.
    pub fn enqueue(&mut self, address: u16, group: u8, command: u16) -> Option<DecodedOsw> {
        let is_channel = self.plan.is_channel(command);
        let frequency_mhz = if is_channel {
            self.plan.frequency(command)
        } else {
            0.0
        };

        if frequency_mhz > 0.0 {
            trace!("SMARTNET FREQ (0x{:03x}): {:.6}", command, frequency_mhz);
        }

        self.queue.push(DecodedOsw {
            address,
            group: group != 0,
            command,
            is_channel,
            frequency_mhz,
        });

        let osw = self.queue.drain_if_ready()?;
        debug!("{}", osw);
        Some(osw)
    }
}
