//! Control channel session: routes transport messages to the OSW decoder

use std::fmt;

use tracing::{debug, trace, warn};

use super::bandplan::BandPlan;
use super::error::DispatchError;
use super::message::{RawOsw, TransportMessage, PROTOCOL_SMARTNET, SUBTYPE_OSW, SUBTYPE_TIMEOUT};
use super::osw::{DecodedOsw, OswDecoder};

/// What a dispatched message produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch {
    /// An OSW was decoded and an older one left the correlation queue
    Emitted(DecodedOsw),
    /// An OSW was decoded and is waiting in the correlation queue
    Queued,
    /// Receiver timeout notification
    Timeout { receiver_id: u32 },
    /// Other protocol or subtype
    Ignored,
}

impl Dispatch {
    pub fn emitted(&self) -> Option<&DecodedOsw> {
        match self {
            Self::Emitted(osw) => Some(osw),
            _ => None,
        }
    }
}

/// Session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub messages: u64,
    pub osws: u64,
    pub emitted: u64,
    pub malformed: u64,
    pub ignored: u64,
    pub timeouts: u64,
}

impl fmt::Display for ChannelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Messages: {} total, {} OSWs, {} emitted, {} malformed, {} ignored, {} timeouts",
            self.messages, self.osws, self.emitted, self.malformed, self.ignored, self.timeouts
        )
    }
}

/// One SmartNet control channel.
///
/// Messages must be dispatched in arrival order; each is fully processed
/// before the call returns.
#[derive(Debug)]
pub struct ControlChannel {
    decoder: OswDecoder,
    stats: ChannelStats,
}

impl ControlChannel {
    pub fn new(plan: BandPlan) -> Self {
        Self {
            decoder: OswDecoder::new(plan),
            stats: ChannelStats::default(),
        }
    }

    pub fn band_plan(&self) -> &BandPlan {
        self.decoder.band_plan()
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    /// Process one transport message.
    ///
    /// Non-SmartNet protocols and unknown subtypes are ignored. A short OSW
    /// payload is rejected with [`DispatchError::Malformed`]; the session stays
    /// usable.
    pub fn dispatch(&mut self, msg: &TransportMessage) -> Result<Dispatch, DispatchError> {
        self.stats.messages += 1;

        let protocol = msg.msg_type.protocol();
        if protocol != PROTOCOL_SMARTNET {
            trace!("Ignoring protocol {} message", protocol);
            self.stats.ignored += 1;
            return Ok(Dispatch::Ignored);
        }

        match msg.msg_type.subtype() {
            SUBTYPE_TIMEOUT => {
                // Receiver liveness is tracked by the caller
                self.stats.timeouts += 1;
                debug!(
                    "SMARTNET timeout rx={} at {}",
                    msg.receiver_id(),
                    format_timestamp(msg.timestamp())
                );
                Ok(Dispatch::Timeout {
                    receiver_id: msg.receiver_id(),
                })
            }
            SUBTYPE_OSW => {
                let raw = match RawOsw::from_payload(&msg.payload) {
                    Ok(raw) => raw,
                    Err(e) => {
                        self.stats.malformed += 1;
                        warn!("rx={}: {}", msg.receiver_id(), e);
                        return Err(e);
                    }
                };
                self.stats.osws += 1;
                trace!(
                    "{} SMARTNET OSW ({},{},0x{:03x})",
                    format_timestamp(msg.timestamp()),
                    raw.address,
                    raw.group,
                    raw.command
                );

                match self.decoder.enqueue(raw.address, raw.group, raw.command) {
                    Some(osw) => {
                        self.stats.emitted += 1;
                        Ok(Dispatch::Emitted(osw))
                    }
                    None => Ok(Dispatch::Queued),
                }
            }
            other => {
                trace!("Ignoring SmartNet subtype {}", other);
                self.stats.ignored += 1;
                Ok(Dispatch::Ignored)
            }
        }
    }
}

/// Render a message timestamp (seconds since the epoch) for log lines
pub fn format_timestamp(ts: f64) -> String {
    let secs = ts.floor() as i64;
    let nanos = ((ts - ts.floor()) * 1e9) as u32;
    match chrono::DateTime::<chrono::Utc>::from_timestamp(secs, nanos) {
        Some(dt) => dt.format("%m/%d/%y %H:%M:%S%.6f").to_string(),
        None => format!("{:.6}", ts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smartnet::bandplan::BandSubtype;
    use crate::smartnet::message::MessageType;

    fn session() -> ControlChannel {
        ControlChannel::new(BandPlan::band_800(BandSubtype::Standard))
    }

    fn osw(cmd: u16) -> TransportMessage {
        let [hi, lo] = cmd.to_be_bytes();
        TransportMessage::osw(0, 0.0, vec![0x00, 0x64, 0x00, hi, lo])
    }

    #[test]
    fn test_end_to_end_emission() {
        let mut cc = session();
        assert_eq!(cc.dispatch(&osw(0x100)).unwrap(), Dispatch::Queued);
        assert_eq!(cc.dispatch(&osw(0x101)).unwrap(), Dispatch::Queued);

        let out = cc.dispatch(&osw(0x102)).unwrap();
        let emitted = out.emitted().copied().unwrap();
        assert_eq!(emitted.address, 100);
        assert!(!emitted.group);
        assert_eq!(emitted.command, 0x100);
        assert!(emitted.is_channel);
        assert!((emitted.frequency_mhz - 857.4125).abs() < 1e-6);

        let stats = cc.stats();
        assert_eq!(stats.osws, 3);
        assert_eq!(stats.emitted, 1);
    }

    #[test]
    fn test_other_protocols_ignored() {
        let mut cc = session();
        let p25 = TransportMessage::new(MessageType::new(0, 0), 0, 0.0, vec![0; 5]);
        assert_eq!(cc.dispatch(&p25).unwrap(), Dispatch::Ignored);

        let unknown_type = MessageType::new(PROTOCOL_SMARTNET, 5);
        let unknown = TransportMessage::new(unknown_type, 0, 0.0, vec![0; 5]);
        assert_eq!(cc.dispatch(&unknown).unwrap(), Dispatch::Ignored);

        // Nothing reached the queue
        cc.dispatch(&osw(0x100)).unwrap();
        cc.dispatch(&osw(0x101)).unwrap();
        assert!(cc.dispatch(&osw(0x102)).unwrap().emitted().is_some());
        assert_eq!(cc.stats().ignored, 2);
    }

    #[test]
    fn test_timeout_is_reported() {
        let mut cc = session();
        let msg = TransportMessage::new(
            MessageType::new(PROTOCOL_SMARTNET, SUBTYPE_TIMEOUT),
            4 << 1,
            12.0,
            vec![],
        );
        assert_eq!(cc.dispatch(&msg).unwrap(), Dispatch::Timeout { receiver_id: 4 });
        assert_eq!(cc.stats().timeouts, 1);
    }

    #[test]
    fn test_malformed_does_not_poison_session() {
        let mut cc = session();
        let short = TransportMessage::osw(0, 0.0, vec![0x00, 0x64, 0x00]);
        assert!(matches!(
            cc.dispatch(&short),
            Err(DispatchError::Malformed { len: 3, .. })
        ));
        assert_eq!(cc.stats().malformed, 1);

        cc.dispatch(&osw(0x200)).unwrap();
        cc.dispatch(&osw(0x201)).unwrap();
        let out = cc.dispatch(&osw(0x202)).unwrap();
        assert_eq!(out.emitted().map(|o| o.command), Some(0x200));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.5), "01/01/70 00:00:00.500000");
    }
}
