//! SmartNet control channel decoding
//!
//! Transport messages enter through [`ControlChannel::dispatch`], OSW fields
//! are extracted, classified against the site [`BandPlan`], and released from
//! a short correlation queue as [`DecodedOsw`] values.

pub mod bandplan;
mod dispatch;
mod error;
pub mod message;
mod osw;
mod queue;

pub use bandplan::{BandFamily, BandPlan, BandSubtype, UhfParams};
pub use dispatch::{format_timestamp, ChannelStats, ControlChannel, Dispatch};
pub use error::DispatchError;
pub use message::{MessageType, RawOsw, TransportMessage};
pub use osw::{DecodedOsw, OswDecoder};
pub use queue::{OswQueue, OSW_QUEUE_SIZE};
