//! SmartNet Capture - Motorola SmartNet/SmartZone control channel decoder
//!
//! Takes demodulated control channel messages, decodes outbound status words
//! (OSWs), classifies their command words against the site band plan and
//! resolves channel numbers to RF frequencies.

pub mod config;
pub mod receiver;
pub mod smartnet;
pub mod source;

pub use config::{ChannelConfig, Config, ConfigError};
pub use smartnet::{BandPlan, ControlChannel, DecodedOsw, Dispatch, DispatchError, TransportMessage};
