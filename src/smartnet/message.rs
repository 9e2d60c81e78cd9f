//! Transport messages from the demodulator and raw OSW field extraction

use super::error::DispatchError;

/// Protocol id carried in the upper half of the message type
pub const PROTOCOL_SMARTNET: i16 = 2;

/// Message subtypes within the SmartNet protocol
pub const SUBTYPE_TIMEOUT: i16 = -1;
pub const SUBTYPE_OSW: i16 = 0;

/// OSW payload length in bytes
pub const OSW_PAYLOAD_LEN: usize = 5;

/// Packed 32-bit message type: protocol id in the high 16 bits, subtype in the low 16
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageType(pub i32);

impl MessageType {
    pub fn new(protocol: i16, subtype: i16) -> Self {
        Self(((protocol as i32) << 16) | (subtype as u16 as i32))
    }

    /// Signed protocol id.
    ///
    /// Arithmetic shift keeps the sign of the high half.
    pub fn protocol(self) -> i16 {
        (self.0 >> 16) as i16
    }

    /// Signed subtype.
    ///
    /// The low 16 bits are read as two's complement, so `0xFFFF` is -1.
    pub fn subtype(self) -> i16 {
        (self.0 & 0xFFFF) as u16 as i16
    }
}

/// One message from the demodulation layer
#[derive(Debug, Clone, PartialEq)]
pub struct TransportMessage {
    pub msg_type: MessageType,
    /// Receiver id, stored shifted left by one
    pub arg1: i64,
    /// Timestamp in seconds
    pub arg2: f64,
    pub payload: Vec<u8>,
}

impl TransportMessage {
    pub fn new(msg_type: MessageType, arg1: i64, arg2: f64, payload: Vec<u8>) -> Self {
        Self {
            msg_type,
            arg1,
            arg2,
            payload,
        }
    }

    /// Build an OSW message for a receiver, as the demodulator would
    pub fn osw(receiver_id: u32, timestamp: f64, payload: Vec<u8>) -> Self {
        Self::new(
            MessageType::new(PROTOCOL_SMARTNET, SUBTYPE_OSW),
            (receiver_id as i64) << 1,
            timestamp,
            payload,
        )
    }

    pub fn receiver_id(&self) -> u32 {
        (self.arg1 >> 1) as u32
    }

    pub fn timestamp(&self) -> f64 {
        self.arg2
    }
}

/// Raw OSW fields before band plan interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawOsw {
    pub address: u16,
    pub group: u8,
    pub command: u16,
}

impl RawOsw {
    /// Extract big-endian fields from the first five payload bytes
    pub fn from_payload(payload: &[u8]) -> Result<Self, DispatchError> {
        if payload.len() < OSW_PAYLOAD_LEN {
            return Err(DispatchError::Malformed {
                len: payload.len(),
                expected: OSW_PAYLOAD_LEN,
            });
        }
        Ok(Self {
            address: u16::from_be_bytes([payload[0], payload[1]]),
            group: payload[2],
            command: u16::from_be_bytes([payload[3], payload[4]]),
        })
    }

    pub fn is_group(&self) -> bool {
        self.group != 0
    }
}
