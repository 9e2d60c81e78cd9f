//! Per-receiver state tracking

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for a single receiver
#[derive(Debug, Default)]
pub struct ReceiverStats {
    pub osws: AtomicU64,
    pub timeouts: AtomicU64,
    pub malformed: AtomicU64,
    /// Timestamp of the last message, stored as `f64` bits
    last_seen_bits: AtomicU64,
}

impl ReceiverStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_osw(&self, timestamp: f64) {
        self.osws.fetch_add(1, Ordering::Relaxed);
        self.touch(timestamp);
    }

    pub fn record_timeout(&self, timestamp: f64) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
        self.touch(timestamp);
    }

    pub fn record_malformed(&self, timestamp: f64) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
        self.touch(timestamp);
    }

    fn touch(&self, timestamp: f64) {
        self.last_seen_bits.store(timestamp.to_bits(), Ordering::Relaxed);
    }

    pub fn get_osws(&self) -> u64 {
        self.osws.load(Ordering::Relaxed)
    }

    pub fn get_timeouts(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }

    pub fn get_malformed(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
    }

    /// Timestamp of the most recent message, 0.0 if none yet
    pub fn last_seen(&self) -> f64 {
        f64::from_bits(self.last_seen_bits.load(Ordering::Relaxed))
    }
}

/// State for a single demodulating receiver
#[derive(Debug)]
pub struct ReceiverState {
    pub receiver_id: u32,
    pub stats: ReceiverStats,
}

impl ReceiverState {
    pub fn new(receiver_id: u32) -> Self {
        Self {
            receiver_id,
            stats: ReceiverStats::new(),
        }
    }
}
