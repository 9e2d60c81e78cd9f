//! Receiver registry
//!
//! The decoding core only refers to receivers by id. Whatever owns the
//! demodulators implements [`ReceiverRegistry`]; [`LocalRegistry`] is the
//! in-process version used by the capture binary.

use std::collections::HashMap;

use tracing::debug;

use super::state::ReceiverState;

/// Opaque handle returned by [`ReceiverRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiverHandle(u32);

impl ReceiverHandle {
    pub fn receiver_id(self) -> u32 {
        self.0
    }
}

pub trait ReceiverRegistry {
    /// Register a receiver, returning the existing handle if already known
    fn register(&mut self, receiver_id: u32) -> ReceiverHandle;

    fn lookup(&self, handle: ReceiverHandle) -> Option<&ReceiverState>;
}

/// Registry backed by a map
#[derive(Debug, Default)]
pub struct LocalRegistry {
    receivers: HashMap<u32, ReceiverState>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.receivers.len()
    }

    pub fn get(&self, receiver_id: u32) -> Option<&ReceiverState> {
        self.receivers.get(&receiver_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReceiverState> {
        self.receivers.values()
    }
}

impl ReceiverRegistry for LocalRegistry {
    fn register(&mut self, receiver_id: u32) -> ReceiverHandle {
        self.receivers.entry(receiver_id).or_insert_with(|| {
            debug!("New receiver registered: {}", receiver_id);
            ReceiverState::new(receiver_id)
        });
        ReceiverHandle(receiver_id)
    }

    fn lookup(&self, handle: ReceiverHandle) -> Option<&ReceiverState> {
        self.receivers.get(&handle.0)
    }
}
