//! Fixed-depth OSW correlation queue
//!
//! Decoded OSWs are held back until the queue is full, then released oldest
//! first, giving a constant lag of `OSW_QUEUE_SIZE - 1` words. Some commands
//! are up to three OSWs long. Nothing here correlates entries yet; the queue
//! only delays them.

use std::collections::VecDeque;

/// Queue depth
pub const OSW_QUEUE_SIZE: usize = 3;

/// Bounded FIFO of pending items
#[derive(Debug, Clone)]
pub struct OswQueue<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> Default for OswQueue<T> {
    fn default() -> Self {
        Self::new(OSW_QUEUE_SIZE)
    }
}

impl<T> OswQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest first if already full
    pub fn push(&mut self, entry: T) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Pop the oldest entry once the queue has reached capacity
    pub fn drain_if_ready(&mut self) -> Option<T> {
        if self.entries.len() < self.capacity {
            return None;
        }
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
