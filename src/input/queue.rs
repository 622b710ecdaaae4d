//! Bounded Event Queue
//!
//! Thread-safe FIFO of encoded records between the input-delivery thread and
//! whoever drains events. Pushes never block: when the queue is full the new
//! record is dropped and counted.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::trace;

use crate::input::error::Result;
use crate::input::record::{EventRecord, RECORD_SIZE};

/// Default queue capacity in records
pub const DEFAULT_QUEUE_CAPACITY: usize = 200;

/// One encoded record
pub type RawRecord = [u8; RECORD_SIZE];

/// Writer side of an event queue
pub trait EventSink: Send + Sync {
    /// Append a record without blocking. Returns `false` if it was not stored.
    fn push(&self, record: &RawRecord) -> bool;

    /// Discard every queued record
    fn clear(&self);
}

/// Bounded record queue backed by a crossbeam channel
pub struct EventQueue {
    tx: Sender<RawRecord>,
    rx: Receiver<RawRecord>,
    capacity: usize,
    dropped: AtomicU64,
}

impl EventQueue {
    /// Create a queue holding at most `capacity` records (minimum 1)
    pub fn bounded(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Self {
            tx,
            rx,
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Copy whole records into `dest` until it cannot hold another one.
    ///
    /// Returns the number of bytes written, always a multiple of
    /// [`RECORD_SIZE`].
    pub fn drain_into(&self, dest: &mut [u8]) -> usize {
        let mut written = 0;
        for slot in dest.chunks_exact_mut(RECORD_SIZE) {
            match self.rx.try_recv() {
                Ok(record) => {
                    slot.copy_from_slice(&record);
                    written += RECORD_SIZE;
                }
                Err(_) => break,
            }
        }
        written
    }

    /// Take every queued record
    pub fn drain(&self) -> Vec<RawRecord> {
        self.rx.try_iter().collect()
    }

    /// Take and decode every queued record
    pub fn drain_records(&self) -> Result<Vec<EventRecord>> {
        self.drain()
            .iter()
            .map(|raw| EventRecord::decode(raw))
            .collect()
    }

    /// Records currently queued
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Maximum number of queued records
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records rejected because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::bounded(DEFAULT_QUEUE_CAPACITY)
    }
}

impl EventSink for EventQueue {
    fn push(&self, record: &RawRecord) -> bool {
        match self.tx.try_send(*record) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                trace!("Event queue full, record dropped (total dropped: {})", dropped);
                false
            }
            // Both ends live in self, so this cannot happen while self exists
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    fn clear(&self) {
        let cleared = self.rx.try_iter().count();
        if cleared > 0 {
            trace!("Cleared {} queued records", cleared);
        }
    }
}
