//! Event Record Codec
//!
//! Every discrete pointer event is serialized into the same fixed 22-byte
//! layout, so consumers can frame the queue without a length prefix and tell
//! record kinds apart from the `button` field alone.
//!
//! ```text
//! offset  size  field
//!      0     1  button     i8   (0..=2, or -1 for motion/wheel)
//!      1     1  state      u8   (0 released, 1 pressed)
//!      2     4  coord1     i32  (absolute x in windowed motion, else 0)
//!      6     4  coord2     i32  (absolute y in windowed motion, else 0)
//!     10     4  dz         i32  (scaled wheel delta, else 0)
//!     14     8  timestamp  i64  (nanoseconds)
//! ```
//!
//! All multi-byte fields are big-endian.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::input::error::{InputError, Result};

/// Size of one encoded record in bytes
pub const RECORD_SIZE: usize = 22;

/// `button` sentinel for records that carry no button transition
pub const NO_BUTTON: i8 = -1;

/// Kind of a record, derived from its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Pointer motion (absolute or relative)
    Motion,
    /// Canonical button transition
    Button,
    /// Wheel notches
    Wheel,
}

/// One discrete pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Canonical button index, or [`NO_BUTTON`]
    pub button: i8,
    /// Button state (meaningless for motion/wheel)
    pub state: u8,
    /// Absolute X in windowed motion events
    pub coord1: i32,
    /// Absolute Y in windowed motion events
    pub coord2: i32,
    /// Wheel delta in scaled units
    pub dz: i32,
    /// Event timestamp in nanoseconds
    pub timestamp: i64,
}

impl EventRecord {
    /// Motion record carrying the given coordinates
    pub fn motion(x: i32, y: i32, timestamp: i64) -> Self {
        Self {
            button: NO_BUTTON,
            state: 0,
            coord1: x,
            coord2: y,
            dz: 0,
            timestamp,
        }
    }

    /// Button transition record
    pub fn button(button: i8, state: u8, timestamp: i64) -> Self {
        Self {
            button,
            state,
            coord1: 0,
            coord2: 0,
            dz: 0,
            timestamp,
        }
    }

    /// Wheel record with an already scaled delta
    pub fn wheel(dz: i32, timestamp: i64) -> Self {
        Self {
            button: NO_BUTTON,
            state: 0,
            coord1: 0,
            coord2: 0,
            dz,
            timestamp,
        }
    }

    /// Record kind, demultiplexed from the button sentinel.
    ///
    /// Relies on wheel records never carrying `dz == 0`; the tracker does not
    /// emit zero-notch wheel events.
    pub fn kind(&self) -> RecordKind {
        if self.button != NO_BUTTON {
            RecordKind::Button
        } else if self.dz != 0 {
            RecordKind::Wheel
        } else {
            RecordKind::Motion
        }
    }

    /// Serialize into the fixed wire layout
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        encode(
            self.button,
            self.state,
            self.coord1,
            self.coord2,
            self.dz,
            self.timestamp,
        )
    }

    /// Parse one record from exactly [`RECORD_SIZE`] bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RECORD_SIZE {
            return Err(InputError::InvalidRecordLength {
                actual: bytes.len(),
                expected: RECORD_SIZE,
            });
        }

        let mut buf = bytes;
        Ok(Self {
            button: buf.get_i8(),
            state: buf.get_u8(),
            coord1: buf.get_i32(),
            coord2: buf.get_i32(),
            dz: buf.get_i32(),
            timestamp: buf.get_i64(),
        })
    }
}

/// Encode raw record fields into the fixed wire layout.
///
/// Callers validate their inputs; this never fails.
pub fn encode(
    button: i8,
    state: u8,
    coord1: i32,
    coord2: i32,
    dz: i32,
    timestamp: i64,
) -> [u8; RECORD_SIZE] {
    let mut out = [0u8; RECORD_SIZE];
    let mut buf = &mut out[..];
    buf.put_i8(button);
    buf.put_u8(state);
    buf.put_i32(coord1);
    buf.put_i32(coord2);
    buf.put_i32(dz);
    buf.put_i64(timestamp);
    out
}
