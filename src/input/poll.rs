//! Poll Snapshots
//!
//! Consumer-side read of the coalesced pointer state. A poll reads and resets
//! the accumulators in the same critical section as the producer callbacks,
//! so no delta is ever counted twice or lost between two polls.

use serde::{Deserialize, Serialize};

use crate::input::buttons::{ButtonStates, NUM_BUTTONS};
use crate::input::queue::EventSink;
use crate::input::tracker::{PointerState, PointerTracker};

/// Result of one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSnapshot {
    /// `[dx, dy, dz]` when grabbed, `[x, y, dz]` otherwise
    pub coords: [i32; 3],
    /// Canonical button states
    pub buttons: ButtonStates,
}

impl PointerState {
    /// Read the poll values and reset the accumulators
    pub(crate) fn take_snapshot(&mut self) -> PollSnapshot {
        let (c0, c1) = if self.grabbed {
            (self.accum_dx, self.accum_dy)
        } else {
            (self.last_x, self.last_y)
        };
        let snapshot = PollSnapshot {
            coords: [c0, c1, self.accum_dz],
            buttons: self.buttons,
        };
        self.reset_accumulators();
        snapshot
    }
}

impl<S: EventSink> PointerTracker<S> {
    /// Fill the caller's buffers with the current poll values.
    ///
    /// Never fails and never waits on anything but the tracker lock.
    pub fn poll(&self, coords: &mut [i32; 3], buttons: &mut [u8; NUM_BUTTONS]) {
        let snapshot = self.snapshot();
        *coords = snapshot.coords;
        *buttons = snapshot.buttons;
    }

    /// Poll into a fresh [`PollSnapshot`]
    pub fn snapshot(&self) -> PollSnapshot {
        self.with_state(PointerState::take_snapshot)
    }
}
