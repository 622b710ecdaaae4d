//! Pointer Input Normalization
//!
//! Turns asynchronously delivered platform pointer callbacks into a
//! deterministic stream of fixed-size binary event records, and serves a
//! separate polling consumer with coalesced delta and button snapshots.
//!
//! # Architecture
//!
//! ```text
//! Platform input thread                        Polling thread
//!       ↓                                             ↓
//! ┌─────────────────────────┐                         │
//! │  PointerSource          │ move / button / wheel   │
//! └─────────────────────────┘                         │
//!       ↓                                             │
//! ┌─────────────────────────┐   ┌──────────────────┐  │
//! │  PointerTracker         │ ← │ ButtonChord      │  │
//! │  - one exclusive lock   │   │ Resolver         │  │
//! │  - Y-flip, accumulators │   └──────────────────┘  │
//! │  - poll() ←─────────────┼─────────────────────────┘
//! └─────────────────────────┘
//!       ↓ EventRecord::encode (22 bytes)
//! ┌─────────────────────────┐
//! │  EventQueue (bounded)   │ → drain on the consumer side
//! └─────────────────────────┘
//! ```
//!
//! # Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lamco_pointer_queue::input::{
//!     PointerTracker, VirtualSource, ACTION_PRESSED, RAW_BUTTON_PRIMARY,
//! };
//!
//! let source = VirtualSource::with_surface(1024, 768);
//! let tracker = Arc::new(PointerTracker::with_queue_capacity(64));
//! tracker.register(&source);
//!
//! source.move_to(10, 100, 1_000);
//! source.button(RAW_BUTTON_PRIMARY, ACTION_PRESSED, false, 2_000).unwrap();
//! source.wheel(1, 3_000);
//!
//! let snapshot = tracker.snapshot();
//! assert_eq!(snapshot.coords, [10, 667, 120]);
//! assert_eq!(snapshot.buttons, [1, 0, 0]);
//!
//! // register() queued nothing; three callbacks queued three records
//! assert_eq!(tracker.queue().drain_records().unwrap().len(), 3);
//! ```

pub mod buttons;
pub mod error;
pub mod poll;
pub mod queue;
pub mod record;
pub mod source;
pub mod tracker;
pub mod virtual_source;

pub use buttons::{
    ButtonAction, ButtonChordResolver, ButtonStates, ButtonTransition, MouseButton,
    ACTION_PRESSED, ACTION_RELEASED, NUM_BUTTONS, RAW_BUTTON_MIDDLE, RAW_BUTTON_NONE,
    RAW_BUTTON_PRIMARY, RAW_BUTTON_SECONDARY,
};
pub use error::{classify_error, ErrorType, InputError, Result};
pub use poll::PollSnapshot;
pub use queue::{EventQueue, EventSink, RawRecord, DEFAULT_QUEUE_CAPACITY};
pub use record::{encode, EventRecord, RecordKind, NO_BUTTON, RECORD_SIZE};
pub use source::{ListenerHandle, PointerListener, PointerSource, PointerSurface};
pub use tracker::{PointerMode, PointerState, PointerTracker, NOTCH_SCALE};
pub use virtual_source::{VirtualSource, VirtualSurface};
