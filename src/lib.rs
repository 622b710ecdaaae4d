//! # lamco-pointer-queue
//!
//! Pointer input normalization for Linux desktop sessions.
//!
//! Platform pointer callbacks (motion, button transitions, wheel notches)
//! arrive irregularly on an input-delivery thread. This crate turns them into:
//! - a FIFO of fixed 22-byte binary event records, and
//! - coalesced delta/button snapshots for a polling consumer,
//!
//! both guarded by a single lock so producer and consumer never race.
//!
//! # Architecture
//!
//! ```text
//! lamco-pointer-queue
//!   ├─> PointerSource (platform callbacks, surface size, cursor warp)
//!   ├─> ButtonChordResolver (raw ids + modifier → 3-button model)
//!   ├─> PointerTracker (state, Y-flip, accumulators, grab mode)
//!   ├─> EventRecord codec → EventQueue (bounded, drop-newest)
//!   └─> PollSnapshot (read-and-reset for the polling thread)
//! ```
//!
//! # Data Flow
//!
//! **Event Path:** Source → Tracker → Record codec → EventQueue → drain
//!
//! **Poll Path:** Polling thread → Tracker lock → PollSnapshot

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Replay tool configuration
pub mod config;

/// Pointer state tracking, record codec and event queue
pub mod input;

/// Scripted trace replay against a virtual pointer source
pub mod replay;
