//! Pointer State Tracking
//!
//! Owns the pointer state aggregate and turns platform callbacks into
//! encoded event records. All operations, producer callbacks and consumer
//! polls alike, run under one exclusive lock held for O(1) work only.
//!
//! # Modes
//!
//! - **Windowed**: absolute positions are Y-flipped and tracked, deltas are
//!   derived from consecutive positions.
//! - **Captured** (grabbed): positions are not tracked, deltas arrive through
//!   [`PointerListener::on_raw_delta`].
//!
//! Switching modes with [`PointerTracker::set_grabbed`] resets the delta
//! accumulators so no delta computed against the old reference frame leaks
//! into the new one.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::input::buttons::{ButtonChordResolver, ButtonStates, NUM_BUTTONS};
use crate::input::error::Result;
use crate::input::queue::{EventQueue, EventSink};
use crate::input::record::EventRecord;
use crate::input::source::{ListenerHandle, PointerListener, PointerSource, PointerSurface};

/// Wheel delta units per notch
pub const NOTCH_SCALE: i32 = 120;

/// Motion semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerMode {
    /// Absolute tracking
    Windowed,
    /// Relative tracking, pointer grabbed
    Captured,
}

/// Mutable pointer state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    /// Last absolute X (windowed mode only)
    pub last_x: i32,
    /// Last absolute Y, already flipped (windowed mode only)
    pub last_y: i32,
    /// X delta since the last poll
    pub accum_dx: i32,
    /// Y delta since the last poll
    pub accum_dy: i32,
    /// Wheel delta since the last poll
    pub accum_dz: i32,
    /// Canonical button states
    pub buttons: ButtonStates,
    /// Captured mode flag
    pub grabbed: bool,
    /// Chord latch
    pub chord: ButtonChordResolver,
}

impl PointerState {
    pub(crate) fn reset_accumulators(&mut self) {
        self.accum_dx = 0;
        self.accum_dy = 0;
        self.accum_dz = 0;
    }

    fn add_delta(&mut self, dx: i32, dy: i32) {
        self.accum_dx = self.accum_dx.saturating_add(dx);
        self.accum_dy = self.accum_dy.saturating_add(dy);
    }

    /// Current mode
    pub fn mode(&self) -> PointerMode {
        if self.grabbed {
            PointerMode::Captured
        } else {
            PointerMode::Windowed
        }
    }
}

struct Registration {
    source: Weak<dyn PointerSource>,
    handle: ListenerHandle,
}

impl Registration {
    fn detach(self) {
        // A source that is already gone has nothing left to deliver
        if let Some(source) = self.source.upgrade() {
            source.detach(self.handle);
            debug!("Pointer tracker detached listener {:?}", self.handle);
        }
    }
}

struct TrackerInner {
    state: PointerState,
    surface: Option<Arc<dyn PointerSurface>>,
    registration: Option<Registration>,
}

impl TrackerInner {
    /// Flip Y so the origin sits at the bottom-left. Size is read per event.
    fn transform_y(&self, y: i32) -> i32 {
        match &self.surface {
            Some(surface) => {
                let (_, height) = surface.size();
                height.saturating_sub(1).saturating_sub(y)
            }
            None => y,
        }
    }

    fn is_attached(&self) -> bool {
        self.registration.is_some()
    }
}

/// Pointer state tracker writing records into an [`EventSink`]
pub struct PointerTracker<S: EventSink = EventQueue> {
    inner: Mutex<TrackerInner>,
    sink: S,
}

impl PointerTracker<EventQueue> {
    /// Create a tracker with its own bounded queue
    pub fn with_queue_capacity(capacity: usize) -> Self {
        Self::new(EventQueue::bounded(capacity))
    }

    /// Queue the tracker writes into
    pub fn queue(&self) -> &EventQueue {
        &self.sink
    }
}

impl<S: EventSink> PointerTracker<S> {
    /// Create a detached tracker writing into `sink`
    pub fn new(sink: S) -> Self {
        Self {
            inner: Mutex::new(TrackerInner {
                state: PointerState::default(),
                surface: None,
                registration: None,
            }),
            sink,
        }
    }

    /// Sink the tracker writes into
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Attach to `source` starting from a clean, centred baseline.
    ///
    /// Any previous registration is detached first, so the tracker listens to
    /// exactly one source. Pending deltas and queued records are discarded,
    /// the OS cursor is moved to the centre of the source's surface and the
    /// reference position is anchored there. Without a surface the tracker
    /// runs headless and the recentring is skipped.
    ///
    /// The whole operation runs under the tracker lock. The tracker only holds
    /// a weak reference to the source.
    pub fn register<P>(self: &Arc<Self>, source: &Arc<P>)
    where
        P: PointerSource + 'static,
        S: 'static,
    {
        let mut inner = self.inner.lock();
        if let Some(previous) = inner.registration.take() {
            previous.detach();
        }

        inner.surface = source.surface();
        inner.state.reset_accumulators();
        self.sink.clear();

        if let Some(surface) = inner.surface.clone() {
            let (width, height) = surface.size();
            let (center_x, center_y) = (width / 2, height / 2);
            surface.warp_cursor(center_x, center_y);
            inner.state.last_x = center_x;
            inner.state.last_y = inner.transform_y(center_y);
            debug!(
                "Pointer tracker centred at ({}, {}) on {}x{} surface",
                center_x, center_y, width, height
            );
        } else {
            debug!("Pointer tracker registered headless");
        }

        let listener: Arc<dyn PointerListener> = self.clone();
        let handle = source.attach(listener);
        let weak: Weak<P> = Arc::downgrade(source);
        let weak: Weak<dyn PointerSource> = weak;
        inner.registration = Some(Registration {
            source: weak,
            handle,
        });
        debug!("Pointer tracker attached as listener {:?}", handle);
    }

    /// Detach from the registered source.
    ///
    /// Callbacks delivered after this returns are ignored. A callback that
    /// already holds the lock finishes normally.
    pub fn unregister(&self) {
        let mut inner = self.inner.lock();
        inner.surface = None;
        if let Some(registration) = inner.registration.take() {
            registration.detach();
        }
    }

    /// Whether the tracker currently accepts callbacks
    pub fn is_registered(&self) -> bool {
        self.inner.lock().is_attached()
    }

    /// Switch between captured (`true`) and windowed (`false`) motion.
    ///
    /// Always clears the accumulators and queued records. Entering windowed
    /// mode re-anchors the reference position to the current cursor so the
    /// next motion event does not report a jump.
    pub fn set_grabbed(&self, grabbed: bool) {
        let mut inner = self.inner.lock();
        let was_grabbed = inner.state.grabbed;
        inner.state.grabbed = grabbed;
        inner.state.reset_accumulators();
        self.sink.clear();

        if !grabbed {
            let cursor = inner.surface.as_ref().and_then(|s| s.cursor_position());
            if let Some((x, y)) = cursor {
                inner.state.last_x = x;
                inner.state.last_y = inner.transform_y(y);
            }
        }

        if was_grabbed != grabbed {
            debug!(
                "Pointer mode {:?} -> {:?}",
                if was_grabbed {
                    PointerMode::Captured
                } else {
                    PointerMode::Windowed
                },
                inner.state.mode()
            );
        }
    }

    /// Whether the pointer is grabbed
    pub fn is_grabbed(&self) -> bool {
        self.inner.lock().state.grabbed
    }

    /// Current motion mode
    pub fn mode(&self) -> PointerMode {
        self.inner.lock().state.mode()
    }

    /// Copy of the full state
    pub fn state(&self) -> PointerState {
        self.inner.lock().state
    }

    /// Copy of the canonical button states
    pub fn buttons(&self) -> [u8; NUM_BUTTONS] {
        self.inner.lock().state.buttons
    }

    /// Last tracked absolute position
    pub fn position(&self) -> (i32, i32) {
        let inner = self.inner.lock();
        (inner.state.last_x, inner.state.last_y)
    }

    /// Run `f` on the state under the lock
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut PointerState) -> R) -> R {
        f(&mut self.inner.lock().state)
    }

    fn emit(&self, record: EventRecord) {
        // Best effort: overflow policy belongs to the sink
        let _ = self.sink.push(&record.encode());
    }
}

impl<S: EventSink> PointerListener for PointerTracker<S> {
    fn on_motion(&self, x: i32, y: i32, timestamp: i64) {
        let mut inner = self.inner.lock();
        if !inner.is_attached() {
            trace!("Ignoring motion while detached");
            return;
        }
        // Captured mode takes its deltas from on_raw_delta
        if inner.state.grabbed {
            return;
        }

        let y = inner.transform_y(y);
        let state = &mut inner.state;
        let dx = x.saturating_sub(state.last_x);
        let dy = y.saturating_sub(state.last_y);
        state.add_delta(dx, dy);
        state.last_x = x;
        state.last_y = y;

        trace!("Pointer motion to ({}, {}) delta ({}, {})", x, y, dx, dy);
        self.emit(EventRecord::motion(x, y, timestamp));
    }

    fn on_raw_delta(&self, dx: i32, dy: i32, timestamp: i64) {
        let mut inner = self.inner.lock();
        if !inner.is_attached() {
            trace!("Ignoring raw delta while detached");
            return;
        }
        if !inner.state.grabbed {
            trace!("Ignoring raw delta in windowed mode");
            return;
        }

        inner.state.add_delta(dx, dy);
        trace!("Pointer raw delta ({}, {})", dx, dy);
        self.emit(EventRecord::motion(0, 0, timestamp));
    }

    fn on_button_event(
        &self,
        raw_button: i32,
        raw_action: i32,
        modifier_held: bool,
        timestamp: i64,
    ) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if !inner.is_attached() {
            trace!("Ignoring button event while detached");
            return Ok(());
        }

        let state = &mut inner.state;
        let transition =
            state
                .chord
                .resolve(raw_button, raw_action, modifier_held, &state.buttons)?;

        if let Some(transition) = transition {
            let index = transition.button.index();
            state.buttons[index] = transition.state;
            trace!(
                "Pointer button {:?} -> {} (raw {})",
                transition.button,
                transition.state,
                raw_button
            );
            self.emit(EventRecord::button(index as i8, transition.state, timestamp));
        }

        Ok(())
    }

    fn on_wheel(&self, notches: i32, timestamp: i64) {
        let mut inner = self.inner.lock();
        if !inner.is_attached() {
            trace!("Ignoring wheel while detached");
            return;
        }

        // A zero-notch record would be indistinguishable from motion
        if notches == 0 {
            return;
        }

        let dz = notches.saturating_mul(NOTCH_SCALE);
        inner.state.accum_dz = inner.state.accum_dz.saturating_add(dz);
        trace!("Pointer wheel {} notches ({} units)", notches, dz);
        self.emit(EventRecord::wheel(dz, timestamp));
    }
}
