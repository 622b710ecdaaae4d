//! Platform Pointer Source
//!
//! Narrow interfaces between the tracker and the platform: the surface the
//! pointer lives on, the listener callbacks the platform drives, and the
//! source that attaches listeners.

use std::sync::Arc;

use crate::input::error::Result;

/// Display surface the pointer moves over.
///
/// Coordinates are component-relative with the origin at the top-left corner.
pub trait PointerSurface: Send + Sync {
    /// Current `(width, height)` in pixels
    fn size(&self) -> (i32, i32);

    /// Current cursor position, if the platform can report it
    fn cursor_position(&self) -> Option<(i32, i32)>;

    /// Move the OS cursor
    fn warp_cursor(&self, x: i32, y: i32);
}

/// Callbacks a pointer source delivers on its input thread
pub trait PointerListener: Send + Sync {
    /// Absolute motion in surface coordinates
    fn on_motion(&self, x: i32, y: i32, timestamp: i64);

    /// Relative motion from the captured-mode delta channel
    fn on_raw_delta(&self, dx: i32, dy: i32, timestamp: i64);

    /// Raw button transition
    fn on_button_event(
        &self,
        raw_button: i32,
        raw_action: i32,
        modifier_held: bool,
        timestamp: i64,
    ) -> Result<()>;

    /// Wheel rotation in notches, positive away from the user
    fn on_wheel(&self, notches: i32, timestamp: i64);
}

/// Opaque id of an attached listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u64);

/// Source of pointer callbacks.
///
/// The tracker calls [`attach`](Self::attach) and [`detach`](Self::detach)
/// while holding its own lock. Neither may call into a listener or wait for a
/// callback in flight on another thread.
pub trait PointerSource: Send + Sync {
    /// Surface the source reports on. `None` runs headless.
    fn surface(&self) -> Option<Arc<dyn PointerSurface>>;

    /// Start delivering callbacks to `listener`
    fn attach(&self, listener: Arc<dyn PointerListener>) -> ListenerHandle;

    /// Stop delivering callbacks to a previously attached listener
    fn detach(&self, handle: ListenerHandle);
}
