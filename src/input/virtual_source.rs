//! In-Process Pointer Source
//!
//! A pointer source without a platform behind it. Events are injected by
//! calling the dispatch methods directly, which makes it the source used by
//! trace replay and by tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::input::error::Result;
use crate::input::source::{ListenerHandle, PointerListener, PointerSource, PointerSurface};

#[derive(Debug)]
struct SurfaceState {
    width: i32,
    height: i32,
    cursor: Option<(i32, i32)>,
    warps: Vec<(i32, i32)>,
}

/// Surface with a settable size and cursor
#[derive(Debug)]
pub struct VirtualSurface {
    state: Mutex<SurfaceState>,
}

impl VirtualSurface {
    /// Create a `width` x `height` surface with the cursor at the origin
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            state: Mutex::new(SurfaceState {
                width,
                height,
                cursor: Some((0, 0)),
                warps: Vec::new(),
            }),
        }
    }

    /// Change the surface size
    pub fn resize(&self, width: i32, height: i32) {
        let mut state = self.state.lock();
        state.width = width;
        state.height = height;
    }

    /// Set the reported cursor position (`None` when it cannot be queried)
    pub fn set_cursor(&self, cursor: Option<(i32, i32)>) {
        self.state.lock().cursor = cursor;
    }

    /// Every position the cursor was warped to, oldest first
    pub fn warps(&self) -> Vec<(i32, i32)> {
        self.state.lock().warps.clone()
    }
}

impl PointerSurface for VirtualSurface {
    fn size(&self) -> (i32, i32) {
        let state = self.state.lock();
        (state.width, state.height)
    }

    fn cursor_position(&self) -> Option<(i32, i32)> {
        self.state.lock().cursor
    }

    fn warp_cursor(&self, x: i32, y: i32) {
        let mut state = self.state.lock();
        state.cursor = Some((x, y));
        state.warps.push((x, y));
    }
}

/// Pointer source driven by direct calls
pub struct VirtualSource {
    surface: Option<Arc<VirtualSurface>>,
    listeners: Mutex<Vec<(ListenerHandle, Arc<dyn PointerListener>)>>,
    next_handle: AtomicU64,
}

impl VirtualSource {
    /// Source without a display surface
    pub fn headless() -> Arc<Self> {
        Self::new(None)
    }

    /// Source with a `width` x `height` surface
    pub fn with_surface(width: i32, height: i32) -> Arc<Self> {
        Self::new(Some(Arc::new(VirtualSurface::new(width, height))))
    }

    fn new(surface: Option<Arc<VirtualSurface>>) -> Arc<Self> {
        Arc::new(Self {
            surface,
            listeners: Mutex::new(Vec::new()),
            next_handle: AtomicU64::new(1),
        })
    }

    /// The concrete surface, if any
    pub fn virtual_surface(&self) -> Option<&Arc<VirtualSurface>> {
        self.surface.as_ref()
    }

    /// Number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Deliver an absolute move. The surface cursor follows the pointer.
    pub fn move_to(&self, x: i32, y: i32, timestamp: i64) {
        if let Some(surface) = &self.surface {
            surface.set_cursor(Some((x, y)));
        }
        for listener in self.snapshot() {
            listener.on_motion(x, y, timestamp);
        }
    }

    /// Deliver a relative delta
    pub fn raw_delta(&self, dx: i32, dy: i32, timestamp: i64) {
        for listener in self.snapshot() {
            listener.on_raw_delta(dx, dy, timestamp);
        }
    }

    /// Deliver a raw button transition, stopping at the first listener error
    pub fn button(
        &self,
        raw_button: i32,
        raw_action: i32,
        modifier_held: bool,
        timestamp: i64,
    ) -> Result<()> {
        for listener in self.snapshot() {
            listener.on_button_event(raw_button, raw_action, modifier_held, timestamp)?;
        }
        Ok(())
    }

    /// Deliver wheel notches
    pub fn wheel(&self, notches: i32, timestamp: i64) {
        for listener in self.snapshot() {
            listener.on_wheel(notches, timestamp);
        }
    }

    // Callbacks run outside the registry lock so listeners may detach
    fn snapshot(&self) -> Vec<Arc<dyn PointerListener>> {
        self.listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }
}

impl PointerSource for VirtualSource {
    fn surface(&self) -> Option<Arc<dyn PointerSurface>> {
        self.surface
            .clone()
            .map(|surface| surface as Arc<dyn PointerSurface>)
    }

    fn attach(&self, listener: Arc<dyn PointerListener>) -> ListenerHandle {
        let handle = ListenerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((handle, listener));
        handle
    }

    fn detach(&self, handle: ListenerHandle) {
        self.listeners.lock().retain(|(h, _)| *h != handle);
    }
}
