//! Interception hooks registered by external plugin code.
//!
//! Each event category keeps its hooks in registration order. Dispatch
//! stops at the first hook that reports the event as consumed, and a
//! consumed event never reaches the overlay or the guest.
//!
//! Dispatch only ever *tries* to take a category's lock. If the lock is
//! held (another thread registering, or a hook re-entering the engine from
//! inside its own callback) the hooks are skipped for that one event and
//! delivery continues as if nobody consumed it. The input path never waits
//! on a hook list.

use std::sync::{Mutex, TryLockError};

use tracing::trace;

/// Keyboard hook: receives the host key code and action ordinal.
pub trait KeyboardHook: Send + Sync {
    fn on_key(&self, key_code: i32, action: i32) -> bool;
}

/// Mouse button hook: receives the cursor position, button and action ordinal.
pub trait MouseButtonHook: Send + Sync {
    fn on_mouse_button(&self, x: f64, y: f64, button: i32, action: i32) -> bool;
}

/// Mouse position hook. `relative` is set for relative (locked cursor) motion.
pub trait MousePositionHook: Send + Sync {
    fn on_mouse_position(&self, x: f64, y: f64, relative: bool) -> bool;
}

/// Mouse scroll hook.
pub trait MouseScrollHook: Send + Sync {
    fn on_mouse_scroll(&self, x: f64, y: f64, dx: f64, dy: f64) -> bool;
}

impl<F> KeyboardHook for F
where
    F: Fn(i32, i32) -> bool + Send + Sync,
{
    #[inline]
    fn on_key(&self, key_code: i32, action: i32) -> bool {
        self(key_code, action)
    }
}

impl<F> MouseButtonHook for F
where
    F: Fn(f64, f64, i32, i32) -> bool + Send + Sync,
{
    #[inline]
    fn on_mouse_button(&self, x: f64, y: f64, button: i32, action: i32) -> bool {
        self(x, y, button, action)
    }
}

impl<F> MousePositionHook for F
where
    F: Fn(f64, f64, bool) -> bool + Send + Sync,
{
    #[inline]
    fn on_mouse_position(&self, x: f64, y: f64, relative: bool) -> bool {
        self(x, y, relative)
    }
}

impl<F> MouseScrollHook for F
where
    F: Fn(f64, f64, f64, f64) -> bool + Send + Sync,
{
    #[inline]
    fn on_mouse_scroll(&self, x: f64, y: f64, dx: f64, dy: f64) -> bool {
        self(x, y, dx, dy)
    }
}

/// Insertion-ordered hook list for one category.
pub struct HookList<H: ?Sized> {
    name: &'static str,
    entries: Mutex<Vec<Box<H>>>,
}

impl<H: ?Sized> HookList<H> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Appends a hook. Blocks until the list is free; never fails.
    pub fn register(&self, hook: Box<H>) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(hook);
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offers an event to each hook in order. Returns true as soon as one
    /// consumes it. Returns false without calling anything when the list is
    /// busy.
    pub fn dispatch(&self, mut call: impl FnMut(&H) -> bool) -> bool {
        let entries = match self.entries.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
            Err(TryLockError::WouldBlock) => {
                trace!(category = self.name, "hook list busy, skipping hooks");
                return false;
            }
        };
        entries.iter().any(|hook| call(&**hook))
    }
}

/// All hook categories of one engine.
pub struct HookRegistry {
    keyboard: HookList<dyn KeyboardHook>,
    mouse_button: HookList<dyn MouseButtonHook>,
    mouse_position: HookList<dyn MousePositionHook>,
    mouse_scroll: HookList<dyn MouseScrollHook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            keyboard: HookList::new("keyboard"),
            mouse_button: HookList::new("mouse_button"),
            mouse_position: HookList::new("mouse_position"),
            mouse_scroll: HookList::new("mouse_scroll"),
        }
    }

    pub fn register_keyboard_hook(&self, hook: impl KeyboardHook + 'static) {
        self.keyboard.register(Box::new(hook));
    }

    pub fn register_mouse_button_hook(&self, hook: impl MouseButtonHook + 'static) {
        self.mouse_button.register(Box::new(hook));
    }

    pub fn register_mouse_position_hook(&self, hook: impl MousePositionHook + 'static) {
        self.mouse_position.register(Box::new(hook));
    }

    pub fn register_mouse_scroll_hook(&self, hook: impl MouseScrollHook + 'static) {
        self.mouse_scroll.register(Box::new(hook));
    }

    #[inline]
    pub fn dispatch_keyboard(&self, key_code: i32, action: i32) -> bool {
        self.keyboard.dispatch(|h| h.on_key(key_code, action))
    }

    #[inline]
    pub fn dispatch_mouse_button(&self, x: f64, y: f64, button: i32, action: i32) -> bool {
        self.mouse_button
            .dispatch(|h| h.on_mouse_button(x, y, button, action))
    }

    #[inline]
    pub fn dispatch_mouse_position(&self, x: f64, y: f64, relative: bool) -> bool {
        self.mouse_position
            .dispatch(|h| h.on_mouse_position(x, y, relative))
    }

    #[inline]
    pub fn dispatch_mouse_scroll(&self, x: f64, y: f64, dx: f64, dy: f64) -> bool {
        self.mouse_scroll
            .dispatch(|h| h.on_mouse_scroll(x, y, dx, dy))
    }

    pub fn keyboard(&self) -> &HookList<dyn KeyboardHook> {
        &self.keyboard
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
