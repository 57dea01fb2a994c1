//! Debug overlay capture gate.
//!
//! The overlay always sees pointer and keyboard input. Whether an event
//! then stops at the overlay depends on what the overlay asks for. Mouse
//! capture counts only while the host cursor is visible, except for the
//! touch the overlay claims as its pointer. Key capture also covers an
//! active text field. The gate starts and stops host text input when the
//! overlay's text-entry intent flips.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use tracing::trace;

use crate::host::{HostWindow, Overlay};

const NO_TOUCH: i32 = -1;

/// Routes host input through an optional overlay.
pub struct OverlayGate {
    overlay: Option<Arc<dyn Overlay>>,
    text_input_active: AtomicBool,
    touch_id: AtomicI32,
    /// Whether the claimed touch started while the overlay wanted the mouse.
    touch_absorbed: AtomicBool,
}

impl OverlayGate {
    pub fn new(overlay: Option<Arc<dyn Overlay>>) -> Self {
        Self {
            overlay,
            text_input_active: AtomicBool::new(false),
            touch_id: AtomicI32::new(NO_TOUCH),
            touch_absorbed: AtomicBool::new(false),
        }
    }

    #[inline]
    fn captures_mouse(overlay: &dyn Overlay, window: &dyn HostWindow) -> bool {
        overlay.wants_capture_mouse() && !window.cursor_disabled()
    }

    #[inline]
    fn captures_keyboard(overlay: &dyn Overlay) -> bool {
        overlay.wants_capture_keyboard() || overlay.wants_text_input()
    }

    /// Offers a host mouse button. Returns true when the overlay absorbed it.
    ///
    /// Only buttons 1 to 3 exist for the overlay; others always pass.
    pub fn mouse_button(&self, window: &dyn HostWindow, host_button: i32, down: bool) -> bool {
        let Some(overlay) = self.overlay.as_deref() else {
            return false;
        };
        if !(1..=3).contains(&host_button) {
            return false;
        }
        overlay.add_mouse_button((host_button - 1) as usize, down);
        self.sync_text_input(window);
        let absorbed = Self::captures_mouse(overlay, window);
        if absorbed {
            trace!(host_button, down, "mouse button captured by overlay");
        }
        absorbed
    }

    /// Offers an absolute pointer position in raw host coordinates.
    pub fn mouse_position(&self, window: &dyn HostWindow, x: f64, y: f64) -> bool {
        let Some(overlay) = self.overlay.as_deref() else {
            return false;
        };
        overlay.add_mouse_pos(x as f32, y as f32);
        Self::captures_mouse(overlay, window)
    }

    pub fn mouse_scroll(&self, window: &dyn HostWindow, dx: f64, dy: f64) -> bool {
        let Some(overlay) = self.overlay.as_deref() else {
            return false;
        };
        overlay.add_mouse_wheel(dx as f32, dy as f32);
        Self::captures_mouse(overlay, window)
    }

    /// Offers a key press or release and syncs host text input afterwards.
    pub fn key(&self, window: &dyn HostWindow, key_code: i32, down: bool) -> bool {
        let Some(overlay) = self.overlay.as_deref() else {
            return false;
        };
        overlay.add_key(key_code, down);
        let absorbed = Self::captures_keyboard(overlay);
        self.sync_text_input(window);
        absorbed
    }

    /// Offers committed text. Only explicit keyboard capture absorbs it.
    pub fn text(&self, text: &str) -> bool {
        let Some(overlay) = self.overlay.as_deref() else {
            return false;
        };
        overlay.add_text(text);
        overlay.wants_capture_keyboard()
    }

    /// Claims the touch as the overlay's pointer when no other touch is
    /// claimed. A claimed touch always feeds the overlay; it is absorbed
    /// only when the overlay wants the mouse at the moment it starts.
    pub fn touch_start(&self, id: i32, x: f64, y: f64) -> bool {
        let Some(overlay) = self.overlay.as_deref() else {
            return false;
        };
        if id == NO_TOUCH
            || self
                .touch_id
                .compare_exchange(NO_TOUCH, id, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return false;
        }
        overlay.add_mouse_pos(x as f32, y as f32);
        overlay.add_mouse_button(0, true);
        let absorbed = overlay.wants_capture_mouse();
        self.touch_absorbed.store(absorbed, Ordering::Release);
        trace!(id, absorbed, "touch claimed by overlay");
        absorbed
    }

    pub fn touch_update(&self, id: i32, x: f64, y: f64) -> bool {
        let Some(overlay) = self.overlay.as_deref() else {
            return false;
        };
        if id == NO_TOUCH || self.touch_id.load(Ordering::Acquire) != id {
            return false;
        }
        overlay.add_mouse_pos(x as f32, y as f32);
        self.touch_absorbed.load(Ordering::Acquire)
    }

    pub fn touch_end(&self, id: i32, x: f64, y: f64) -> bool {
        let Some(overlay) = self.overlay.as_deref() else {
            return false;
        };
        if id == NO_TOUCH
            || self
                .touch_id
                .compare_exchange(id, NO_TOUCH, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return false;
        }
        overlay.add_mouse_pos(x as f32, y as f32);
        overlay.add_mouse_button(0, false);
        self.touch_absorbed.swap(false, Ordering::AcqRel)
    }

    /// Starts or stops host text input when the overlay's wish changed.
    pub fn sync_text_input(&self, window: &dyn HostWindow) {
        let Some(overlay) = self.overlay.as_deref() else {
            return;
        };
        let wants = overlay.wants_text_input();
        if self.text_input_active.swap(wants, Ordering::AcqRel) == wants {
            return;
        }
        trace!(wants, "overlay text input toggled");
        if wants {
            window.start_text_input();
        } else {
            window.stop_text_input();
        }
    }

    /// Id of the touch currently owned by the overlay.
    pub fn claimed_touch(&self) -> Option<i32> {
        match self.touch_id.load(Ordering::Acquire) {
            NO_TOUCH => None,
            id => Some(id),
        }
    }
}

impl Default for OverlayGate {
    fn default() -> Self {
        Self::new(None)
    }
}
