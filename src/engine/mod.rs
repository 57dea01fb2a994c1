//! Input engine context.
//!
//! [`InputEngine`] owns the mode arbiter, hook registry, gamepad tracker,
//! overlay gate and dispatcher, and exposes the entry points the host
//! window layer calls. Construct one per guest and share it with `Arc`.

pub mod handlers;

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, trace};

use crate::codec::InputQueue;
use crate::config::EngineConfig;
use crate::dispatch::{self, EventDispatcher};
use crate::event::GuestEvent;
use crate::gamepad::GamepadTracker;
use crate::hooks::{HookRegistry, KeyboardHook, MouseButtonHook, MousePositionHook, MouseScrollHook};
use crate::host::{GuestAdapter, HostWindow, Overlay, SettingsStore};
use crate::mode::{InputMode, ModeArbiter, Resolution};
use crate::overlay::OverlayGate;

/// Frames between arming a delayed paste and replaying it.
pub const DELAYED_PASTE_FRAMES: u32 = 2;

/// External collaborators of an engine.
pub struct Collaborators {
    pub window: Arc<dyn HostWindow>,
    pub settings: Arc<dyn SettingsStore>,
    pub guest: Arc<dyn GuestAdapter>,
    pub overlay: Option<Arc<dyn Overlay>>,
}

pub struct InputEngine {
    arbiter: ModeArbiter,
    hooks: HookRegistry,
    gamepads: GamepadTracker,
    overlay: OverlayGate,
    dispatcher: Arc<dyn EventDispatcher>,
    queue: Option<InputQueue>,
    window: Arc<dyn HostWindow>,
    settings: Arc<dyn SettingsStore>,
    guest: Arc<dyn GuestAdapter>,
    emulate_touch: bool,
    /// Pointer buttons currently held, as guest button-state bits.
    button_state: AtomicI32,
    cursor_locked: AtomicBool,
    /// Strip height the guest was last told about.
    applied_menubar_size: AtomicI32,
    delayed_paste: AtomicU32,
    last_paste: Mutex<String>,
}

impl InputEngine {
    /// Creates an engine. The delivery protocol is chosen here from the
    /// guest's capability flag and stays fixed.
    pub fn new(config: &EngineConfig, parts: Collaborators) -> Self {
        let (dispatcher, queue) = dispatch::for_guest(&parts.guest);
        Self::with_dispatcher(config, parts, dispatcher, queue)
    }

    /// Creates an engine delivering through a caller-supplied dispatcher.
    pub fn with_dispatcher(
        config: &EngineConfig,
        parts: Collaborators,
        dispatcher: Arc<dyn EventDispatcher>,
        queue: Option<InputQueue>,
    ) -> Self {
        let policy = config.arbiter_policy();
        debug!(
            raw_input = policy.raw_input,
            forced_mode = ?policy.forced_mode,
            switch_delay_ms = policy.switch_delay.as_millis() as u64,
            activity_protocol = queue.is_none(),
            "input engine created"
        );
        Self {
            arbiter: ModeArbiter::new(policy),
            hooks: HookRegistry::new(),
            gamepads: GamepadTracker::new(),
            overlay: OverlayGate::new(parts.overlay),
            dispatcher,
            queue,
            window: parts.window,
            settings: parts.settings,
            guest: parts.guest,
            emulate_touch: config.emulate_touch,
            button_state: AtomicI32::new(0),
            cursor_locked: AtomicBool::new(false),
            applied_menubar_size: AtomicI32::new(0),
            delayed_paste: AtomicU32::new(0),
            last_paste: Mutex::new(String::new()),
        }
    }

    /// Currently active input mode.
    #[inline]
    pub fn input_mode(&self) -> InputMode {
        self.arbiter.mode()
    }

    #[inline]
    pub fn is_mouse_locked(&self) -> bool {
        self.cursor_locked.load(Ordering::Acquire)
    }

    /// Whether the guest is ready to receive events.
    #[inline]
    pub fn is_sending(&self) -> bool {
        self.arbiter.is_sending()
    }

    /// Queue polled by the guest, `None` for the activity protocol.
    pub fn queue(&self) -> Option<&InputQueue> {
        self.queue.as_ref()
    }

    pub fn arbiter(&self) -> &ModeArbiter {
        &self.arbiter
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn gamepads(&self) -> &GamepadTracker {
        &self.gamepads
    }

    pub fn register_keyboard_hook(&self, hook: impl KeyboardHook + 'static) {
        self.hooks.register_keyboard_hook(hook);
    }

    pub fn register_mouse_button_hook(&self, hook: impl MouseButtonHook + 'static) {
        self.hooks.register_mouse_button_hook(hook);
    }

    pub fn register_mouse_position_hook(&self, hook: impl MousePositionHook + 'static) {
        self.hooks.register_mouse_position_hook(hook);
    }

    pub fn register_mouse_scroll_hook(&self, hook: impl MouseScrollHook + 'static) {
        self.hooks.register_mouse_scroll_hook(hook);
    }

    /// Runs arbitration for `want` and applies the cursor side effect of a
    /// mode change.
    pub(crate) fn admit(&self, want: InputMode, escalate: bool) -> bool {
        let resolution = self.arbiter.resolve(want, escalate);
        if let Resolution::Switched { to, .. } = resolution {
            self.apply_cursor_for(to);
        }
        if !resolution.is_admitted() {
            trace!(?want, escalate, "input rejected by mode arbiter");
        }
        resolution.is_admitted()
    }

    fn apply_cursor_for(&self, mode: InputMode) {
        if mode == InputMode::Mouse {
            self.window.set_cursor_disabled(self.is_mouse_locked());
        } else {
            self.window.set_cursor_disabled(true);
        }
    }

    #[inline]
    pub(crate) fn deliver(&self, event: impl Into<GuestEvent>) {
        self.dispatcher.dispatch(event.into());
    }

    #[inline]
    pub(crate) fn strip_height(&self) -> i32 {
        self.settings.menubar_size()
    }

    fn last_paste(&self) -> std::sync::MutexGuard<'_, String> {
        self.last_paste.lock().unwrap_or_else(|e| e.into_inner())
    }
}
