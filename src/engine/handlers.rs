//! Host input entry points.
//!
//! Every pointer, key and touch handler follows the same pipeline: mode
//! arbitration, plugin hooks, the overlay, then translation and delivery.
//! A stage that claims the event ends processing.

use std::sync::atomic::Ordering;

use tracing::{debug, trace};

use crate::error::InputError;
use crate::event::{KeyEvent, MotionEvent, motion_action, source};
use crate::gamepad::ButtonChange;
use crate::host::{ButtonAction, KeyAction, KeyMods};
use crate::mode::InputMode;
use crate::translate::{
    GamepadAxis, GamepadButton, KeyCode, adjust_y, map_gamepad_button, map_key,
    map_pointer_button, meta_state, quantize_scroll,
};
use crate::util::{likely, unlikely};

use super::{DELAYED_PASTE_FRAMES, InputEngine};

/// Relative motion beyond this many units per report may take over the mode.
const RELATIVE_ESCALATION_THRESHOLD: f64 = 10.0;
/// Gamepad axis magnitude above which a report may take over the mode.
const AXIS_ESCALATION_THRESHOLD: f32 = 0.4;

/// Direct-feed button id carrying wheel motion.
const FEED_WHEEL: i8 = 4;

impl InputEngine {
    pub fn on_mouse_button(&self, x: f64, y: f64, btn: i32, action: ButtonAction) {
        if !self.admit(InputMode::Mouse, true) {
            return;
        }
        if self.hooks.dispatch_mouse_button(x, y, btn, action as i32) {
            return;
        }
        if unlikely(btn < 1) {
            return;
        }
        let pressed = action == ButtonAction::Press;
        if self.overlay.mouse_button(&*self.window, btn, pressed) {
            return;
        }

        let gy = adjust_y(y, self.strip_height());
        if self.emulate_touch {
            let act = if pressed {
                motion_action::DOWN
            } else {
                motion_action::UP
            };
            self.deliver(MotionEvent::touch(0, act, x as f32, gy));
            return;
        }

        let Some(bit) = map_pointer_button(btn) else {
            let key_action = if pressed {
                KeyAction::Press
            } else {
                KeyAction::Release
            };
            self.on_keyboard(KeyCode(btn), key_action, KeyMods::NONE);
            return;
        };

        if let Some(feed) = self.guest.direct_feed() {
            feed.mouse_feed(btn as i8, pressed as i8, x as i16, gy as i16, 0, 0);
            return;
        }

        let (state, act) = if pressed {
            (
                self.button_state.fetch_or(bit, Ordering::AcqRel) | bit,
                motion_action::BUTTON_PRESS,
            )
        } else {
            (
                self.button_state.fetch_and(!bit, Ordering::AcqRel) & !bit,
                motion_action::BUTTON_RELEASE,
            )
        };
        self.deliver(MotionEvent::mouse(source::MOUSE, act, state, x as f32, gy, 0.0));
    }

    pub fn on_mouse_position(&self, x: f64, y: f64) {
        if !self.admit(InputMode::Mouse, true) {
            return;
        }
        if self.hooks.dispatch_mouse_position(x, y, false) {
            return;
        }
        if self.overlay.mouse_position(&*self.window, x, y) {
            return;
        }

        let gy = adjust_y(y, self.strip_height());
        if self.emulate_touch {
            self.deliver(MotionEvent::touch(0, motion_action::MOVE, x as f32, gy));
            return;
        }
        if let Some(feed) = self.guest.direct_feed() {
            feed.mouse_feed(0, 0, x as i16, gy as i16, 0, 0);
            return;
        }
        let state = self.button_state.load(Ordering::Acquire);
        self.deliver(MotionEvent::mouse(
            source::MOUSE,
            motion_action::HOVER_MOVE,
            state,
            x as f32,
            gy,
            0.0,
        ));
    }

    /// Relative motion while the cursor is locked. Small deltas never take
    /// the mode away from another device.
    pub fn on_mouse_relative_position(&self, dx: f64, dy: f64) {
        let escalate =
            dx.abs() > RELATIVE_ESCALATION_THRESHOLD || dy.abs() > RELATIVE_ESCALATION_THRESHOLD;
        if !self.admit(InputMode::Mouse, escalate) {
            return;
        }
        if self.hooks.dispatch_mouse_position(dx, dy, true) {
            return;
        }
        if let Some(feed) = self.guest.direct_feed() {
            feed.mouse_feed(0, 0, 0, 0, dx as i16, dy as i16);
            return;
        }
        let state = self.button_state.load(Ordering::Acquire);
        self.deliver(MotionEvent::mouse(
            source::MOUSE_RELATIVE,
            motion_action::HOVER_MOVE,
            state,
            dx as f32,
            dy as f32,
            0.0,
        ));
    }

    pub fn on_mouse_scroll(&self, x: f64, y: f64, dx: f64, dy: f64) {
        if !self.admit(InputMode::Mouse, true) {
            return;
        }
        if self.hooks.dispatch_mouse_scroll(x, y, dx, dy) {
            return;
        }
        if self.overlay.mouse_scroll(&*self.window, dx, dy) {
            return;
        }

        let wheel = quantize_scroll(dy);
        let gy = adjust_y(y, self.strip_height());
        if let Some(feed) = self.guest.direct_feed() {
            feed.mouse_feed(FEED_WHEEL, wheel, 0, 0, x as i16, gy as i16);
            return;
        }
        let state = self.button_state.load(Ordering::Acquire);
        self.deliver(MotionEvent::mouse(
            source::MOUSE,
            motion_action::SCROLL,
            state,
            x as f32,
            gy,
            f32::from(wheel),
        ));
    }

    pub fn on_touch_start(&self, id: i32, x: f64, y: f64) {
        if !self.admit(InputMode::Touch, true) {
            return;
        }
        if self.overlay.touch_start(id, x, y) {
            return;
        }
        let gy = adjust_y(y, self.strip_height());
        self.deliver(MotionEvent::touch(id, motion_action::DOWN, x as f32, gy));
    }

    pub fn on_touch_update(&self, id: i32, x: f64, y: f64) {
        if !self.admit(InputMode::Touch, true) {
            return;
        }
        if self.overlay.touch_update(id, x, y) {
            return;
        }
        let gy = adjust_y(y, self.strip_height());
        self.deliver(MotionEvent::touch(id, motion_action::MOVE, x as f32, gy));
    }

    pub fn on_touch_end(&self, id: i32, x: f64, y: f64) {
        if !self.admit(InputMode::Touch, true) {
            return;
        }
        if self.overlay.touch_end(id, x, y) {
            return;
        }
        let gy = adjust_y(y, self.strip_height());
        self.deliver(MotionEvent::touch(id, motion_action::UP, x as f32, gy));
    }

    /// Host keyboard key. Repeats reach hooks, the overlay and the guest's
    /// text handler but produce no guest key event.
    pub fn on_keyboard(&self, key: KeyCode, action: KeyAction, mods: KeyMods) {
        if !self.admit(InputMode::Mouse, true) {
            return;
        }
        if self.hooks.dispatch_keyboard(key.0, action as i32) {
            return;
        }
        let pressed = action != KeyAction::Release;
        if self.overlay.key(&*self.window, key.0, pressed) {
            return;
        }

        let text = self.guest.text_input();
        let copied = if pressed && key == KeyCode::C && mods.contains(KeyMods::CTRL) {
            let selection = text.copy_text();
            if selection.is_empty() {
                false
            } else {
                self.window.set_clipboard_text(&selection);
                true
            }
        } else {
            false
        };
        if !copied {
            text.on_key_pressed(key.0, action, mods);
        }

        if key == KeyCode::FN11 && action == KeyAction::Press {
            self.set_fullscreen(!self.settings.fullscreen());
        }

        if action == KeyAction::Repeat {
            return;
        }
        if let Some(feed) = self.guest.direct_feed()
            && feed.keyboard_feed((key.0 & 0xff) as u8, pressed, mods)
        {
            return;
        }
        self.deliver(KeyEvent::keyboard(pressed, map_key(key), meta_state(mods)));
    }

    /// Committed text from the host's text input.
    pub fn on_keyboard_text(&self, text: &str) {
        if self.overlay.text(text) {
            return;
        }
        let handler = self.guest.text_input();
        if text == "\n" && !handler.is_multiline() {
            self.guest.on_return_key_pressed();
        } else {
            handler.on_text_input(text);
        }
    }

    pub fn on_paste(&self, text: &str) {
        self.settings.set_clipboard(text);
        if self.settings.paste_patch_enabled() {
            let mut last = self.last_paste();
            last.clear();
            last.push_str(text);
        }
        self.guest.text_input().on_text_input(text);
    }

    /// Arms a replay of the last paste two frames from now.
    ///
    /// Called when the guest moves focus into a text field in response to
    /// the paste shortcut, so the text lands in the newly focused field.
    pub fn set_delayed_paste(&self) {
        self.delayed_paste
            .store(DELAYED_PASTE_FRAMES, Ordering::Release);
    }

    pub fn on_drop(&self, path: &str) {
        debug!(path, "file dropped");
        self.guest.import_file(path);
    }

    pub fn on_gamepad_state(&self, id: i32, connected: bool) {
        if connected {
            self.gamepads.connect(id);
        } else {
            self.gamepads.disconnect(id);
        }
        if self.arbiter.is_sending() {
            self.guest.set_game_controller_connected(id, connected);
        }
    }

    pub fn on_gamepad_button(
        &self,
        id: i32,
        btn: GamepadButton,
        pressed: bool,
    ) -> Result<(), InputError> {
        if !self.admit(InputMode::Gamepad, true) {
            return Ok(());
        }
        match self.gamepads.set_button(id, btn, pressed)? {
            ButtonChange::Unknown => trace!(id, "button report for unknown gamepad"),
            ButtonChange::Unchanged | ButtonChange::Dpad => {}
            ButtonChange::Discrete => {
                if let Some(code) = map_gamepad_button(btn) {
                    self.deliver(KeyEvent::gamepad(id, pressed, code));
                }
            }
        }
        Ok(())
    }

    pub fn on_gamepad_axis(&self, id: i32, axis: GamepadAxis, value: f32) -> Result<(), InputError> {
        if !self.admit(InputMode::Gamepad, value.abs() > AXIS_ESCALATION_THRESHOLD) {
            return Ok(());
        }
        if !self.gamepads.set_axis(id, axis, value)? {
            trace!(id, "axis report for unknown gamepad");
        }
        Ok(())
    }

    /// Delivers the pending composite axis event of one gamepad, if any.
    /// Returns true when an event was sent.
    pub fn flush_pending_axis_event(&self, id: i32) -> bool {
        match self.gamepads.take_composite(id) {
            Some(event) => {
                self.deliver(event);
                true
            }
            None => false,
        }
    }

    /// Guest frame tick.
    ///
    /// The first call opens event delivery and announces connected
    /// gamepads. Every call re-applies a changed strip height, advances a
    /// delayed paste and flushes pending gamepad axis events.
    pub fn start_send_events(&self) {
        if unlikely(self.arbiter.enable_sending()) {
            debug!("guest ready, event delivery enabled");
            for id in self.gamepads.connected_ids() {
                self.guest.set_game_controller_connected(id, true);
            }
        }

        let strip = self.strip_height();
        if unlikely(self.applied_menubar_size.swap(strip, Ordering::AcqRel) != strip) {
            let (w, h) = self.window.window_size();
            self.on_window_resized(w, h);
        }

        let remaining = self.delayed_paste.load(Ordering::Acquire);
        if unlikely(remaining > 0)
            && self
                .delayed_paste
                .compare_exchange(remaining, remaining - 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            && remaining == 1
        {
            let text = self.last_paste().clone();
            trace!(len = text.len(), "replaying delayed paste");
            let handler = self.guest.text_input();
            handler.on_text_input("\x08");
            handler.on_text_input(&text);
        }

        for id in self.gamepads.connected_ids() {
            self.flush_pending_axis_event(id);
        }
    }

    pub fn set_cursor_locked(&self, locked: bool) {
        self.cursor_locked.store(locked, Ordering::Release);
        if self.admit(InputMode::Mouse, false) {
            self.window.set_cursor_disabled(locked);
        }
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        if likely(self.settings.fullscreen() == fullscreen) {
            return;
        }
        self.window.set_fullscreen(fullscreen);
        self.settings.set_fullscreen(fullscreen);
        self.settings.save();
    }

    pub fn on_window_resized(&self, width: i32, height: i32) {
        self.guest
            .on_window_resized(width, height - self.strip_height());
    }

    pub fn on_close(&self) {
        self.guest.on_window_closed();
    }
}
