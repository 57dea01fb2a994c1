//! Interfaces of the collaborators around the input engine.
//!
//! The host window layer, the settings store and the guest adapter live
//! outside this crate. The engine only talks to them through these traits.

use crate::codec::activity::{ActivityKeyEvent, ActivityMotionEvent};

/// Host keyboard action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum KeyAction {
    Press = 0,
    Repeat = 1,
    Release = 2,
}

impl KeyAction {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyAction::Press),
            1 => Some(KeyAction::Repeat),
            2 => Some(KeyAction::Release),
            _ => None,
        }
    }
}

/// Host mouse button action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ButtonAction {
    Press = 0,
    Release = 1,
}

/// Host keyboard modifier bits, as reported with key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyMods(pub u32);

impl KeyMods {
    pub const NONE: KeyMods = KeyMods(0);
    pub const SHIFT: KeyMods = KeyMods(1 << 0);
    pub const CTRL: KeyMods = KeyMods(1 << 1);
    pub const ALT: KeyMods = KeyMods(1 << 2);
    pub const SUPER: KeyMods = KeyMods(1 << 3);
    pub const CAPS_LOCK: KeyMods = KeyMods(1 << 4);
    pub const NUM_LOCK: KeyMods = KeyMods(1 << 5);

    #[inline(always)]
    pub fn contains(self, other: KeyMods) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

impl std::ops::BitOr for KeyMods {
    type Output = KeyMods;

    fn bitor(self, rhs: KeyMods) -> KeyMods {
        KeyMods(self.0 | rhs.0)
    }
}

/// Host window facilities used by the engine.
pub trait HostWindow: Send + Sync {
    fn set_cursor_disabled(&self, disabled: bool);
    fn cursor_disabled(&self) -> bool;
    fn set_fullscreen(&self, fullscreen: bool);
    fn set_clipboard_text(&self, text: &str);
    fn start_text_input(&self);
    fn stop_text_input(&self);
    /// Current window size in host pixels.
    fn window_size(&self) -> (i32, i32);
}

/// Externally persisted launcher settings.
pub trait SettingsStore: Send + Sync {
    fn fullscreen(&self) -> bool;
    fn set_fullscreen(&self, fullscreen: bool);
    /// Height of the reserved UI strip at the top of the window.
    fn menubar_size(&self) -> i32;
    fn set_clipboard(&self, text: &str);
    /// Replays pastes one frame late so that guest text fields that grab
    /// focus on the paste shortcut still receive the text.
    fn paste_patch_enabled(&self) -> bool;
    fn save(&self);
}

/// Text entry state owned by the guest.
pub trait TextInputHandler: Send + Sync {
    fn on_key_pressed(&self, key_code: i32, action: KeyAction, mods: KeyMods);
    fn on_text_input(&self, text: &str);
    /// Currently selected text in the focused field, empty if none.
    fn copy_text(&self) -> String;
    fn is_multiline(&self) -> bool;
    fn cursor_position(&self) -> i32;
    fn set_cursor_position(&self, position: i32);
}

/// Direct memory-mapped input feed exposed by some guest generations.
pub trait DirectFeed: Send + Sync {
    /// Mouse feed: button 0 is motion only, 1..=3 pointer buttons, 4 wheel.
    fn mouse_feed(&self, button: i8, state: i8, x: i16, y: i16, dx: i16, dy: i16);
    /// Keyboard state table write. Returns false when the guest has no
    /// direct keyboard path, in which case the key goes through the
    /// regular delivery protocol.
    fn keyboard_feed(&self, key: u8, pressed: bool, mods: KeyMods) -> bool;
}

/// The loaded guest binary as seen by the input engine.
pub trait GuestAdapter: Send + Sync {
    /// Selects the callback-based activity protocol instead of the queue.
    /// Fixed for the lifetime of the process.
    fn is_activity_protocol(&self) -> bool;
    fn send_key_down(&self, event: &ActivityKeyEvent);
    fn send_key_up(&self, event: &ActivityKeyEvent);
    fn send_motion_event(&self, event: &ActivityMotionEvent);
    fn set_game_controller_connected(&self, id: i32, connected: bool);
    fn on_window_resized(&self, width: i32, height: i32);
    fn on_window_closed(&self);
    fn on_return_key_pressed(&self);
    fn import_file(&self, path: &str);
    fn text_input(&self) -> &dyn TextInputHandler;
    fn direct_feed(&self) -> Option<&dyn DirectFeed> {
        None
    }
}

/// Debug overlay drawn on top of the guest.
///
/// Receives raw host coordinates; the reserved strip is part of its space.
pub trait Overlay: Send + Sync {
    fn add_mouse_pos(&self, x: f32, y: f32);
    /// `button` is 0 for primary, 1 secondary, 2 tertiary.
    fn add_mouse_button(&self, button: usize, down: bool);
    fn add_mouse_wheel(&self, dx: f32, dy: f32);
    fn add_key(&self, key_code: i32, down: bool);
    fn add_text(&self, text: &str);
    fn wants_capture_mouse(&self) -> bool;
    fn wants_capture_keyboard(&self) -> bool;
    fn wants_text_input(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mods_contains() {
        let mods = KeyMods::SHIFT | KeyMods::CTRL;
        assert!(mods.contains(KeyMods::SHIFT));
        assert!(mods.contains(KeyMods::CTRL));
        assert!(!mods.contains(KeyMods::ALT));
        assert!(!mods.contains(KeyMods::NONE));
    }

    #[test]
    fn test_key_action_from_i32() {
        assert_eq!(KeyAction::from_i32(0), Some(KeyAction::Press));
        assert_eq!(KeyAction::from_i32(2), Some(KeyAction::Release));
        assert_eq!(KeyAction::from_i32(7), None);
    }
}
