//! Host to guest identifier translation.
//!
//! Pure functions with no state. Host key codes follow the virtual-key
//! numbering of the host window layer; guest codes are the constants in
//! [`crate::event`].

use crate::event::{button, keycode, meta};
use crate::host::KeyMods;

/// Host key code.
///
/// A plain integer so that extra mouse buttons and codes unknown to this
/// crate can travel through hooks and the direct feed unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCode(pub i32);

impl KeyCode {
    pub const BACKSPACE: KeyCode = KeyCode(8);
    pub const TAB: KeyCode = KeyCode(9);
    pub const ENTER: KeyCode = KeyCode(13);
    pub const LEFT_SHIFT: KeyCode = KeyCode(16);
    pub const LEFT_CTRL: KeyCode = KeyCode(17);
    pub const LEFT_ALT: KeyCode = KeyCode(18);
    pub const PAUSE: KeyCode = KeyCode(19);
    pub const CAPS_LOCK: KeyCode = KeyCode(20);
    pub const ESCAPE: KeyCode = KeyCode(27);
    pub const SPACE: KeyCode = KeyCode(32);
    pub const PAGE_UP: KeyCode = KeyCode(33);
    pub const PAGE_DOWN: KeyCode = KeyCode(34);
    pub const END: KeyCode = KeyCode(35);
    pub const HOME: KeyCode = KeyCode(36);
    pub const LEFT: KeyCode = KeyCode(37);
    pub const UP: KeyCode = KeyCode(38);
    pub const RIGHT: KeyCode = KeyCode(39);
    pub const DOWN: KeyCode = KeyCode(40);
    pub const INSERT: KeyCode = KeyCode(45);
    pub const DELETE: KeyCode = KeyCode(46);
    pub const NUM_0: KeyCode = KeyCode(48);
    pub const NUM_9: KeyCode = KeyCode(57);
    pub const A: KeyCode = KeyCode(65);
    pub const C: KeyCode = KeyCode(67);
    pub const Z: KeyCode = KeyCode(90);
    pub const LEFT_SUPER: KeyCode = KeyCode(91);
    pub const RIGHT_SUPER: KeyCode = KeyCode(92);
    pub const MENU: KeyCode = KeyCode(93);
    pub const NUMPAD_0: KeyCode = KeyCode(96);
    pub const NUMPAD_9: KeyCode = KeyCode(105);
    pub const NUMPAD_MULTIPLY: KeyCode = KeyCode(106);
    pub const NUMPAD_ADD: KeyCode = KeyCode(107);
    pub const NUMPAD_SUBTRACT: KeyCode = KeyCode(109);
    pub const NUMPAD_DECIMAL: KeyCode = KeyCode(110);
    pub const NUMPAD_DIVIDE: KeyCode = KeyCode(111);
    pub const FN1: KeyCode = KeyCode(112);
    pub const FN11: KeyCode = KeyCode(122);
    pub const FN12: KeyCode = KeyCode(123);
    pub const NUM_LOCK: KeyCode = KeyCode(144);
    pub const SCROLL_LOCK: KeyCode = KeyCode(145);
    pub const RIGHT_SHIFT: KeyCode = KeyCode(161);
    pub const RIGHT_CTRL: KeyCode = KeyCode(163);
    pub const RIGHT_ALT: KeyCode = KeyCode(165);
    pub const BACK: KeyCode = KeyCode(166);
    pub const SEMICOLON: KeyCode = KeyCode(186);
    pub const EQUAL: KeyCode = KeyCode(187);
    pub const COMMA: KeyCode = KeyCode(188);
    pub const MINUS: KeyCode = KeyCode(189);
    pub const PERIOD: KeyCode = KeyCode(190);
    pub const SLASH: KeyCode = KeyCode(191);
    pub const GRAVE: KeyCode = KeyCode(192);
    pub const LEFT_BRACKET: KeyCode = KeyCode(219);
    pub const BACKSLASH: KeyCode = KeyCode(220);
    pub const RIGHT_BRACKET: KeyCode = KeyCode(221);
    pub const APOSTROPHE: KeyCode = KeyCode(222);
}

/// Host gamepad button slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GamepadButton(pub i32);

impl GamepadButton {
    pub const A: GamepadButton = GamepadButton(0);
    pub const B: GamepadButton = GamepadButton(1);
    pub const X: GamepadButton = GamepadButton(2);
    pub const Y: GamepadButton = GamepadButton(3);
    pub const LB: GamepadButton = GamepadButton(4);
    pub const RB: GamepadButton = GamepadButton(5);
    pub const BACK: GamepadButton = GamepadButton(6);
    pub const START: GamepadButton = GamepadButton(7);
    pub const GUIDE: GamepadButton = GamepadButton(8);
    pub const LEFT_STICK: GamepadButton = GamepadButton(9);
    pub const RIGHT_STICK: GamepadButton = GamepadButton(10);
    pub const DPAD_UP: GamepadButton = GamepadButton(11);
    pub const DPAD_RIGHT: GamepadButton = GamepadButton(12);
    pub const DPAD_DOWN: GamepadButton = GamepadButton(13);
    pub const DPAD_LEFT: GamepadButton = GamepadButton(14);

    /// Number of tracked button slots.
    pub const COUNT: usize = 15;

    #[inline]
    pub fn is_dpad(self) -> bool {
        matches!(
            self,
            GamepadButton::DPAD_UP
                | GamepadButton::DPAD_RIGHT
                | GamepadButton::DPAD_DOWN
                | GamepadButton::DPAD_LEFT
        )
    }

    /// Slot index, `None` when outside the tracked range.
    #[inline]
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok().filter(|&i| i < Self::COUNT)
    }
}

/// Host gamepad axis slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GamepadAxis(pub i32);

impl GamepadAxis {
    pub const LEFT_X: GamepadAxis = GamepadAxis(0);
    pub const LEFT_Y: GamepadAxis = GamepadAxis(1);
    pub const RIGHT_X: GamepadAxis = GamepadAxis(2);
    pub const RIGHT_Y: GamepadAxis = GamepadAxis(3);
    pub const LEFT_TRIGGER: GamepadAxis = GamepadAxis(4);
    pub const RIGHT_TRIGGER: GamepadAxis = GamepadAxis(5);

    /// Number of tracked axis slots.
    pub const COUNT: usize = 6;

    #[inline]
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok().filter(|&i| i < Self::COUNT)
    }
}

/// Maps a host mouse button to its guest button-state bit.
///
/// Returns `None` for buttons delivered as key events instead.
pub fn map_pointer_button(host_button: i32) -> Option<i32> {
    match host_button {
        1 => Some(button::PRIMARY),
        2 => Some(button::SECONDARY),
        3 => Some(button::TERTIARY),
        8 => Some(button::BACK),
        9 => Some(button::FORWARD),
        _ => None,
    }
}

/// Maps a host key code to a guest key code, [`keycode::UNKNOWN`] if unmapped.
pub fn map_key(code: KeyCode) -> i32 {
    if (KeyCode::NUM_0..=KeyCode::NUM_9).contains(&code) {
        return code.0 - KeyCode::NUM_0.0 + keycode::DIGIT_0;
    }
    if (KeyCode::NUMPAD_0..=KeyCode::NUMPAD_9).contains(&code) {
        return code.0 - KeyCode::NUMPAD_0.0 + keycode::NUMPAD_0;
    }
    if (KeyCode::A..=KeyCode::Z).contains(&code) {
        return code.0 - KeyCode::A.0 + keycode::A;
    }
    if (KeyCode::FN1..=KeyCode::FN12).contains(&code) {
        return code.0 - KeyCode::FN1.0 + keycode::F1;
    }
    match code {
        KeyCode::BACK => keycode::BACK,
        KeyCode::BACKSPACE => keycode::DEL,
        KeyCode::TAB => keycode::TAB,
        KeyCode::ENTER => keycode::ENTER,
        KeyCode::LEFT_SHIFT => keycode::SHIFT_LEFT,
        KeyCode::RIGHT_SHIFT => keycode::SHIFT_RIGHT,
        KeyCode::LEFT_CTRL => keycode::CTRL_LEFT,
        KeyCode::RIGHT_CTRL => keycode::CTRL_RIGHT,
        KeyCode::PAUSE => keycode::BREAK,
        KeyCode::CAPS_LOCK => keycode::CAPS_LOCK,
        KeyCode::ESCAPE => keycode::ESCAPE,
        KeyCode::SPACE => keycode::SPACE,
        KeyCode::PAGE_UP => keycode::PAGE_UP,
        KeyCode::PAGE_DOWN => keycode::PAGE_DOWN,
        KeyCode::END => keycode::MOVE_END,
        KeyCode::HOME => keycode::MOVE_HOME,
        KeyCode::LEFT => keycode::DPAD_LEFT,
        KeyCode::UP => keycode::DPAD_UP,
        KeyCode::RIGHT => keycode::DPAD_RIGHT,
        KeyCode::DOWN => keycode::DPAD_DOWN,
        KeyCode::INSERT => keycode::INSERT,
        KeyCode::DELETE => keycode::FORWARD_DEL,
        KeyCode::NUM_LOCK => keycode::NUM_LOCK,
        KeyCode::SCROLL_LOCK => keycode::SCROLL_LOCK,
        KeyCode::SEMICOLON => keycode::SEMICOLON,
        KeyCode::EQUAL => keycode::EQUALS,
        KeyCode::COMMA => keycode::COMMA,
        KeyCode::MINUS => keycode::MINUS,
        KeyCode::NUMPAD_ADD => keycode::NUMPAD_ADD,
        KeyCode::NUMPAD_SUBTRACT => keycode::NUMPAD_SUBTRACT,
        KeyCode::NUMPAD_MULTIPLY => keycode::NUMPAD_MULTIPLY,
        KeyCode::NUMPAD_DIVIDE => keycode::NUMPAD_DIVIDE,
        KeyCode::PERIOD => keycode::PERIOD,
        KeyCode::NUMPAD_DECIMAL => keycode::NUMPAD_DOT,
        KeyCode::SLASH => keycode::SLASH,
        KeyCode::GRAVE => keycode::GRAVE,
        KeyCode::LEFT_BRACKET => keycode::LEFT_BRACKET,
        KeyCode::BACKSLASH => keycode::BACKSLASH,
        KeyCode::RIGHT_BRACKET => keycode::RIGHT_BRACKET,
        KeyCode::APOSTROPHE => keycode::APOSTROPHE,
        KeyCode::MENU => keycode::MENU,
        KeyCode::LEFT_SUPER => keycode::META_LEFT,
        KeyCode::RIGHT_SUPER => keycode::META_RIGHT,
        KeyCode::LEFT_ALT => keycode::ALT_LEFT,
        KeyCode::RIGHT_ALT => keycode::ALT_RIGHT,
        _ => keycode::UNKNOWN,
    }
}

/// Maps a gamepad button to a guest key code.
///
/// `None` means the button has no key form and only contributes to the
/// composite axis event.
pub fn map_gamepad_button(btn: GamepadButton) -> Option<i32> {
    let code = match btn {
        GamepadButton::A => keycode::BUTTON_A,
        GamepadButton::B => keycode::BUTTON_B,
        GamepadButton::X => keycode::BUTTON_X,
        GamepadButton::Y => keycode::BUTTON_Y,
        GamepadButton::LB => keycode::BUTTON_L1,
        GamepadButton::RB => keycode::BUTTON_R1,
        GamepadButton::BACK => keycode::BUTTON_SELECT,
        GamepadButton::START => keycode::BUTTON_START,
        GamepadButton::GUIDE => keycode::BUTTON_MODE,
        GamepadButton::LEFT_STICK => keycode::BUTTON_THUMBL,
        GamepadButton::RIGHT_STICK => keycode::BUTTON_THUMBR,
        GamepadButton::DPAD_UP => keycode::DPAD_UP,
        GamepadButton::DPAD_RIGHT => keycode::DPAD_RIGHT,
        GamepadButton::DPAD_DOWN => keycode::DPAD_DOWN,
        GamepadButton::DPAD_LEFT => keycode::DPAD_LEFT,
        _ => return None,
    };
    Some(code)
}

/// Converts host modifier bits to the guest meta state.
pub fn meta_state(mods: KeyMods) -> i32 {
    let mut state = 0;
    if mods.contains(KeyMods::SHIFT) {
        state |= meta::SHIFT_ON;
    }
    if mods.contains(KeyMods::ALT) {
        state |= meta::ALT_ON;
    }
    if mods.contains(KeyMods::CTRL) {
        state |= meta::CTRL_ON;
    }
    if mods.contains(KeyMods::SUPER) {
        state |= meta::META_ON;
    }
    if mods.contains(KeyMods::CAPS_LOCK) {
        state |= meta::CAPS_LOCK_ON;
    }
    if mods.contains(KeyMods::NUM_LOCK) {
        state |= meta::NUM_LOCK_ON;
    }
    state
}

/// Moves a host Y coordinate below the reserved top strip.
#[inline(always)]
pub fn adjust_y(y: f64, strip_height: i32) -> f32 {
    (y - f64::from(strip_height)) as f32
}

/// Quantizes a scroll delta to the signed 8-bit wheel value the guest expects.
#[inline]
pub fn quantize_scroll(delta: f64) -> i8 {
    (delta * 127.0).clamp(-127.0, 127.0) as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_buttons() {
        assert_eq!(map_pointer_button(1), Some(button::PRIMARY));
        assert_eq!(map_pointer_button(2), Some(button::SECONDARY));
        assert_eq!(map_pointer_button(3), Some(button::TERTIARY));
        assert_eq!(map_pointer_button(8), Some(button::BACK));
        assert_eq!(map_pointer_button(9), Some(button::FORWARD));
        assert_eq!(map_pointer_button(4), None);
        assert_eq!(map_pointer_button(0), None);
    }

    #[test]
    fn test_table_keys() {
        assert_eq!(map_key(KeyCode::BACKSPACE), keycode::DEL);
        assert_eq!(map_key(KeyCode::DELETE), keycode::FORWARD_DEL);
        assert_eq!(map_key(KeyCode::END), keycode::MOVE_END);
        assert_eq!(map_key(KeyCode::NUMPAD_DECIMAL), keycode::NUMPAD_DOT);
        assert_eq!(map_key(KeyCode::RIGHT_ALT), keycode::ALT_RIGHT);
    }

    #[test]
    fn test_unmapped_key_is_unknown() {
        assert_eq!(map_key(KeyCode(5)), keycode::UNKNOWN);
        assert_eq!(map_key(KeyCode(-1)), keycode::UNKNOWN);
        assert_eq!(map_key(KeyCode(4000)), keycode::UNKNOWN);
    }

    #[test]
    fn test_gamepad_buttons() {
        assert_eq!(map_gamepad_button(GamepadButton::A), Some(keycode::BUTTON_A));
        assert_eq!(map_gamepad_button(GamepadButton::GUIDE), Some(keycode::BUTTON_MODE));
        assert_eq!(map_gamepad_button(GamepadButton::DPAD_LEFT), Some(keycode::DPAD_LEFT));
        assert_eq!(map_gamepad_button(GamepadButton(15)), None);
        assert_eq!(map_gamepad_button(GamepadButton(-1)), None);
    }

    #[test]
    fn test_button_index_range() {
        assert_eq!(GamepadButton::A.index(), Some(0));
        assert_eq!(GamepadButton::DPAD_LEFT.index(), Some(14));
        assert_eq!(GamepadButton(15).index(), None);
        assert_eq!(GamepadButton(-3).index(), None);
        assert_eq!(GamepadAxis::RIGHT_TRIGGER.index(), Some(5));
        assert_eq!(GamepadAxis(6).index(), None);
    }

    #[test]
    fn test_meta_state() {
        assert_eq!(meta_state(KeyMods::NONE), 0);
        assert_eq!(
            meta_state(KeyMods::SHIFT | KeyMods::CTRL),
            meta::SHIFT_ON | meta::CTRL_ON
        );
        assert_eq!(
            meta_state(KeyMods::CAPS_LOCK | KeyMods::NUM_LOCK | KeyMods::SUPER | KeyMods::ALT),
            meta::CAPS_LOCK_ON | meta::NUM_LOCK_ON | meta::META_ON | meta::ALT_ON
        );
    }

    #[test]
    fn test_adjust_y_and_scroll() {
        assert_eq!(adjust_y(100.0, 25), 75.0);
        assert_eq!(adjust_y(10.0, 0), 10.0);
        assert_eq!(quantize_scroll(1.0), 127);
        assert_eq!(quantize_scroll(-3.0), -127);
        assert_eq!(quantize_scroll(0.5), 63);
    }
}
