//! Protocol-independent guest events and the guest input ABI constants.
//!
//! A [`GuestEvent`] describes what the guest should see. It never depends
//! on which delivery protocol is active; the encoders in [`crate::codec`]
//! turn it into the record layout a given guest generation expects.

use smallvec::SmallVec;

/// Input source classes.
pub mod source {
    pub const KEYBOARD: i32 = 0x0000_0101;
    pub const GAMEPAD: i32 = 0x0000_0401;
    pub const TOUCHSCREEN: i32 = 0x0000_1002;
    pub const MOUSE: i32 = 0x0000_2002;
    pub const MOUSE_RELATIVE: i32 = 0x0002_0004;
}

/// Key event actions.
pub mod key_action {
    pub const DOWN: i32 = 0;
    pub const UP: i32 = 1;
}

/// Motion event actions.
pub mod motion_action {
    pub const DOWN: i32 = 0;
    pub const UP: i32 = 1;
    pub const MOVE: i32 = 2;
    pub const HOVER_MOVE: i32 = 7;
    pub const SCROLL: i32 = 8;
    pub const BUTTON_PRESS: i32 = 11;
    pub const BUTTON_RELEASE: i32 = 12;
}

/// Pointer button state bits.
pub mod button {
    pub const PRIMARY: i32 = 1 << 0;
    pub const SECONDARY: i32 = 1 << 1;
    pub const TERTIARY: i32 = 1 << 2;
    pub const BACK: i32 = 1 << 3;
    pub const FORWARD: i32 = 1 << 4;
}

/// Motion axis identifiers.
pub mod axis {
    pub const X: i32 = 0;
    pub const Y: i32 = 1;
    pub const VSCROLL: i32 = 9;
    pub const HSCROLL: i32 = 10;
    pub const RX: i32 = 12;
    pub const RY: i32 = 13;
    pub const HAT_X: i32 = 15;
    pub const HAT_Y: i32 = 16;
    pub const GAS: i32 = 22;
    pub const BRAKE: i32 = 23;
}

/// Meta state bits.
pub mod meta {
    pub const SHIFT_ON: i32 = 0x01;
    pub const ALT_ON: i32 = 0x02;
    pub const CTRL_ON: i32 = 0x1000;
    pub const META_ON: i32 = 0x10000;
    pub const CAPS_LOCK_ON: i32 = 0x100000;
    pub const NUM_LOCK_ON: i32 = 0x200000;
}

/// Guest key codes.
pub mod keycode {
    pub const UNKNOWN: i32 = 0;
    pub const BACK: i32 = 4;
    pub const DIGIT_0: i32 = 7;
    pub const DPAD_UP: i32 = 19;
    pub const DPAD_DOWN: i32 = 20;
    pub const DPAD_LEFT: i32 = 21;
    pub const DPAD_RIGHT: i32 = 22;
    pub const A: i32 = 29;
    pub const COMMA: i32 = 55;
    pub const PERIOD: i32 = 56;
    pub const ALT_LEFT: i32 = 57;
    pub const ALT_RIGHT: i32 = 58;
    pub const SHIFT_LEFT: i32 = 59;
    pub const SHIFT_RIGHT: i32 = 60;
    pub const TAB: i32 = 61;
    pub const SPACE: i32 = 62;
    pub const ENTER: i32 = 66;
    pub const DEL: i32 = 67;
    pub const GRAVE: i32 = 68;
    pub const MINUS: i32 = 69;
    pub const EQUALS: i32 = 70;
    pub const LEFT_BRACKET: i32 = 71;
    pub const RIGHT_BRACKET: i32 = 72;
    pub const BACKSLASH: i32 = 73;
    pub const SEMICOLON: i32 = 74;
    pub const APOSTROPHE: i32 = 75;
    pub const SLASH: i32 = 76;
    pub const MENU: i32 = 82;
    pub const PAGE_UP: i32 = 92;
    pub const PAGE_DOWN: i32 = 93;
    pub const BUTTON_A: i32 = 96;
    pub const BUTTON_B: i32 = 97;
    pub const BUTTON_X: i32 = 99;
    pub const BUTTON_Y: i32 = 100;
    pub const BUTTON_L1: i32 = 102;
    pub const BUTTON_R1: i32 = 103;
    pub const BUTTON_THUMBL: i32 = 106;
    pub const BUTTON_THUMBR: i32 = 107;
    pub const BUTTON_START: i32 = 108;
    pub const BUTTON_SELECT: i32 = 109;
    pub const BUTTON_MODE: i32 = 110;
    pub const ESCAPE: i32 = 111;
    pub const FORWARD_DEL: i32 = 112;
    pub const CTRL_LEFT: i32 = 113;
    pub const CTRL_RIGHT: i32 = 114;
    pub const CAPS_LOCK: i32 = 115;
    pub const SCROLL_LOCK: i32 = 116;
    pub const META_LEFT: i32 = 117;
    pub const META_RIGHT: i32 = 118;
    pub const BREAK: i32 = 121;
    pub const MOVE_HOME: i32 = 122;
    pub const MOVE_END: i32 = 123;
    pub const INSERT: i32 = 124;
    pub const F1: i32 = 131;
    pub const NUM_LOCK: i32 = 143;
    pub const NUMPAD_0: i32 = 144;
    pub const NUMPAD_DIVIDE: i32 = 154;
    pub const NUMPAD_MULTIPLY: i32 = 155;
    pub const NUMPAD_SUBTRACT: i32 = 156;
    pub const NUMPAD_ADD: i32 = 157;
    pub const NUMPAD_DOT: i32 = 158;
}

/// A key press or release as the guest sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub source: i32,
    pub device_id: i32,
    pub action: i32,
    pub key_code: i32,
    pub meta_state: i32,
}

impl KeyEvent {
    /// Keyboard key event on device 0.
    pub fn keyboard(pressed: bool, key_code: i32, meta_state: i32) -> Self {
        Self {
            source: source::KEYBOARD,
            device_id: 0,
            action: if pressed { key_action::DOWN } else { key_action::UP },
            key_code,
            meta_state,
        }
    }

    /// Gamepad button event.
    pub fn gamepad(device_id: i32, pressed: bool, key_code: i32) -> Self {
        Self {
            source: source::GAMEPAD,
            device_id,
            action: if pressed { key_action::DOWN } else { key_action::UP },
            key_code,
            meta_state: 0,
        }
    }

    #[inline]
    pub fn is_down(&self) -> bool {
        self.action == key_action::DOWN
    }
}

/// One pointer of a motion event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub id: i32,
    pub x: f32,
    pub y: f32,
}

/// Pointer, scroll or gamepad motion.
///
/// `axes` holds the non-positional axis values of the first pointer; the
/// X/Y position of each pointer lives in `pointers`.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionEvent {
    pub source: i32,
    pub device_id: i32,
    pub action: i32,
    pub button_state: i32,
    pub meta_state: i32,
    pub pointers: SmallVec<[Pointer; 2]>,
    pub axes: SmallVec<[(i32, f32); 8]>,
}

impl MotionEvent {
    /// Single-finger touch event.
    pub fn touch(pointer_id: i32, action: i32, x: f32, y: f32) -> Self {
        let mut pointers = SmallVec::new();
        pointers.push(Pointer { id: pointer_id, x, y });
        Self {
            source: source::TOUCHSCREEN,
            device_id: 0,
            action,
            button_state: 0,
            meta_state: 0,
            pointers,
            axes: SmallVec::new(),
        }
    }

    /// Mouse event with an optional vertical scroll value.
    pub fn mouse(source: i32, action: i32, button_state: i32, x: f32, y: f32, vscroll: f32) -> Self {
        let mut pointers = SmallVec::new();
        pointers.push(Pointer { id: 0, x, y });
        let mut axes = SmallVec::new();
        if vscroll != 0.0 {
            axes.push((axis::VSCROLL, vscroll));
        }
        Self {
            source,
            device_id: 0,
            action,
            button_state,
            meta_state: 0,
            pointers,
            axes,
        }
    }

    /// Gamepad move event carrying the given axis values.
    pub fn gamepad(device_id: i32, axes: SmallVec<[(i32, f32); 8]>) -> Self {
        let mut pointers = SmallVec::new();
        pointers.push(Pointer {
            id: 0,
            x: axis_lookup(&axes, axis::X),
            y: axis_lookup(&axes, axis::Y),
        });
        Self {
            source: source::GAMEPAD,
            device_id,
            action: motion_action::MOVE,
            button_state: 0,
            meta_state: 0,
            pointers,
            axes,
        }
    }

    /// Value of `axis` for the first pointer, 0 when absent.
    pub fn axis(&self, id: i32) -> f32 {
        match id {
            axis::X => self.pointers.first().map_or(0.0, |p| p.x),
            axis::Y => self.pointers.first().map_or(0.0, |p| p.y),
            _ => axis_lookup(&self.axes, id),
        }
    }
}

fn axis_lookup(axes: &[(i32, f32)], id: i32) -> f32 {
    axes.iter()
        .find(|(a, _)| *a == id)
        .map_or(0.0, |(_, v)| *v)
}

/// A translated event ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum GuestEvent {
    Key(KeyEvent),
    Motion(MotionEvent),
}

impl From<KeyEvent> for GuestEvent {
    fn from(event: KeyEvent) -> Self {
        GuestEvent::Key(event)
    }
}

impl From<MotionEvent> for GuestEvent {
    fn from(event: MotionEvent) -> Self {
        GuestEvent::Motion(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_event_without_scroll_has_no_axes() {
        let ev = MotionEvent::mouse(source::MOUSE, motion_action::HOVER_MOVE, 0, 10.0, 20.0, 0.0);
        assert!(ev.axes.is_empty());
        assert_eq!(ev.axis(axis::X), 10.0);
        assert_eq!(ev.axis(axis::Y), 20.0);
        assert_eq!(ev.axis(axis::VSCROLL), 0.0);
    }

    #[test]
    fn test_gamepad_event_positions_follow_left_stick() {
        let mut axes = SmallVec::new();
        axes.push((axis::X, 0.5));
        axes.push((axis::Y, -0.25));
        axes.push((axis::HAT_X, 1.0));
        let ev = MotionEvent::gamepad(3, axes);
        assert_eq!(ev.source, source::GAMEPAD);
        assert_eq!(ev.device_id, 3);
        assert_eq!(ev.axis(axis::X), 0.5);
        assert_eq!(ev.axis(axis::Y), -0.25);
        assert_eq!(ev.axis(axis::HAT_X), 1.0);
        assert_eq!(ev.axis(axis::RX), 0.0);
    }

    #[test]
    fn test_key_event_constructors() {
        let down = KeyEvent::keyboard(true, keycode::A, meta::SHIFT_ON);
        assert!(down.is_down());
        assert_eq!(down.source, source::KEYBOARD);

        let up = KeyEvent::gamepad(2, false, keycode::BUTTON_A);
        assert!(!up.is_down());
        assert_eq!(up.device_id, 2);
    }
}
