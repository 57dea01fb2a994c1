//! Gamepad state tracking.
//!
//! Keeps the last reported button and axis state of every connected
//! controller. Hosts report full state repeatedly, so identical button
//! reports are dropped here. Sticks, triggers and the d-pad are folded into
//! one composite motion event that is only built when somebody asks for it,
//! which coalesces bursts of axis updates into a single guest event.

use smallvec::SmallVec;
use tracing::trace;

use crate::error::InputError;
use crate::event::{MotionEvent, axis};
use crate::translate::{GamepadAxis, GamepadButton};

/// Last known state of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GamepadData {
    pub axis: [f32; GamepadAxis::COUNT],
    pub button: [bool; GamepadButton::COUNT],
    /// A composite motion event is owed to the guest.
    pub needs_composite: bool,
}

impl GamepadData {
    #[inline(always)]
    fn pressed(&self, btn: GamepadButton) -> bool {
        btn.index().is_some_and(|i| self.button[i])
    }

    /// Hat value from two opposing d-pad buttons; `positive` wins a conflict.
    #[inline(always)]
    fn hat(&self, negative: GamepadButton, positive: GamepadButton) -> f32 {
        if self.pressed(positive) {
            1.0
        } else if self.pressed(negative) {
            -1.0
        } else {
            0.0
        }
    }

    /// Builds the combined stick, trigger and hat motion event.
    pub fn composite(&self, device_id: i32) -> MotionEvent {
        let mut axes: SmallVec<[(i32, f32); 8]> = SmallVec::new();
        axes.push((axis::X, self.axis[0]));
        axes.push((axis::Y, self.axis[1]));
        axes.push((axis::RX, self.axis[2]));
        axes.push((axis::RY, self.axis[3]));
        axes.push((axis::BRAKE, self.axis[4]));
        axes.push((axis::GAS, self.axis[5]));
        axes.push((
            axis::HAT_X,
            self.hat(GamepadButton::DPAD_LEFT, GamepadButton::DPAD_RIGHT),
        ));
        axes.push((
            axis::HAT_Y,
            self.hat(GamepadButton::DPAD_UP, GamepadButton::DPAD_DOWN),
        ));
        MotionEvent::gamepad(device_id, axes)
    }
}

/// Result of a button report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonChange {
    /// The controller is not connected.
    Unknown,
    /// Same state as last report.
    Unchanged,
    /// A d-pad button changed; the composite event is now pending.
    Dpad,
    /// A discrete button changed and should be delivered as a key event.
    Discrete,
}

/// Per-controller state keyed by the host's controller id.
pub struct GamepadTracker {
    pads: scc::HashMap<i32, GamepadData>,
}

impl GamepadTracker {
    pub fn new() -> Self {
        Self {
            pads: scc::HashMap::new(),
        }
    }

    /// Creates zeroed state for `id`. Returns false if it was already connected.
    pub fn connect(&self, id: i32) -> bool {
        let inserted = self.pads.insert_sync(id, GamepadData::default()).is_ok();
        trace!(id, inserted, "gamepad connected");
        inserted
    }

    /// Drops the state of `id`. Returns false if it was not connected.
    pub fn disconnect(&self, id: i32) -> bool {
        let removed = self.pads.remove_sync(&id).is_some();
        trace!(id, removed, "gamepad disconnected");
        removed
    }

    #[inline]
    pub fn is_connected(&self, id: i32) -> bool {
        self.pads.contains_sync(&id)
    }

    /// Connected controller ids in ascending order.
    pub fn connected_ids(&self) -> Vec<i32> {
        let mut ids = Vec::new();
        self.pads.iter_sync(|id, _| {
            ids.push(*id);
            true
        });
        ids.sort_unstable();
        ids
    }

    /// Snapshot of a controller's state.
    pub fn get(&self, id: i32) -> Option<GamepadData> {
        self.pads.read_sync(&id, |_, data| *data)
    }

    /// Records a button report.
    pub fn set_button(
        &self,
        id: i32,
        btn: GamepadButton,
        pressed: bool,
    ) -> Result<ButtonChange, InputError> {
        if !self.pads.contains_sync(&id) {
            return Ok(ButtonChange::Unknown);
        }
        let index = btn
            .index()
            .ok_or(InputError::GamepadButtonOutOfRange(btn.0))?;

        let change = self.pads.update_sync(&id, |_, data| {
            if data.button[index] == pressed {
                return ButtonChange::Unchanged;
            }
            data.button[index] = pressed;
            if btn.is_dpad() {
                data.needs_composite = true;
                ButtonChange::Dpad
            } else {
                ButtonChange::Discrete
            }
        });
        Ok(change.unwrap_or(ButtonChange::Unknown))
    }

    /// Records an axis report. Returns false when the controller is unknown.
    pub fn set_axis(&self, id: i32, ax: GamepadAxis, value: f32) -> Result<bool, InputError> {
        if !self.pads.contains_sync(&id) {
            return Ok(false);
        }
        let index = ax.index().ok_or(InputError::GamepadAxisOutOfRange(ax.0))?;

        let updated = self.pads.update_sync(&id, |_, data| {
            data.axis[index] = value;
            data.needs_composite = true;
        });
        Ok(updated.is_some())
    }

    /// Whether a composite event is pending for `id`.
    pub fn is_pending(&self, id: i32) -> bool {
        self.pads
            .read_sync(&id, |_, data| data.needs_composite)
            .unwrap_or(false)
    }

    /// Takes the pending composite event of `id`, clearing the flag.
    pub fn take_composite(&self, id: i32) -> Option<MotionEvent> {
        self.pads
            .update_sync(&id, |_, data| {
                if !data.needs_composite {
                    return None;
                }
                data.needs_composite = false;
                Some(data.composite(id))
            })
            .flatten()
    }
}

impl Default for GamepadTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_pad_is_ignored() {
        let pads = GamepadTracker::new();
        assert_eq!(
            pads.set_button(1, GamepadButton::A, true),
            Ok(ButtonChange::Unknown)
        );
        assert_eq!(pads.set_axis(1, GamepadAxis::LEFT_X, 0.5), Ok(false));
        assert!(pads.take_composite(1).is_none());
    }

    #[test]
    fn test_unknown_pad_checked_before_range() {
        let pads = GamepadTracker::new();
        assert_eq!(
            pads.set_button(1, GamepadButton(99), true),
            Ok(ButtonChange::Unknown)
        );
    }

    #[test]
    fn test_out_of_range_ids() {
        let pads = GamepadTracker::new();
        pads.connect(0);
        assert_eq!(
            pads.set_button(0, GamepadButton(15), true),
            Err(InputError::GamepadButtonOutOfRange(15))
        );
        assert_eq!(
            pads.set_axis(0, GamepadAxis(6), 1.0),
            Err(InputError::GamepadAxisOutOfRange(6))
        );
        assert_eq!(pads.get(0), Some(GamepadData::default()));
    }

    #[test]
    fn test_duplicate_button_reports() {
        let pads = GamepadTracker::new();
        pads.connect(2);
        assert_eq!(
            pads.set_button(2, GamepadButton::A, true),
            Ok(ButtonChange::Discrete)
        );
        assert_eq!(
            pads.set_button(2, GamepadButton::A, true),
            Ok(ButtonChange::Unchanged)
        );
        assert!(!pads.is_pending(2));
    }

    #[test]
    fn test_dpad_coalesces_into_one_composite() {
        let pads = GamepadTracker::new();
        pads.connect(0);
        assert_eq!(
            pads.set_button(0, GamepadButton::DPAD_UP, true),
            Ok(ButtonChange::Dpad)
        );
        assert_eq!(
            pads.set_button(0, GamepadButton::DPAD_UP, true),
            Ok(ButtonChange::Unchanged)
        );
        assert!(pads.is_pending(0));

        let ev = pads.take_composite(0).expect("Failed to take composite");
        assert_eq!(ev.axis(axis::HAT_Y), -1.0);
        assert_eq!(ev.axis(axis::HAT_X), 0.0);
        assert!(pads.take_composite(0).is_none());
    }

    #[test]
    fn test_hat_conflict_right_and_down_win() {
        let pads = GamepadTracker::new();
        pads.connect(0);
        for btn in [
            GamepadButton::DPAD_LEFT,
            GamepadButton::DPAD_RIGHT,
            GamepadButton::DPAD_UP,
            GamepadButton::DPAD_DOWN,
        ] {
            pads.set_button(0, btn, true).expect("Failed to set button");
        }
        let ev = pads.take_composite(0).expect("Failed to take composite");
        assert_eq!(ev.axis(axis::HAT_X), 1.0);
        assert_eq!(ev.axis(axis::HAT_Y), 1.0);
    }

    #[test]
    fn test_composite_axis_layout() {
        let pads = GamepadTracker::new();
        pads.connect(3);
        let values = [
            (GamepadAxis::LEFT_X, 0.1),
            (GamepadAxis::LEFT_Y, 0.2),
            (GamepadAxis::RIGHT_X, 0.3),
            (GamepadAxis::RIGHT_Y, 0.4),
            (GamepadAxis::LEFT_TRIGGER, 0.5),
            (GamepadAxis::RIGHT_TRIGGER, 0.6),
        ];
        for (ax, v) in values {
            assert_eq!(pads.set_axis(3, ax, v), Ok(true));
        }
        let ev = pads.take_composite(3).expect("Failed to take composite");
        assert_eq!(ev.device_id, 3);
        assert_eq!(ev.axis(axis::X), 0.1);
        assert_eq!(ev.axis(axis::Y), 0.2);
        assert_eq!(ev.axis(axis::RX), 0.3);
        assert_eq!(ev.axis(axis::RY), 0.4);
        assert_eq!(ev.axis(axis::BRAKE), 0.5);
        assert_eq!(ev.axis(axis::GAS), 0.6);
    }

    #[test]
    fn test_connect_disconnect_lifecycle() {
        let pads = GamepadTracker::new();
        assert!(pads.connect(4));
        assert!(pads.connect(1));
        assert!(!pads.connect(4));
        assert_eq!(pads.connected_ids(), vec![1, 4]);
        assert!(pads.disconnect(4));
        assert!(!pads.disconnect(4));
        assert!(!pads.is_connected(4));
        assert_eq!(pads.connected_ids(), vec![1]);
    }
}
