//! Error types for the input path.

use thiserror::Error;

/// Invariant violations raised while processing a host input event.
///
/// These abort the current event only; shared state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    /// The host reported a gamepad button outside the tracked slot range.
    #[error("gamepad button id {0} is out of range")]
    GamepadButtonOutOfRange(i32),
    /// The host reported a gamepad axis outside the tracked slot range.
    #[error("gamepad axis id {0} is out of range")]
    GamepadAxisOutOfRange(i32),
}
