//! Input mode arbitration.
//!
//! Decides which logical input mode (touch, mouse or gamepad) currently owns
//! event delivery. Devices produce overlapping ambient signal, so a candidate
//! mode only takes over through escalation: either it outranks the active
//! mode, or the active mode has been idle for longer than the switch delay.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::util::{likely, unlikely};

/// Logical input mode owning delivery.
///
/// The ordinal doubles as priority: a smaller value wins escalation
/// immediately against a larger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum InputMode {
    Touch = 0,
    Mouse = 1,
    Gamepad = 2,
    #[default]
    Unknown = 3,
}

impl InputMode {
    /// Returns priority level (lower value = higher priority).
    #[inline(always)]
    pub fn priority(self) -> i32 {
        self as i32
    }

    /// Converts a raw ordinal, mapping anything unrecognised to `Unknown`.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => InputMode::Touch,
            1 => InputMode::Mouse,
            2 => InputMode::Gamepad,
            _ => InputMode::Unknown,
        }
    }
}

/// Arbiter policy, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbiterPolicy {
    /// Admit every event regardless of mode.
    pub raw_input: bool,
    /// Pin arbitration to a single mode; `Unknown` disables the override.
    pub forced_mode: InputMode,
    /// Idle time after which an escalating request may take over.
    pub switch_delay: Duration,
}

impl Default for ArbiterPolicy {
    fn default() -> Self {
        Self {
            raw_input: false,
            forced_mode: InputMode::Unknown,
            switch_delay: Duration::from_millis(100),
        }
    }
}

/// Outcome of a single arbitration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The event must be dropped.
    Rejected,
    /// The event may be delivered; the active mode did not change.
    Admitted,
    /// The event may be delivered and the active mode switched to the
    /// requested one.
    Switched { from: InputMode, to: InputMode },
}

impl Resolution {
    #[inline(always)]
    pub fn is_admitted(self) -> bool {
        !matches!(self, Resolution::Rejected)
    }
}

#[derive(Debug)]
struct ModeState {
    mode: InputMode,
    /// Last time the active mode admitted an event. `None` until the first
    /// admission, which counts as "delay elapsed".
    last_activity: Option<Instant>,
}

/// Input mode arbiter.
pub struct ModeArbiter {
    policy: ArbiterPolicy,
    send_events: AtomicBool,
    state: Mutex<ModeState>,
}

impl ModeArbiter {
    /// Creates an arbiter in the `Unknown` mode with event sending disabled.
    pub fn new(policy: ArbiterPolicy) -> Self {
        Self {
            policy,
            send_events: AtomicBool::new(false),
            state: Mutex::new(ModeState {
                mode: InputMode::Unknown,
                last_activity: None,
            }),
        }
    }

    /// Enables event sending. Returns true if it was previously disabled.
    pub fn enable_sending(&self) -> bool {
        !self.send_events.swap(true, Ordering::AcqRel)
    }

    #[inline(always)]
    pub fn is_sending(&self) -> bool {
        self.send_events.load(Ordering::Acquire)
    }

    /// Currently active mode.
    pub fn mode(&self) -> InputMode {
        self.lock_state().mode
    }

    /// Resolves a request against the current clock.
    #[inline]
    pub fn resolve(&self, want: InputMode, escalate: bool) -> Resolution {
        self.resolve_at(want, escalate, Instant::now())
    }

    /// Resolves a request for `want` at time `now`.
    ///
    /// Admission order: sending disabled rejects, raw passthrough admits,
    /// a forced mode admits only itself, and otherwise the current mode
    /// admits itself while an escalating request switches on priority or
    /// once the delay has elapsed since the last admission.
    pub fn resolve_at(&self, want: InputMode, escalate: bool, now: Instant) -> Resolution {
        if unlikely(!self.is_sending()) {
            return Resolution::Rejected;
        }
        if unlikely(self.policy.raw_input) {
            return Resolution::Admitted;
        }
        if unlikely(self.policy.forced_mode != InputMode::Unknown) {
            return if want == self.policy.forced_mode {
                Resolution::Admitted
            } else {
                Resolution::Rejected
            };
        }

        let mut state = self.lock_state();
        let current = state.mode;

        if likely(current == want) {
            state.last_activity = Some(now);
            return Resolution::Admitted;
        }
        if !escalate {
            return Resolution::Rejected;
        }

        let priority_win = want.priority() < current.priority();
        let delay_elapsed = match state.last_activity {
            Some(last) => now.saturating_duration_since(last) > self.policy.switch_delay,
            None => true,
        };
        if !(priority_win || delay_elapsed) {
            return Resolution::Rejected;
        }

        debug!(from = ?current, to = ?want, priority_win, "input mode changed");
        state.mode = want;
        state.last_activity = Some(now);
        Resolution::Switched {
            from: current,
            to: want,
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ModeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ModeArbiter {
    fn default() -> Self {
        Self::new(ArbiterPolicy::default())
    }
}
