//! Guest event encoders.
//!
//! Two record layouts for the same [`GuestEvent`](crate::event::GuestEvent):
//! the polled queue used by older guests and the callback-based activity
//! layout used by newer ones. Both are pure functions of the event.

pub mod activity;
pub mod queue;

pub use activity::{ActivityKeyEvent, ActivityMotionEvent, PointerInfo};
pub use queue::{InputQueue, QueuedEvent};
