//! Guest event delivery.
//!
//! The delivery protocol is chosen once per process from the guest's
//! capability flag. Everything upstream produces [`GuestEvent`]s and never
//! needs to know which protocol is behind the dispatcher.

use std::sync::Arc;

use tracing::trace;

use crate::codec::{InputQueue, activity, queue};
use crate::event::{GuestEvent, key_action};
use crate::host::GuestAdapter;

/// Event dispatcher trait for delivering translated events to the guest.
pub trait EventDispatcher: Send + Sync {
    fn dispatch(&self, event: GuestEvent);
}

/// Protocol A: appends encoded records to the queue polled by the guest.
pub struct QueueDispatcher {
    queue: InputQueue,
}

impl QueueDispatcher {
    pub fn new(queue: InputQueue) -> Self {
        Self { queue }
    }
}

impl EventDispatcher for QueueDispatcher {
    #[inline]
    fn dispatch(&self, event: GuestEvent) {
        self.queue.push(queue::encode(&event));
    }
}

/// Protocol B: calls the guest's entry points synchronously.
pub struct ActivityDispatcher {
    guest: Arc<dyn GuestAdapter>,
}

impl ActivityDispatcher {
    pub fn new(guest: Arc<dyn GuestAdapter>) -> Self {
        Self { guest }
    }
}

impl EventDispatcher for ActivityDispatcher {
    fn dispatch(&self, event: GuestEvent) {
        match activity::encode(&event) {
            activity::ActivityEvent::Key(rec) => {
                if rec.action == key_action::DOWN {
                    self.guest.send_key_down(&rec);
                } else {
                    self.guest.send_key_up(&rec);
                }
            }
            activity::ActivityEvent::Motion(rec) => self.guest.send_motion_event(&rec),
        }
    }
}

/// Dispatcher selected by the guest's protocol flag.
///
/// Returns the dispatcher and, for protocol A, the queue the guest polls.
pub fn for_guest(guest: &Arc<dyn GuestAdapter>) -> (Arc<dyn EventDispatcher>, Option<InputQueue>) {
    if guest.is_activity_protocol() {
        trace!("using activity delivery protocol");
        (Arc::new(ActivityDispatcher::new(guest.clone())), None)
    } else {
        trace!("using queue delivery protocol");
        let queue = InputQueue::new();
        (Arc::new(QueueDispatcher::new(queue.clone())), Some(queue))
    }
}
