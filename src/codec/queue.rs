//! Queue-based delivery (protocol A).
//!
//! Events are flattened into a fixed-format record and appended to a FIFO
//! that the guest's own event loop polls.

use crossbeam_channel::{Receiver, Sender};
use tracing::trace;

use crate::event::{GuestEvent, KeyEvent, MotionEvent};

/// Event type tag for key records.
pub const KIND_KEY: i32 = 1;
/// Event type tag for motion records.
pub const KIND_MOTION: i32 = 2;
/// Number of axis slots carried by a queued record.
pub const AXIS_COUNT: usize = 48;

/// Fixed-format queued input record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedEvent {
    pub kind: i32,
    pub source: i32,
    pub action: i32,
    pub device_id: i32,
    pub pointer_id: i32,
    pub x: f32,
    pub y: f32,
    pub button_state: i32,
    pub meta_state: i32,
    pub key_code: i32,
    pub axes: [f32; AXIS_COUNT],
}

impl QueuedEvent {
    fn empty(kind: i32) -> Self {
        Self {
            kind,
            source: 0,
            action: 0,
            device_id: 0,
            pointer_id: 0,
            x: 0.0,
            y: 0.0,
            button_state: 0,
            meta_state: 0,
            key_code: 0,
            axes: [0.0; AXIS_COUNT],
        }
    }

    /// Axis value, 0 for identifiers outside the table.
    pub fn axis(&self, id: i32) -> f32 {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.axes.get(i).copied())
            .unwrap_or(0.0)
    }

    #[inline]
    pub fn is_key(&self) -> bool {
        self.kind == KIND_KEY
    }
}

/// Encodes a key event.
pub fn encode_key(event: &KeyEvent) -> QueuedEvent {
    let mut rec = QueuedEvent::empty(KIND_KEY);
    rec.source = event.source;
    rec.action = event.action;
    rec.device_id = event.device_id;
    rec.key_code = event.key_code;
    rec.meta_state = event.meta_state;
    rec
}

/// Encodes a motion event. Only the first pointer is representable.
pub fn encode_motion(event: &MotionEvent) -> QueuedEvent {
    let mut rec = QueuedEvent::empty(KIND_MOTION);
    rec.source = event.source;
    rec.action = event.action;
    rec.device_id = event.device_id;
    rec.button_state = event.button_state;
    rec.meta_state = event.meta_state;
    if let Some(p) = event.pointers.first() {
        rec.pointer_id = p.id;
        rec.x = p.x;
        rec.y = p.y;
        rec.axes[crate::event::axis::X as usize] = p.x;
        rec.axes[crate::event::axis::Y as usize] = p.y;
    }
    for &(id, value) in &event.axes {
        if let Some(slot) = usize::try_from(id).ok().and_then(|i| rec.axes.get_mut(i)) {
            *slot = value;
        }
    }
    rec
}

/// Encodes any guest event.
pub fn encode(event: &GuestEvent) -> QueuedEvent {
    match event {
        GuestEvent::Key(key) => encode_key(key),
        GuestEvent::Motion(motion) => encode_motion(motion),
    }
}

/// Thread-safe FIFO polled by the guest.
#[derive(Clone)]
pub struct InputQueue {
    sender: Sender<QueuedEvent>,
    receiver: Receiver<QueuedEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    /// Appends a record without blocking.
    pub fn push(&self, event: QueuedEvent) {
        if self.sender.try_send(event).is_err() {
            trace!("input queue unavailable, dropping event");
        }
    }

    /// Takes the oldest record, if any.
    pub fn poll(&self) -> Option<QueuedEvent> {
        self.receiver.try_recv().ok()
    }

    /// Takes every queued record in FIFO order.
    pub fn drain(&self) -> Vec<QueuedEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receiving end for a guest loop that wants to block on new input.
    pub fn receiver(&self) -> Receiver<QueuedEvent> {
        self.receiver.clone()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{axis, keycode, meta, motion_action, source};

    #[test]
    fn test_encode_key() {
        let rec = encode(&GuestEvent::Key(KeyEvent::keyboard(
            true,
            keycode::A,
            meta::SHIFT_ON,
        )));
        assert!(rec.is_key());
        assert_eq!(rec.key_code, keycode::A);
        assert_eq!(rec.meta_state, meta::SHIFT_ON);
        assert_eq!(rec.source, source::KEYBOARD);
    }

    #[test]
    fn test_encode_scroll_motion() {
        let ev = MotionEvent::mouse(source::MOUSE, motion_action::SCROLL, 1, 4.0, 6.0, -127.0);
        let rec = encode_motion(&ev);
        assert_eq!(rec.kind, KIND_MOTION);
        assert_eq!(rec.x, 4.0);
        assert_eq!(rec.y, 6.0);
        assert_eq!(rec.button_state, 1);
        assert_eq!(rec.axis(axis::VSCROLL), -127.0);
        assert_eq!(rec.axis(-1), 0.0);
        assert_eq!(rec.axis(400), 0.0);
    }

    #[test]
    fn test_queue_is_fifo() {
        let queue = InputQueue::new();
        for code in [keycode::A, keycode::TAB, keycode::ENTER] {
            queue.push(encode_key(&KeyEvent::keyboard(true, code, 0)));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.poll().map(|r| r.key_code), Some(keycode::A));
        let rest: Vec<i32> = queue.drain().iter().map(|r| r.key_code).collect();
        assert_eq!(rest, vec![keycode::TAB, keycode::ENTER]);
        assert!(queue.is_empty());
    }
}
