//! Callback-based delivery (protocol B).
//!
//! Record layouts handed synchronously to the guest's key-down, key-up and
//! motion entry points. The layouts must stay binary compatible with the
//! guest, hence `#[repr(C)]` and fixed array sizes.

use crate::event::{GuestEvent, KeyEvent, MotionEvent, axis, source};

/// Maximum simultaneous pointers in one motion record.
pub const MAX_POINTERS: usize = 8;
/// Axis slots per pointer.
pub const AXIS_COUNT: usize = 48;

pub const TOOL_TYPE_UNKNOWN: i32 = 0;
pub const TOOL_TYPE_FINGER: i32 = 1;
pub const TOOL_TYPE_MOUSE: i32 = 3;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInfo {
    pub id: i32,
    pub tool_type: i32,
    pub axis_values: [f32; AXIS_COUNT],
    pub raw_x: f32,
    pub raw_y: f32,
}

impl PointerInfo {
    pub const fn zeroed() -> Self {
        Self {
            id: 0,
            tool_type: TOOL_TYPE_UNKNOWN,
            axis_values: [0.0; AXIS_COUNT],
            raw_x: 0.0,
            raw_y: 0.0,
        }
    }

    /// Axis value, 0 for identifiers outside the table.
    pub fn axis(&self, id: i32) -> f32 {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.axis_values.get(i).copied())
            .unwrap_or(0.0)
    }

    fn set_axis(&mut self, id: i32, value: f32) {
        if let Some(slot) = usize::try_from(id)
            .ok()
            .and_then(|i| self.axis_values.get_mut(i))
        {
            *slot = value;
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityMotionEvent {
    pub device_id: i32,
    pub source: i32,
    pub action: i32,
    pub event_time: i64,
    pub down_time: i64,
    pub flags: i32,
    pub meta_state: i32,
    pub action_button: i32,
    pub button_state: i32,
    pub classification: i32,
    pub edge_flags: i32,
    pub pointer_count: u32,
    pub pointers: [PointerInfo; MAX_POINTERS],
    pub history_size: i32,
    pub precision_x: f32,
    pub precision_y: f32,
}

impl ActivityMotionEvent {
    pub const fn zeroed() -> Self {
        Self {
            device_id: 0,
            source: 0,
            action: 0,
            event_time: 0,
            down_time: 0,
            flags: 0,
            meta_state: 0,
            action_button: 0,
            button_state: 0,
            classification: 0,
            edge_flags: 0,
            pointer_count: 0,
            pointers: [PointerInfo::zeroed(); MAX_POINTERS],
            history_size: 0,
            precision_x: 0.0,
            precision_y: 0.0,
        }
    }

    /// Pointers actually in use.
    pub fn active_pointers(&self) -> &[PointerInfo] {
        &self.pointers[..(self.pointer_count as usize).min(MAX_POINTERS)]
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivityKeyEvent {
    pub device_id: i32,
    pub source: i32,
    pub action: i32,
    pub event_time: i64,
    pub down_time: i64,
    pub flags: i32,
    pub meta_state: i32,
    pub modifiers: i32,
    pub repeat_count: i32,
    pub key_code: i32,
    pub scan_code: i32,
    pub unicode_char: i32,
}

fn tool_type_for(source_class: i32) -> i32 {
    match source_class {
        source::TOUCHSCREEN => TOOL_TYPE_FINGER,
        source::MOUSE | source::MOUSE_RELATIVE => TOOL_TYPE_MOUSE,
        _ => TOOL_TYPE_UNKNOWN,
    }
}

/// Encodes a key event.
pub fn encode_key(event: &KeyEvent) -> ActivityKeyEvent {
    ActivityKeyEvent {
        device_id: event.device_id,
        source: event.source,
        action: event.action,
        meta_state: event.meta_state,
        key_code: event.key_code,
        ..ActivityKeyEvent::default()
    }
}

/// Encodes a motion event. Pointers beyond [`MAX_POINTERS`] are dropped.
pub fn encode_motion(event: &MotionEvent) -> ActivityMotionEvent {
    let mut rec = ActivityMotionEvent::zeroed();
    rec.device_id = event.device_id;
    rec.source = event.source;
    rec.action = event.action;
    rec.meta_state = event.meta_state;
    rec.button_state = event.button_state;

    let tool_type = tool_type_for(event.source);
    let count = event.pointers.len().min(MAX_POINTERS);
    for (slot, p) in rec.pointers.iter_mut().zip(event.pointers.iter()) {
        slot.id = p.id;
        slot.tool_type = tool_type;
        slot.raw_x = p.x;
        slot.raw_y = p.y;
        slot.set_axis(axis::X, p.x);
        slot.set_axis(axis::Y, p.y);
    }
    if count > 0 {
        for &(id, value) in &event.axes {
            rec.pointers[0].set_axis(id, value);
        }
        rec.precision_x = rec.pointers[0].raw_x;
        rec.precision_y = rec.pointers[0].raw_y;
    }
    rec.pointer_count = count as u32;
    rec
}

/// Encoded form of any guest event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivityEvent {
    Key(ActivityKeyEvent),
    Motion(ActivityMotionEvent),
}

/// Encodes any guest event.
pub fn encode(event: &GuestEvent) -> ActivityEvent {
    match event {
        GuestEvent::Key(key) => ActivityEvent::Key(encode_key(key)),
        GuestEvent::Motion(motion) => ActivityEvent::Motion(encode_motion(motion)),
    }
}
