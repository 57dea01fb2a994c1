//! Plugin C ABI.

mod common;

use std::ffi::c_void;
use std::ptr;
use std::sync::atomic::{AtomicI32, Ordering};

use common::Rig;
use inputshim::InputEngine;
use inputshim::event::keycode;
use inputshim::ffi::{
    inputshim_get_input_mode, inputshim_is_mouse_locked, inputshim_register_keyboard_hook,
    inputshim_register_mouse_scroll_hook, inputshim_send_key,
};
use inputshim::host::KeyAction;
use inputshim::mode::InputMode;
use inputshim::translate::KeyCode;

extern "C" fn swallow_escape(user: *mut c_void, key_code: i32, _action: i32) -> bool {
    // SAFETY: every registration below passes a pointer to a live AtomicI32.
    let last = unsafe { &*(user as *const AtomicI32) };
    last.store(key_code, Ordering::SeqCst);
    key_code == KeyCode::ESCAPE.0
}

extern "C" fn count_scroll(user: *mut c_void, _x: f64, _y: f64, _dx: f64, dy: f64) -> bool {
    // SAFETY: as above.
    let total = unsafe { &*(user as *const AtomicI32) };
    total.fetch_add(dy as i32, Ordering::SeqCst);
    false
}

fn handle(rig: &Rig) -> *const InputEngine {
    &*rig.engine
}

#[test]
fn test_keyboard_hook_through_c_abi() {
    let rig = Rig::started();
    let last = AtomicI32::new(0);
    let user = &last as *const AtomicI32 as *mut c_void;

    unsafe {
        inputshim_register_keyboard_hook(handle(&rig), user, Some(swallow_escape));
        inputshim_send_key(handle(&rig), KeyCode::ESCAPE.0, KeyAction::Press as i32);
    }
    assert_eq!(last.load(Ordering::SeqCst), KeyCode::ESCAPE.0);
    assert!(rig.drain().is_empty());

    unsafe {
        inputshim_send_key(handle(&rig), KeyCode::SPACE.0, KeyAction::Press as i32);
    }
    assert_eq!(last.load(Ordering::SeqCst), KeyCode::SPACE.0);
    let events = rig.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].key_code, keycode::SPACE);
}

#[test]
fn test_scroll_hook_observes_without_consuming() {
    let rig = Rig::started();
    let total = AtomicI32::new(0);
    let user = &total as *const AtomicI32 as *mut c_void;

    unsafe {
        inputshim_register_mouse_scroll_hook(handle(&rig), user, Some(count_scroll));
    }
    rig.engine.on_mouse_scroll(10.0, 10.0, 0.0, 2.0);
    rig.engine.on_mouse_scroll(10.0, 10.0, 0.0, 3.0);

    assert_eq!(total.load(Ordering::SeqCst), 5);
    assert_eq!(rig.drain().len(), 2);
}

#[test]
fn test_queries_reflect_engine_state() {
    let rig = Rig::started();
    unsafe {
        assert_eq!(inputshim_get_input_mode(handle(&rig)), InputMode::Unknown as i32);
        assert!(!inputshim_is_mouse_locked(handle(&rig)));
    }

    rig.engine.on_touch_start(0, 1.0, 1.0);
    rig.engine.set_cursor_locked(true);
    unsafe {
        assert_eq!(inputshim_get_input_mode(handle(&rig)), InputMode::Touch as i32);
        assert!(inputshim_is_mouse_locked(handle(&rig)));
    }
}

/// Null handles, null hooks and unknown actions are ignored.
#[test]
fn test_invalid_arguments_are_ignored() {
    let rig = Rig::started();
    unsafe {
        assert_eq!(inputshim_get_input_mode(ptr::null()), InputMode::Unknown as i32);
        assert!(!inputshim_is_mouse_locked(ptr::null()));
        inputshim_register_keyboard_hook(ptr::null(), ptr::null_mut(), Some(swallow_escape));
        inputshim_register_keyboard_hook(handle(&rig), ptr::null_mut(), None);
        inputshim_send_key(ptr::null(), KeyCode::A.0, 0);
        inputshim_send_key(handle(&rig), KeyCode::A.0, 9);
    }
    assert!(rig.engine.hooks().keyboard().is_empty());
    assert!(rig.drain().is_empty());
}
