//! C ABI for plugins.
//!
//! Plugins receive an opaque engine handle and register plain function
//! pointers with a user pointer. The engine never dereferences the user
//! pointer; it hands it back on every call.

use std::ffi::c_void;

use crate::engine::InputEngine;
use crate::host::{KeyAction, KeyMods};
use crate::translate::KeyCode;

pub type KeyboardHookFn = extern "C" fn(user: *mut c_void, key_code: i32, action: i32) -> bool;
pub type MouseButtonHookFn =
    extern "C" fn(user: *mut c_void, x: f64, y: f64, button: i32, action: i32) -> bool;
pub type MousePositionHookFn =
    extern "C" fn(user: *mut c_void, x: f64, y: f64, relative: bool) -> bool;
pub type MouseScrollHookFn =
    extern "C" fn(user: *mut c_void, x: f64, y: f64, dx: f64, dy: f64) -> bool;

/// Plugin-owned pointer carried alongside a hook.
#[derive(Clone, Copy)]
struct UserData(*mut c_void);

// The plugin guarantees its user pointer may be used from any input thread.
unsafe impl Send for UserData {}
unsafe impl Sync for UserData {}

impl UserData {
    #[inline(always)]
    fn get(self) -> *mut c_void {
        self.0
    }
}

/// # Safety
/// `engine` must be null or point to a live [`InputEngine`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inputshim_register_keyboard_hook(
    engine: *const InputEngine,
    user: *mut c_void,
    hook: Option<KeyboardHookFn>,
) {
    let (Some(engine), Some(hook)) = (unsafe { engine.as_ref() }, hook) else {
        return;
    };
    let user = UserData(user);
    engine.register_keyboard_hook(move |key: i32, action: i32| hook(user.get(), key, action));
}

/// # Safety
/// `engine` must be null or point to a live [`InputEngine`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inputshim_register_mouse_button_hook(
    engine: *const InputEngine,
    user: *mut c_void,
    hook: Option<MouseButtonHookFn>,
) {
    let (Some(engine), Some(hook)) = (unsafe { engine.as_ref() }, hook) else {
        return;
    };
    let user = UserData(user);
    engine.register_mouse_button_hook(move |x: f64, y: f64, button: i32, action: i32| {
        hook(user.get(), x, y, button, action)
    });
}

/// # Safety
/// `engine` must be null or point to a live [`InputEngine`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inputshim_register_mouse_position_hook(
    engine: *const InputEngine,
    user: *mut c_void,
    hook: Option<MousePositionHookFn>,
) {
    let (Some(engine), Some(hook)) = (unsafe { engine.as_ref() }, hook) else {
        return;
    };
    let user = UserData(user);
    engine.register_mouse_position_hook(move |x: f64, y: f64, relative: bool| {
        hook(user.get(), x, y, relative)
    });
}

/// # Safety
/// `engine` must be null or point to a live [`InputEngine`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inputshim_register_mouse_scroll_hook(
    engine: *const InputEngine,
    user: *mut c_void,
    hook: Option<MouseScrollHookFn>,
) {
    let (Some(engine), Some(hook)) = (unsafe { engine.as_ref() }, hook) else {
        return;
    };
    let user = UserData(user);
    engine.register_mouse_scroll_hook(move |x: f64, y: f64, dx: f64, dy: f64| {
        hook(user.get(), x, y, dx, dy)
    });
}

/// Active input mode ordinal, `3` (unknown) for a null handle.
///
/// # Safety
/// `engine` must be null or point to a live [`InputEngine`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inputshim_get_input_mode(engine: *const InputEngine) -> i32 {
    match unsafe { engine.as_ref() } {
        Some(engine) => engine.input_mode() as i32,
        None => crate::mode::InputMode::Unknown as i32,
    }
}

/// # Safety
/// `engine` must be null or point to a live [`InputEngine`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inputshim_is_mouse_locked(engine: *const InputEngine) -> bool {
    unsafe { engine.as_ref() }.is_some_and(InputEngine::is_mouse_locked)
}

/// Injects a host key event as if the window had reported it.
/// Unknown action ordinals are ignored.
///
/// # Safety
/// `engine` must be null or point to a live [`InputEngine`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inputshim_send_key(engine: *const InputEngine, key_code: i32, action: i32) {
    let (Some(engine), Some(action)) = (unsafe { engine.as_ref() }, KeyAction::from_i32(action))
    else {
        return;
    };
    engine.on_keyboard(KeyCode(key_code), action, KeyMods::NONE);
}
