//! Recording doubles for the engine's collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use inputshim::codec::{ActivityKeyEvent, ActivityMotionEvent, QueuedEvent};
use inputshim::config::{EngineConfig, Settings};
use inputshim::engine::{Collaborators, InputEngine};
use inputshim::host::{GuestAdapter, HostWindow, KeyAction, KeyMods, TextInputHandler};

#[derive(Default)]
pub struct TestWindow {
    pub cursor_disabled: AtomicBool,
    pub clipboard: Mutex<String>,
}

impl HostWindow for TestWindow {
    fn set_cursor_disabled(&self, disabled: bool) {
        self.cursor_disabled.store(disabled, Ordering::SeqCst);
    }
    fn cursor_disabled(&self) -> bool {
        self.cursor_disabled.load(Ordering::SeqCst)
    }
    fn set_fullscreen(&self, _fullscreen: bool) {}
    fn set_clipboard_text(&self, text: &str) {
        *self.clipboard.lock().unwrap() = text.to_string();
    }
    fn start_text_input(&self) {}
    fn stop_text_input(&self) {}
    fn window_size(&self) -> (i32, i32) {
        (800, 600)
    }
}

#[derive(Default)]
pub struct TestText {
    pub keys: Mutex<Vec<i32>>,
    pub texts: Mutex<Vec<String>>,
}

impl TextInputHandler for TestText {
    fn on_key_pressed(&self, key_code: i32, _action: KeyAction, _mods: KeyMods) {
        self.keys.lock().unwrap().push(key_code);
    }
    fn on_text_input(&self, text: &str) {
        self.texts.lock().unwrap().push(text.to_string());
    }
    fn copy_text(&self) -> String {
        String::new()
    }
    fn is_multiline(&self) -> bool {
        false
    }
    fn cursor_position(&self) -> i32 {
        0
    }
    fn set_cursor_position(&self, _position: i32) {}
}

#[derive(Default)]
pub struct TestGuest {
    pub activity: bool,
    pub key_downs: Mutex<Vec<ActivityKeyEvent>>,
    pub key_ups: Mutex<Vec<ActivityKeyEvent>>,
    pub motions: Mutex<Vec<ActivityMotionEvent>>,
    pub controllers: Mutex<Vec<(i32, bool)>>,
    pub returns: AtomicUsize,
    pub text: TestText,
}

impl GuestAdapter for TestGuest {
    fn is_activity_protocol(&self) -> bool {
        self.activity
    }
    fn send_key_down(&self, event: &ActivityKeyEvent) {
        self.key_downs.lock().unwrap().push(*event);
    }
    fn send_key_up(&self, event: &ActivityKeyEvent) {
        self.key_ups.lock().unwrap().push(*event);
    }
    fn send_motion_event(&self, event: &ActivityMotionEvent) {
        self.motions.lock().unwrap().push(*event);
    }
    fn set_game_controller_connected(&self, id: i32, connected: bool) {
        self.controllers.lock().unwrap().push((id, connected));
    }
    fn on_window_resized(&self, _width: i32, _height: i32) {}
    fn on_window_closed(&self) {}
    fn on_return_key_pressed(&self) {
        self.returns.fetch_add(1, Ordering::SeqCst);
    }
    fn import_file(&self, _path: &str) {}
    fn text_input(&self) -> &dyn TextInputHandler {
        &self.text
    }
}

/// An engine wired to recording doubles.
pub struct Rig {
    pub engine: Arc<InputEngine>,
    pub window: Arc<TestWindow>,
    pub guest: Arc<TestGuest>,
}

impl Rig {
    pub fn with(config: EngineConfig, guest: TestGuest) -> Self {
        let window = Arc::new(TestWindow::default());
        let guest = Arc::new(guest);
        let settings = Arc::new(Settings::new(config.clone(), None));
        let engine = Arc::new(InputEngine::new(
            &config,
            Collaborators {
                window: window.clone(),
                settings,
                guest: guest.clone(),
                overlay: None,
            },
        ));
        Self {
            engine,
            window,
            guest,
        }
    }

    /// Queue-protocol engine with default config and delivery enabled.
    pub fn started() -> Self {
        let rig = Self::with(EngineConfig::default(), TestGuest::default());
        rig.engine.start_send_events();
        rig
    }

    pub fn drain(&self) -> Vec<QueuedEvent> {
        self.engine
            .queue()
            .expect("Failed to get input queue")
            .drain()
    }
}
