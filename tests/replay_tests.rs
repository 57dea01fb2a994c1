//! Trace replay against a live engine.

mod common;

use std::io::Cursor;

use common::{Rig, TestGuest};
use inputshim::config::EngineConfig;
use inputshim::event::{button, keycode, motion_action, source};
use inputshim::mode::InputMode;
use inputshim::replay::{ReplayStats, replay};

#[test]
fn test_replay_mouse_and_keyboard_session() {
    let rig = Rig::with(EngineConfig::default(), TestGuest::default());
    let trace = "\
# guest not ready yet, dropped
mouse_move 1 1
frame
mouse_move 50 60
mouse_button 50 60 1 press
mouse_button 50 60 1 release
key 65 press shift
key 65 release shift
";
    let stats = replay(Cursor::new(trace), &rig.engine).expect("Failed to replay trace");
    assert_eq!(
        stats,
        ReplayStats {
            events: 7,
            rejected: 0
        }
    );

    let events = rig.drain();
    assert_eq!(events.len(), 5);
    assert_eq!(events[0].action, motion_action::HOVER_MOVE);
    assert_eq!(events[1].button_state, button::PRIMARY);
    assert_eq!(events[2].button_state, 0);
    assert!(events[3].is_key());
    assert_eq!(events[3].key_code, keycode::A);
    assert_eq!(rig.engine.input_mode(), InputMode::Mouse);
}

/// Range errors are counted and replay carries on.
#[test]
fn test_replay_counts_rejected_events() {
    let rig = Rig::started();
    let trace = "\
gamepad_connect 0
gamepad_button 0 99 press
gamepad_axis 0 1 0.9
frame
";
    let stats = replay(Cursor::new(trace), &rig.engine).expect("Failed to replay trace");
    assert_eq!(stats.events, 4);
    assert_eq!(stats.rejected, 1);

    let events = rig.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source, source::GAMEPAD);
}

#[test]
fn test_replay_stops_on_parse_error() {
    let rig = Rig::started();
    let trace = "frame\nmouse_move 1\n";
    let err = replay(Cursor::new(trace), &rig.engine).expect_err("Trace should not parse");
    assert!(format!("{err:#}").contains("line 2"));
}

/// Delayed paste replays the last paste on the second frame after arming.
#[test]
fn test_replay_delayed_paste() {
    let config = EngineConfig {
        paste_patch: true,
        ..Default::default()
    };
    let rig = Rig::with(config, TestGuest::default());
    let trace = "\
frame
paste hello world
delayed_paste
frame
frame
frame
";
    replay(Cursor::new(trace), &rig.engine).expect("Failed to replay trace");

    let texts = rig.guest.text.texts.lock().unwrap();
    assert_eq!(*texts, ["hello world", "\x08", "hello world"]);
}
