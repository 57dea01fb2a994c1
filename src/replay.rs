//! Line-oriented host event traces.
//!
//! One event per line, whitespace separated, `#` starts a comment:
//!
//! ```text
//! frame
//! mouse_move 120 80
//! mouse_button 120 80 1 press
//! key 65 press shift|ctrl
//! gamepad_connect 0
//! gamepad_axis 0 0 0.75
//! sleep 150
//! ```

use std::io::BufRead;
use std::str::{FromStr, SplitWhitespace};
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use tracing::warn;

use crate::engine::InputEngine;
use crate::error::InputError;
use crate::host::{ButtonAction, KeyAction, KeyMods};
use crate::translate::{GamepadAxis, GamepadButton, KeyCode};
use crate::util::parse_flag;

/// A host event as recorded in a trace.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Frame,
    MouseButton { x: f64, y: f64, button: i32, action: ButtonAction },
    MouseMove { x: f64, y: f64 },
    MouseRelative { dx: f64, dy: f64 },
    Scroll { x: f64, y: f64, dx: f64, dy: f64 },
    TouchStart { id: i32, x: f64, y: f64 },
    TouchUpdate { id: i32, x: f64, y: f64 },
    TouchEnd { id: i32, x: f64, y: f64 },
    Key { code: i32, action: KeyAction, mods: KeyMods },
    Text(String),
    Paste(String),
    DelayedPaste,
    GamepadState { id: i32, connected: bool },
    GamepadButton { id: i32, button: i32, pressed: bool },
    GamepadAxis { id: i32, axis: i32, value: f32 },
    Resize { width: i32, height: i32 },
    CursorLock(bool),
    Fullscreen(bool),
    Drop(String),
    Close,
    Sleep(Duration),
}

fn next<T: FromStr>(parts: &mut SplitWhitespace<'_>, what: &str) -> anyhow::Result<T> {
    let raw = parts.next().ok_or_else(|| anyhow!("missing {what}"))?;
    raw.parse()
        .map_err(|_| anyhow!("invalid {what}: {raw:?}"))
}

fn next_flag(parts: &mut SplitWhitespace<'_>, what: &str) -> anyhow::Result<bool> {
    let raw = parts.next().ok_or_else(|| anyhow!("missing {what}"))?;
    parse_flag(raw).ok_or_else(|| anyhow!("invalid {what}: {raw:?}"))
}

fn parse_button_action(raw: Option<&str>) -> anyhow::Result<ButtonAction> {
    match raw {
        Some("press") => Ok(ButtonAction::Press),
        Some("release") => Ok(ButtonAction::Release),
        other => bail!("invalid button action: {other:?}"),
    }
}

fn parse_key_action(raw: Option<&str>) -> anyhow::Result<KeyAction> {
    match raw {
        Some("press") => Ok(KeyAction::Press),
        Some("repeat") => Ok(KeyAction::Repeat),
        Some("release") => Ok(KeyAction::Release),
        other => bail!("invalid key action: {other:?}"),
    }
}

fn parse_mods(raw: Option<&str>) -> anyhow::Result<KeyMods> {
    let Some(raw) = raw else {
        return Ok(KeyMods::NONE);
    };
    raw.split('|').try_fold(KeyMods::NONE, |acc, name| {
        let bit = match name {
            "shift" => KeyMods::SHIFT,
            "ctrl" => KeyMods::CTRL,
            "alt" => KeyMods::ALT,
            "super" => KeyMods::SUPER,
            "caps" => KeyMods::CAPS_LOCK,
            "num" => KeyMods::NUM_LOCK,
            other => bail!("unknown modifier: {other:?}"),
        };
        Ok(acc | bit)
    })
}

/// Remainder of a line after the command word, kept verbatim.
fn rest_of(line: &str, command: &str) -> String {
    line.trim_start()[command.len()..].trim().to_string()
}

/// Parses one trace line. Blank and comment lines yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<HostEvent>> {
    let line = line.split('#').next().unwrap_or_default();
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(None);
    };

    let event = match command {
        "frame" => HostEvent::Frame,
        "mouse_button" => HostEvent::MouseButton {
            x: next(&mut parts, "x")?,
            y: next(&mut parts, "y")?,
            button: next(&mut parts, "button")?,
            action: parse_button_action(parts.next())?,
        },
        "mouse_move" => HostEvent::MouseMove {
            x: next(&mut parts, "x")?,
            y: next(&mut parts, "y")?,
        },
        "mouse_relative" => HostEvent::MouseRelative {
            dx: next(&mut parts, "dx")?,
            dy: next(&mut parts, "dy")?,
        },
        "scroll" => HostEvent::Scroll {
            x: next(&mut parts, "x")?,
            y: next(&mut parts, "y")?,
            dx: next(&mut parts, "dx")?,
            dy: next(&mut parts, "dy")?,
        },
        "touch_start" | "touch_update" | "touch_end" => {
            let id = next(&mut parts, "touch id")?;
            let x = next(&mut parts, "x")?;
            let y = next(&mut parts, "y")?;
            match command {
                "touch_start" => HostEvent::TouchStart { id, x, y },
                "touch_update" => HostEvent::TouchUpdate { id, x, y },
                _ => HostEvent::TouchEnd { id, x, y },
            }
        }
        "key" => HostEvent::Key {
            code: next(&mut parts, "key code")?,
            action: parse_key_action(parts.next())?,
            mods: parse_mods(parts.next())?,
        },
        "text" => HostEvent::Text(rest_of(line, command).replace("\\n", "\n")),
        "paste" => HostEvent::Paste(rest_of(line, command)),
        "delayed_paste" => HostEvent::DelayedPaste,
        "gamepad_connect" => HostEvent::GamepadState {
            id: next(&mut parts, "gamepad id")?,
            connected: true,
        },
        "gamepad_disconnect" => HostEvent::GamepadState {
            id: next(&mut parts, "gamepad id")?,
            connected: false,
        },
        "gamepad_button" => HostEvent::GamepadButton {
            id: next(&mut parts, "gamepad id")?,
            button: next(&mut parts, "button")?,
            pressed: parse_button_action(parts.next())? == ButtonAction::Press,
        },
        "gamepad_axis" => HostEvent::GamepadAxis {
            id: next(&mut parts, "gamepad id")?,
            axis: next(&mut parts, "axis")?,
            value: next(&mut parts, "value")?,
        },
        "resize" => HostEvent::Resize {
            width: next(&mut parts, "width")?,
            height: next(&mut parts, "height")?,
        },
        "lock" => HostEvent::CursorLock(next_flag(&mut parts, "lock state")?),
        "fullscreen" => HostEvent::Fullscreen(next_flag(&mut parts, "fullscreen state")?),
        "drop" => HostEvent::Drop(rest_of(line, command)),
        "close" => HostEvent::Close,
        "sleep" => HostEvent::Sleep(Duration::from_millis(next(&mut parts, "milliseconds")?)),
        other => bail!("unknown command: {other:?}"),
    };
    Ok(Some(event))
}

/// Feeds one event to the engine. `Sleep` is left to the caller.
pub fn apply(engine: &InputEngine, event: &HostEvent) -> Result<(), InputError> {
    match event {
        HostEvent::Frame => engine.start_send_events(),
        HostEvent::MouseButton { x, y, button, action } => {
            engine.on_mouse_button(*x, *y, *button, *action)
        }
        HostEvent::MouseMove { x, y } => engine.on_mouse_position(*x, *y),
        HostEvent::MouseRelative { dx, dy } => engine.on_mouse_relative_position(*dx, *dy),
        HostEvent::Scroll { x, y, dx, dy } => engine.on_mouse_scroll(*x, *y, *dx, *dy),
        HostEvent::TouchStart { id, x, y } => engine.on_touch_start(*id, *x, *y),
        HostEvent::TouchUpdate { id, x, y } => engine.on_touch_update(*id, *x, *y),
        HostEvent::TouchEnd { id, x, y } => engine.on_touch_end(*id, *x, *y),
        HostEvent::Key { code, action, mods } => engine.on_keyboard(KeyCode(*code), *action, *mods),
        HostEvent::Text(text) => engine.on_keyboard_text(text),
        HostEvent::Paste(text) => engine.on_paste(text),
        HostEvent::DelayedPaste => engine.set_delayed_paste(),
        HostEvent::GamepadState { id, connected } => engine.on_gamepad_state(*id, *connected),
        HostEvent::GamepadButton { id, button, pressed } => {
            engine.on_gamepad_button(*id, GamepadButton(*button), *pressed)?
        }
        HostEvent::GamepadAxis { id, axis, value } => {
            engine.on_gamepad_axis(*id, GamepadAxis(*axis), *value)?
        }
        HostEvent::Resize { width, height } => engine.on_window_resized(*width, *height),
        HostEvent::CursorLock(locked) => engine.set_cursor_locked(*locked),
        HostEvent::Fullscreen(fullscreen) => engine.set_fullscreen(*fullscreen),
        HostEvent::Drop(path) => engine.on_drop(path),
        HostEvent::Close => engine.on_close(),
        HostEvent::Sleep(_) => {}
    }
    Ok(())
}

/// Counters of one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub events: usize,
    pub rejected: usize,
}

/// Replays a whole trace. Sleeps are honoured; invariant violations are
/// logged and counted, parse errors abort with the offending line number.
pub fn replay<R: BufRead>(reader: R, engine: &InputEngine) -> anyhow::Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("failed to read trace")?;
        let lineno = index + 1;
        let Some(event) = parse_line(&line).with_context(|| format!("line {lineno}"))? else {
            continue;
        };
        if let HostEvent::Sleep(duration) = event {
            std::thread::sleep(duration);
            continue;
        }
        stats.events += 1;
        if let Err(e) = apply(engine, &event) {
            warn!(line = lineno, error = %e, "event rejected");
            stats.rejected += 1;
        }
    }
    Ok(stats)
}
