//! Headless trace replayer.
//!
//! Reads a host event trace from stdin, runs it through an input engine
//! attached to a stand-in window and guest, and prints every event the
//! guest receives on stdout.
//!
//! Usage: `inputshim [--config PATH] [--activity] [--verbose] < trace.txt`

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};
use tracing::info;

use inputshim::codec::{ActivityKeyEvent, ActivityMotionEvent, QueuedEvent};
use inputshim::config::Settings;
use inputshim::engine::{Collaborators, InputEngine};
use inputshim::host::{GuestAdapter, HostWindow, KeyAction, KeyMods, TextInputHandler};
use inputshim::{logging, replay};

struct Options {
    config: PathBuf,
    activity: bool,
    verbose: bool,
}

fn parse_args() -> Result<Options> {
    let mut options = Options {
        config: PathBuf::from("inputshim.toml"),
        activity: false,
        verbose: false,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(path) => options.config = PathBuf::from(path),
                None => bail!("--config needs a path"),
            },
            "--activity" => options.activity = true,
            "--verbose" => options.verbose = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(options)
}

/// Output shared by the stand-in collaborators.
#[derive(Clone)]
struct Printer(Arc<Mutex<io::Stdout>>);

impl Printer {
    fn line(&self, text: std::fmt::Arguments<'_>) {
        let mut out = self.0.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(out, "{text}");
    }
}

struct HeadlessWindow {
    out: Printer,
    cursor_disabled: AtomicBool,
}

impl HostWindow for HeadlessWindow {
    fn set_cursor_disabled(&self, disabled: bool) {
        self.cursor_disabled.store(disabled, Ordering::Release);
        self.out.line(format_args!("window cursor_disabled={disabled}"));
    }

    fn cursor_disabled(&self) -> bool {
        self.cursor_disabled.load(Ordering::Acquire)
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        self.out.line(format_args!("window fullscreen={fullscreen}"));
    }

    fn set_clipboard_text(&self, text: &str) {
        self.out.line(format_args!("window clipboard={text:?}"));
    }

    fn start_text_input(&self) {
        self.out.line(format_args!("window text_input=start"));
    }

    fn stop_text_input(&self) {
        self.out.line(format_args!("window text_input=stop"));
    }

    fn window_size(&self) -> (i32, i32) {
        (1280, 720)
    }
}

struct PrintingText {
    out: Printer,
}

impl TextInputHandler for PrintingText {
    fn on_key_pressed(&self, key_code: i32, action: KeyAction, mods: KeyMods) {
        self.out
            .line(format_args!("text key={key_code} action={action:?} mods={:#x}", mods.0));
    }

    fn on_text_input(&self, text: &str) {
        self.out.line(format_args!("text input={text:?}"));
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

struct PrintingGuest {
    out: Printer,
    activity: bool,
    text: PrintingText,
}

impl PrintingGuest {
    fn motion(&self, event: &ActivityMotionEvent) {
        let pointers: Vec<String> = event
            .active_pointers()
            .iter()
            .map(|p| format!("{}@{},{}", p.id, p.raw_x, p.raw_y))
            .collect();
        self.out.line(format_args!(
            "guest motion source={:#x} device={} action={} buttons={:#x} pointers=[{}]",
            event.source,
            event.device_id,
            event.action,
            event.button_state,
            pointers.join(" ")
        ));
    }
}

impl GuestAdapter for PrintingGuest {
    fn is_activity_protocol(&self) -> bool {
        self.activity
    }

    fn send_key_down(&self, event: &ActivityKeyEvent) {
        self.out.line(format_args!(
            "guest key_down source={:#x} device={} code={} meta={:#x}",
            event.source, event.device_id, event.key_code, event.meta_state
        ));
    }

    fn send_key_up(&self, event: &ActivityKeyEvent) {
        self.out.line(format_args!(
            "guest key_up source={:#x} device={} code={} meta={:#x}",
            event.source, event.device_id, event.key_code, event.meta_state
        ));
    }

    fn send_motion_event(&self, event: &ActivityMotionEvent) {
        self.motion(event);
    }

    fn set_game_controller_connected(&self, id: i32, connected: bool) {
        self.out
            .line(format_args!("guest controller id={id} connected={connected}"));
    }

    fn on_window_resized(&self, width: i32, height: i32) {
        self.out.line(format_args!("guest resized {width}x{height}"));
    }

    fn on_window_closed(&self) {
        self.out.line(format_args!("guest closed"));
    }

    fn on_return_key_pressed(&self) {
        self.out.line(format_args!("guest return"));
    }

    fn import_file(&self, path: &str) {
        self.out.line(format_args!("guest import {path}"));
    }

    fn text_input(&self) -> &dyn TextInputHandler {
        &self.text
    }
}

fn print_queued(out: &Printer, rec: &QueuedEvent) {
    if rec.is_key() {
        out.line(format_args!(
            "queue key source={:#x} device={} action={} code={} meta={:#x}",
            rec.source, rec.device_id, rec.action, rec.key_code, rec.meta_state
        ));
    } else {
        out.line(format_args!(
            "queue motion source={:#x} device={} action={} pointer={}@{},{} buttons={:#x}",
            rec.source, rec.device_id, rec.action, rec.pointer_id, rec.x, rec.y, rec.button_state
        ));
    }
}

fn main() -> Result<()> {
    let options = parse_args()?;
    logging::init(options.verbose);

    let settings = Arc::new(Settings::open(&options.config)?);
    let config = settings.engine_config();

    let out = Printer(Arc::new(Mutex::new(io::stdout())));
    let engine = Arc::new(InputEngine::new(
        &config,
        Collaborators {
            window: Arc::new(HeadlessWindow {
                out: out.clone(),
                cursor_disabled: AtomicBool::new(false),
            }),
            settings,
            guest: Arc::new(PrintingGuest {
                out: out.clone(),
                activity: options.activity,
                text: PrintingText { out: out.clone() },
            }),
            overlay: None,
        },
    ));

    let done = Arc::new(AtomicBool::new(false));
    let poller = engine.queue().cloned().map(|queue| {
        let out = out.clone();
        let done = done.clone();
        thread::spawn(move || {
            let receiver = queue.receiver();
            loop {
                match receiver.recv_timeout(Duration::from_millis(20)) {
                    Ok(rec) => print_queued(&out, &rec),
                    Err(_) if done.load(Ordering::Acquire) && receiver.is_empty() => break,
                    Err(_) => {}
                }
            }
        })
    });

    let stats = replay::replay(io::stdin().lock(), &engine)?;
    done.store(true, Ordering::Release);
    if let Some(poller) = poller
        && poller.join().is_err()
    {
        bail!("guest poll thread panicked");
    }

    info!(
        events = stats.events,
        rejected = stats.rejected,
        mode = ?engine.input_mode(),
        "replay finished"
    );
    Ok(())
}
