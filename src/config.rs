//! Engine configuration and the in-memory settings store.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::host::SettingsStore;
use crate::mode::{ArbiterPolicy, InputMode};
use crate::util::{read_env_flag, read_env_int};

pub const ENV_RAW_INPUT: &str = "INPUTSHIM_RAW_INPUT";
pub const ENV_FORCED_INPUT_MODE: &str = "INPUTSHIM_FORCED_INPUT_MODE";
pub const ENV_INPUT_SWITCH_DELAY: &str = "INPUTSHIM_INPUT_SWITCH_DELAY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default = "default_switch_delay")]
    pub input_mode_switch_delay: u64,
    #[serde(default)]
    pub raw_input: bool,
    #[serde(default = "default_forced_input_mode")]
    pub forced_input_mode: i32,
    #[serde(default)]
    pub menubar_size: i32,
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub emulate_touch: bool,
    #[serde(default)]
    pub paste_patch: bool,
}

fn default_switch_delay() -> u64 {
    100
}
fn default_forced_input_mode() -> i32 {
    InputMode::Unknown as i32
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            input_mode_switch_delay: default_switch_delay(),
            raw_input: false,
            forced_input_mode: default_forced_input_mode(),
            menubar_size: 0,
            fullscreen: false,
            emulate_touch: false,
            paste_patch: false,
        }
    }
}

impl EngineConfig {
    /// Load config from file, or create default if not exists
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if !path.as_ref().exists() {
            let default_config = Self::default();
            default_config.save_to_file(&path)?;
            return Ok(default_config);
        }
        Self::load_from_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: EngineConfig = toml::from_str(&content)?;
        config.validate();
        Ok(config)
    }

    fn validate(&mut self) {
        if !(0..=InputMode::Unknown as i32).contains(&self.forced_input_mode) {
            self.forced_input_mode = default_forced_input_mode();
        }
        if self.menubar_size < 0 {
            self.menubar_size = 0;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let commented = format!(
            "input_mode_switch_delay = {}   # Idle time (ms) before another input mode may take over\n\
             raw_input = {}               # Deliver every event regardless of the active input mode\n\
             forced_input_mode = {}         # Pin the input mode (0 = touch, 1 = mouse, 2 = gamepad, 3 = off)\n\
             menubar_size = {}              # Height of the reserved strip at the top of the window\n\
             fullscreen = {}              # Start in fullscreen\n\
             emulate_touch = {}           # Deliver mouse input as touch\n\
             paste_patch = {}             # Replay pastes two frames late\n",
            self.input_mode_switch_delay,
            self.raw_input,
            self.forced_input_mode,
            self.menubar_size,
            self.fullscreen,
            self.emulate_touch,
            self.paste_patch,
        );
        fs::write(path, commented)?;
        Ok(())
    }

    /// Applies the environment overrides on top of the loaded values.
    pub fn apply_env_overrides(&mut self) {
        self.raw_input = read_env_flag(ENV_RAW_INPUT, self.raw_input);
        let forced = read_env_int(ENV_FORCED_INPUT_MODE, i64::from(self.forced_input_mode));
        self.forced_input_mode = i32::try_from(forced).unwrap_or(default_forced_input_mode());
        let delay = read_env_int(
            ENV_INPUT_SWITCH_DELAY,
            i64::try_from(self.input_mode_switch_delay).unwrap_or(i64::MAX),
        );
        if let Ok(delay) = u64::try_from(delay) {
            self.input_mode_switch_delay = delay;
        }
        self.validate();
        debug!(
            raw_input = self.raw_input,
            forced_input_mode = self.forced_input_mode,
            switch_delay = self.input_mode_switch_delay,
            "input config resolved"
        );
    }

    pub fn arbiter_policy(&self) -> ArbiterPolicy {
        ArbiterPolicy {
            raw_input: self.raw_input,
            forced_mode: InputMode::from_i32(self.forced_input_mode),
            switch_delay: Duration::from_millis(self.input_mode_switch_delay),
        }
    }
}

/// Runtime settings shared with the host, persisted back to the config file.
pub struct Settings {
    base: EngineConfig,
    path: Option<PathBuf>,
    fullscreen: AtomicBool,
    menubar_size: AtomicI32,
    paste_patch: AtomicBool,
    clipboard: Mutex<String>,
}

impl Settings {
    pub fn new(config: EngineConfig, path: Option<PathBuf>) -> Self {
        Self {
            fullscreen: AtomicBool::new(config.fullscreen),
            menubar_size: AtomicI32::new(config.menubar_size),
            paste_patch: AtomicBool::new(config.paste_patch),
            clipboard: Mutex::new(String::new()),
            base: config,
            path,
        }
    }

    /// Opens the config file at `path`, creating it with defaults when
    /// missing, as the settings store persisted back to that file.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let config = EngineConfig::load_or_create(&path)?;
        Ok(Self::new(config, Some(path.as_ref().to_path_buf())))
    }

    /// Config for a new engine: the current values with the environment
    /// overrides applied. The overrides are never written back on save.
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = self.snapshot();
        config.apply_env_overrides();
        config
    }

    /// Changes the reserved strip height, e.g. when the host menu bar is resized.
    pub fn set_menubar_size(&self, size: i32) {
        self.menubar_size.store(size.max(0), Ordering::Release);
    }

    /// Last text mirrored from a paste or copy.
    pub fn clipboard(&self) -> String {
        self.clipboard
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Current values as a config.
    pub fn snapshot(&self) -> EngineConfig {
        EngineConfig {
            fullscreen: self.fullscreen(),
            menubar_size: self.menubar_size(),
            paste_patch: self.paste_patch_enabled(),
            ..self.base.clone()
        }
    }
}

impl SettingsStore for Settings {
    fn fullscreen(&self) -> bool {
        self.fullscreen.load(Ordering::Acquire)
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        self.fullscreen.store(fullscreen, Ordering::Release);
    }

    fn menubar_size(&self) -> i32 {
        self.menubar_size.load(Ordering::Acquire)
    }

    fn set_clipboard(&self, text: &str) {
        let mut clip = self.clipboard.lock().unwrap_or_else(|e| e.into_inner());
        clip.clear();
        clip.push_str(text);
    }

    fn paste_patch_enabled(&self) -> bool {
        self.paste_patch.load(Ordering::Acquire)
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = self.snapshot().save_to_file(path) {
            warn!(path = %path.display(), error = %e, "failed to save settings");
        }
    }
}
