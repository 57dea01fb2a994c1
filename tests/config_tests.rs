//! Configuration file handling and environment overrides.

use std::fs;

use inputshim::config::{
    ENV_FORCED_INPUT_MODE, ENV_INPUT_SWITCH_DELAY, ENV_RAW_INPUT, EngineConfig, Settings,
};
use inputshim::host::SettingsStore;
use inputshim::mode::InputMode;
use serial_test::serial;
use tempfile::TempDir;

fn clear_env() {
    // SAFETY: every test touching these variables runs under `#[serial]`.
    unsafe {
        std::env::remove_var(ENV_RAW_INPUT);
        std::env::remove_var(ENV_FORCED_INPUT_MODE);
        std::env::remove_var(ENV_INPUT_SWITCH_DELAY);
    }
}

/// A missing config file is created with defaults.
#[test]
fn test_load_or_create_writes_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("inputshim.toml");

    let config = EngineConfig::load_or_create(&path).expect("Failed to load config");
    assert_eq!(config, EngineConfig::default());
    assert!(path.exists());

    let content = fs::read_to_string(&path).expect("Failed to read config");
    assert!(content.contains("input_mode_switch_delay = 100"));
    assert!(content.contains('#'));
}

#[test]
fn test_save_and_load_preserves_values() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("custom.toml");

    let config = EngineConfig {
        input_mode_switch_delay: 250,
        raw_input: true,
        forced_input_mode: 2,
        menubar_size: 24,
        fullscreen: true,
        emulate_touch: true,
        paste_patch: true,
    };
    config.save_to_file(&path).expect("Failed to save config");

    let loaded = EngineConfig::load_from_file(&path).expect("Failed to load config");
    assert_eq!(loaded, config);
}

/// Out-of-range values are clamped on load; missing keys take defaults.
#[test]
fn test_load_clamps_invalid_values() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("bad.toml");
    fs::write(&path, "forced_input_mode = 7\nmenubar_size = -5\n").expect("Failed to write");

    let loaded = EngineConfig::load_from_file(&path).expect("Failed to load config");
    assert_eq!(loaded.forced_input_mode, InputMode::Unknown as i32);
    assert_eq!(loaded.menubar_size, 0);
    assert_eq!(loaded.input_mode_switch_delay, 100);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "raw_input = \"perhaps\"\n").expect("Failed to write");

    assert!(EngineConfig::load_from_file(&path).is_err());
}

/// Saving settings writes the runtime values back to the file.
#[test]
fn test_settings_save_persists_fullscreen() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("settings.toml");
    let settings = Settings::new(EngineConfig::default(), Some(path.clone()));

    settings.set_fullscreen(true);
    settings.set_menubar_size(32);
    settings.save();

    let loaded = EngineConfig::load_from_file(&path).expect("Failed to load config");
    assert!(loaded.fullscreen);
    assert_eq!(loaded.menubar_size, 32);
}

#[test]
#[serial]
fn test_env_overrides_apply() {
    clear_env();
    // SAFETY: serialised with the other environment tests.
    unsafe {
        std::env::set_var(ENV_RAW_INPUT, "1");
        std::env::set_var(ENV_FORCED_INPUT_MODE, "0");
        std::env::set_var(ENV_INPUT_SWITCH_DELAY, "40");
    }

    let mut config = EngineConfig::default();
    config.apply_env_overrides();
    clear_env();

    assert!(config.raw_input);
    assert_eq!(config.forced_input_mode, 0);
    assert_eq!(config.input_mode_switch_delay, 40);
    let policy = config.arbiter_policy();
    assert_eq!(policy.forced_mode, InputMode::Touch);
    assert_eq!(policy.switch_delay.as_millis(), 40);
}

/// Unparseable or out-of-range overrides leave sane values behind.
#[test]
#[serial]
fn test_env_overrides_ignore_garbage() {
    clear_env();
    // SAFETY: serialised with the other environment tests.
    unsafe {
        std::env::set_var(ENV_RAW_INPUT, "sometimes");
        std::env::set_var(ENV_FORCED_INPUT_MODE, "12");
        std::env::set_var(ENV_INPUT_SWITCH_DELAY, "-3");
    }

    let mut config = EngineConfig::default();
    config.apply_env_overrides();
    clear_env();

    assert!(!config.raw_input);
    assert_eq!(config.forced_input_mode, InputMode::Unknown as i32);
    assert_eq!(config.input_mode_switch_delay, 100);
}

#[test]
#[serial]
fn test_no_env_keeps_file_values() {
    clear_env();
    let mut config = EngineConfig {
        input_mode_switch_delay: 300,
        ..Default::default()
    };
    config.apply_env_overrides();
    assert_eq!(config.input_mode_switch_delay, 300);
    assert!(!config.raw_input);
}

/// Environment overrides shape the engine config but never reach the file.
#[test]
#[serial]
fn test_env_overrides_are_not_persisted() {
    clear_env();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("inputshim.toml");
    let settings = Settings::open(&path).expect("Failed to open settings");

    // SAFETY: serialised with the other environment tests.
    unsafe {
        std::env::set_var(ENV_RAW_INPUT, "1");
        std::env::set_var(ENV_INPUT_SWITCH_DELAY, "20");
    }
    let effective = settings.engine_config();
    clear_env();
    assert!(effective.raw_input);
    assert_eq!(effective.input_mode_switch_delay, 20);

    settings.set_fullscreen(true);
    settings.save();

    let reloaded = EngineConfig::load_from_file(&path).expect("Failed to load config");
    assert!(reloaded.fullscreen);
    assert!(!reloaded.raw_input);
    assert_eq!(reloaded.input_mode_switch_delay, 100);
}
