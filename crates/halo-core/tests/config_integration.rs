//! Integration tests for config parsing against the real config.toml.

use std::path::PathBuf;

use halo_core::HostConfig;

fn default_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.toml")
}

#[test]
fn test_load_real_config() {
    let config = HostConfig::load(&default_config_path()).expect("failed to load config.toml");

    assert_eq!(config.log_level, "info");
    assert!(config.monitor_coalesce_ms > 0);
    assert!(config.popover_min_max_height > 0.0);
    assert_eq!(config.coordinator.path, "/");
}

#[test]
fn test_real_config_matches_embedded_default() {
    let loaded = HostConfig::load(&default_config_path()).unwrap();
    let embedded = HostConfig::from_default_toml().unwrap();
    assert_eq!(loaded, embedded);
}

#[test]
fn test_find_and_load_falls_back_to_defaults_when_nothing_found() {
    // SAFETY: test runs single-threaded within this process's env; no
    // other test in this file mutates these variables.
    let prev_xdg = std::env::var("XDG_CONFIG_HOME").ok();
    let prev_home = std::env::var("HOME").ok();
    unsafe {
        std::env::remove_var("XDG_CONFIG_HOME");
        std::env::set_var("HOME", "/nonexistent-halo-test-home");
    }

    let result = HostConfig::find_and_load(None).expect("should fall back to defaults");
    assert!(result.used_defaults);
    assert_eq!(result.config, HostConfig::default());

    unsafe {
        if let Some(v) = prev_xdg {
            std::env::set_var("XDG_CONFIG_HOME", v);
        }
        if let Some(v) = prev_home {
            std::env::set_var("HOME", v);
        }
    }
}

#[test]
fn test_find_and_load_explicit_path_errors_when_missing() {
    let result = HostConfig::find_and_load(Some(&PathBuf::from("/nonexistent/haloshell.toml")));
    assert!(result.is_err());
}
