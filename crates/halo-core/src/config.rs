//! Host configuration: the ambient knobs the engine needs to run as a
//! library host, independent of whatever windows/popovers the embedding
//! application declares.
//!
//! An explicit `--config` path is used strictly (no fallback on
//! failure); the XDG search chain falls back to built-in defaults only
//! when *no* config file exists anywhere, and treats a config file that
//! exists but fails to parse as a hard error.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default configuration TOML, compiled into the binary.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config.toml");

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: HostConfig,
    pub source: Option<PathBuf>,
    pub used_defaults: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    pub origin: String,
    pub path: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            origin: "app://localhost".to_string(),
            path: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub log_level: String,
    pub monitor_coalesce_ms: u64,
    pub popover_min_max_height: f64,
    /// Empty string means "use the platform temp dir" — resolved lazily
    /// by `resolved_ipc_socket_path` rather than baked into the default
    /// TOML, since the temp dir is environment-dependent.
    pub ipc_socket_path: String,
    pub coordinator: CoordinatorConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            monitor_coalesce_ms: 150,
            popover_min_max_height: 1.0,
            ipc_socket_path: String::new(),
            coordinator: CoordinatorConfig::default(),
        }
    }
}

impl HostConfig {
    pub fn from_default_toml() -> Result<Self> {
        Ok(toml::from_str(DEFAULT_CONFIG_TOML)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Resolve `ipc_socket_path`, falling back to `$TMPDIR/haloshell.sock`
    /// when unset.
    pub fn resolved_ipc_socket_path(&self) -> PathBuf {
        if self.ipc_socket_path.is_empty() {
            env::temp_dir().join("haloshell.sock")
        } else {
            PathBuf::from(&self.ipc_socket_path)
        }
    }

    /// Find and load configuration using the XDG lookup chain.
    ///
    /// If `explicit_path` is `Some`, that path is used directly and an
    /// error is returned if it doesn't exist or can't be parsed (no
    /// fallback). Otherwise searches, in order:
    /// 1. `$XDG_CONFIG_HOME/haloshell/config.toml`
    /// 2. `~/.config/haloshell/config.toml`
    /// 3. `./haloshell.toml`
    ///
    /// If no config file is found anywhere, returns the built-in default.
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<ConfigLoadResult> {
        if let Some(path) = explicit_path {
            let config = Self::load(path)?;
            return Ok(ConfigLoadResult {
                config,
                source: Some(path.to_path_buf()),
                used_defaults: false,
            });
        }

        let search_paths = Self::config_search_paths();
        let mut first_error: Option<(PathBuf, Error)> = None;

        for path in &search_paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        return Ok(ConfigLoadResult {
                            config,
                            source: Some(path.clone()),
                            used_defaults: false,
                        });
                    }
                    Err(e) => {
                        if first_error.is_none() {
                            first_error = Some((path.clone(), e));
                        }
                    }
                }
            }
        }

        if let Some((path, error)) = first_error {
            tracing::error!("config file {:?} exists but failed to load: {}", path, error);
            return Err(error);
        }

        tracing::info!("no config file found, using built-in defaults");
        let config = Self::from_default_toml()?;
        Ok(ConfigLoadResult {
            config,
            source: None,
            used_defaults: true,
        })
    }

    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("haloshell/config.toml"));
        }
        if let Ok(home) = env::var("HOME") {
            paths.push(PathBuf::from(home).join(".config/haloshell/config.toml"));
        }
        paths.push(PathBuf::from("./haloshell.toml"));

        paths
    }
}
