//! Error types shared by the panel engine.
//!
//! Mirrors the error kinds enumerated in the engine's lifecycle contract:
//! each variant here is surfaced to callers unchanged, never retried, and
//! never leaves partial state behind (see module docs on the controllers
//! that return these).

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `create` was requested for an id that is already live.
    #[error("window id '{0}' already exists")]
    DuplicateId(String),

    /// An operation targeted an id that is not live.
    #[error("window id '{0}' not found")]
    NotFound(String),

    /// A position descriptor has no soluble axis, or solving it would
    /// produce a non-positive dimension.
    #[error("position descriptor is unresolvable: {0}")]
    UnresolvablePosition(String),

    /// The native layer could not realize an inline window.
    #[error("failed to create native window: {0}")]
    NativeCreateFailed(String),

    /// The native layer could not realize a non-activating floating panel.
    #[error("native panel unavailable: {0}")]
    NativePanelUnavailable(String),

    /// `list()` was called on the Monitor Registry before any snapshot had
    /// arrived.
    #[error("no displays available yet")]
    NoDisplays,

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
