//! Window record and configuration types (spec §3 "Window configuration",
//! "Window record").

use serde::{Deserialize, Serialize};

use crate::geometry::{PositionDescriptor, Rect};

/// The role a live window plays. Exactly one `Coordinator` record exists
/// for the process's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Coordinator,
    InlineWindow,
    Popover,
}

/// A window's lifecycle status. Enters `Pending` when create is requested,
/// moves to `Visible` after the native surface is realized and shown, may
/// transition `Visible` <-> `Hidden`, and ends in `Closed`, after which the
/// id is free for reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    Visible,
    Hidden,
    Closed,
}

/// Native window flags. Defaults per spec §3: `transparent` true,
/// `always_on_top` true for bars / false for floats (the caller decides
/// which this window is; this type just carries whatever was chosen),
/// `resizable` false, `decorations` false, `skip_taskbar` true,
/// `click_through` false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub transparent: bool,
    pub always_on_top: bool,
    pub resizable: bool,
    pub decorations: bool,
    pub skip_taskbar: bool,
    pub click_through: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            transparent: true,
            always_on_top: true,
            resizable: false,
            decorations: false,
            skip_taskbar: true,
            click_through: false,
        }
    }
}

impl WindowConfig {
    /// The documented default for a float (non-bar) inline window:
    /// everything the same as `default()` except `always_on_top: false`.
    pub fn float_default() -> Self {
        Self {
            always_on_top: false,
            ..Self::default()
        }
    }
}

/// The derived, host-facing label for a window id: `inline-window-<id>`
/// or `popover-<id>`.
pub fn derive_label(role: Role, id: &str) -> String {
    match role {
        Role::InlineWindow => format!("inline-window-{id}"),
        Role::Popover => format!("popover-{id}"),
        Role::Coordinator => "coordinator".to_string(),
    }
}

/// A live window's bookkeeping record (spec §3 "Window record").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: String,
    pub label: String,
    pub role: Role,
    pub rectangle: Rect,
    pub status: Status,
    /// The descriptor the rectangle was last solved from, kept so
    /// `MonitorTopologyChanged` can recompute it (absent for popovers,
    /// which are positioned relative to an anchor instead — see
    /// `PopoverRecord`).
    pub position: Option<PositionDescriptor>,
    pub config: WindowConfig,
}

impl WindowRecord {
    pub fn new(
        id: impl Into<String>,
        role: Role,
        rectangle: Rect,
        position: Option<PositionDescriptor>,
        config: WindowConfig,
    ) -> Self {
        let id = id.into();
        let label = derive_label(role, &id);
        Self {
            id,
            label,
            role,
            rectangle,
            status: Status::Pending,
            position,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_derived_from_role_and_id() {
        assert_eq!(derive_label(Role::InlineWindow, "bar"), "inline-window-bar");
        assert_eq!(
            derive_label(Role::Popover, "github-issues"),
            "popover-github-issues"
        );
        assert_eq!(derive_label(Role::Coordinator, "anything"), "coordinator");
    }

    #[test]
    fn bar_default_is_always_on_top_float_default_is_not() {
        assert!(WindowConfig::default().always_on_top);
        assert!(!WindowConfig::float_default().always_on_top);
    }
}
