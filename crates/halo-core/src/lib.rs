//! Pure data model and algorithms for the haloshell panel engine: window
//! and popover records, the geometry solver, the monitor registry table,
//! the spawn-time context descriptor, host configuration, error types,
//! and logging setup. No native windowing calls live here — see the
//! `halo` crate for that.

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod monitor;
pub mod popover;
pub mod window;

pub use config::HostConfig;
pub use context::ContextDescriptor;
pub use error::{Error, Result};
pub use event::Event;
pub use geometry::{PositionDescriptor, Rect, SolvedPlacement};
pub use monitor::{MonitorRecord, MonitorTable};
pub use popover::{Align, ExclusiveGroup, PopoverPlacement, PopoverRecord};
pub use window::{Role, Status, WindowConfig, WindowRecord};
