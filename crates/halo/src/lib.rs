//! Coordinator/child process host for the haloshell panel engine: the
//! native backend seam, the window/monitor registries, the inline window
//! and popover controllers, the coordinator orchestrator, the command
//! channel, and the IPC collaborator. See `halo_core` for the pure data
//! model and geometry these are built on.

pub mod channel;
pub mod controller;
pub mod engine;
pub mod ipc;
pub mod native;
pub mod orchestrator;
pub mod registry;

pub use channel::{Command, HostHandle, Reply};
pub use engine::Engine;
pub use orchestrator::{Orchestrator, ProcessRole};
