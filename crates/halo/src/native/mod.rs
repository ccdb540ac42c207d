//! The native windowing seam (spec §4.7): every operation the rest of
//! the engine performs against a real display is expressed through this
//! trait, so the lifecycle state machines can be exercised without a
//! display server.

pub mod fake;

#[cfg(target_os = "macos")]
pub mod appkit;

use halo_core::{MonitorRecord, Rect, Result};

/// Opaque handle to a realized native window or panel. The engine never
/// inspects this; it's passed back verbatim on every subsequent call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeHandle(pub u64);

#[derive(Debug, Clone)]
pub struct NativeWindowSpec {
    pub rect: Rect,
    pub url: String,
    pub transparent: bool,
    pub always_on_top: bool,
    pub resizable: bool,
    pub decorations: bool,
    pub skip_taskbar: bool,
    pub click_through: bool,
}

#[derive(Debug, Clone)]
pub struct NativePanelSpec {
    pub rect: Rect,
    pub url: String,
}

/// Callback invoked with the freshly observed monitor snapshot whenever
/// the platform reports a topology change.
pub type MonitorChangeSink = Box<dyn Fn(Vec<MonitorRecord>) + Send>;

/// Callback invoked when a panel's native window resigns key / loses
/// focus (spec §4.5 dismissal semantics).
pub type BlurSink = Box<dyn Fn() + Send>;

/// Token returned by `watch_monitors`; dropping it should not itself
/// tear down the watch (the engine owns the backend for its lifetime;
/// per-call subscription teardown isn't exercised by this workspace).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorWatchToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurWatchToken(pub u64);

/// The seam between the lifecycle engine and a real display server
/// (spec §4.7). One implementation per platform; `FakeNativeBackend`
/// backs the test suite and any build that isn't `target_os = "macos"`.
pub trait NativeBackend: Send + Sync {
    fn create_window(&self, spec: NativeWindowSpec) -> Result<NativeHandle>;
    fn set_rect(&self, handle: &NativeHandle, rect: Rect) -> Result<()>;
    fn set_visible(&self, handle: &NativeHandle, visible: bool) -> Result<()>;
    fn close(&self, handle: &NativeHandle) -> Result<()>;

    fn create_panel(&self, spec: NativePanelSpec) -> Result<NativeHandle>;
    fn resize_panel(&self, handle: &NativeHandle, w: f64, h: f64) -> Result<()>;

    fn list_monitors(&self) -> Result<Vec<MonitorRecord>>;
    fn watch_monitors(&self, sink: MonitorChangeSink) -> MonitorWatchToken;
    fn watch_panel_blur(&self, handle: &NativeHandle, sink: BlurSink) -> BlurWatchToken;
}
