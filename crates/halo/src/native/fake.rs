//! In-memory `NativeBackend` used by the test suite and by any build
//! that isn't `target_os = "macos"` (spec §4.7). Never touches a real
//! display; `simulate_topology_change` / `simulate_blur` let tests drive
//! the same triggers a real platform callback would fire.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::warn;

use halo_core::{Error, MonitorRecord, Rect, Result};

use super::{
    BlurSink, BlurWatchToken, MonitorChangeSink, MonitorWatchToken, NativeBackend, NativeHandle,
    NativePanelSpec, NativeWindowSpec,
};

struct FakeSurface {
    rect: Rect,
    visible: bool,
    #[allow(dead_code)]
    url: String,
}

#[derive(Default)]
struct State {
    next_id: u64,
    surfaces: HashMap<u64, FakeSurface>,
    monitors: Vec<MonitorRecord>,
    monitor_sinks: HashMap<u64, MonitorChangeSink>,
    blur_sinks: HashMap<u64, (u64, BlurSink)>,
    next_watch_id: u64,
}

/// Non-native `NativeBackend`. Construct with `FakeNativeBackend::new`
/// for a one-monitor default, or `with_monitors` to seed a custom
/// topology for multi-monitor tests (spec §8 scenario 2).
pub struct FakeNativeBackend {
    state: Mutex<State>,
}

impl FakeNativeBackend {
    pub fn new() -> Self {
        Self::with_monitors(vec![MonitorRecord::new("primary", 0.0, 0.0, 1440.0, 900.0)])
    }

    pub fn with_monitors(monitors: Vec<MonitorRecord>) -> Self {
        Self {
            state: Mutex::new(State {
                monitors,
                ..State::default()
            }),
        }
    }

    pub fn simulate_topology_change(&self, monitors: Vec<MonitorRecord>) {
        let mut state = self.state.lock();
        state.monitors = monitors.clone();
        for sink in state.monitor_sinks.values() {
            sink(monitors.clone());
        }
    }

    pub fn simulate_blur(&self, handle: &NativeHandle) {
        let state = self.state.lock();
        for (surface_id, sink) in state.blur_sinks.values() {
            if *surface_id == handle.0 {
                sink();
            }
        }
    }

    pub fn rect_of(&self, handle: &NativeHandle) -> Option<Rect> {
        self.state.lock().surfaces.get(&handle.0).map(|s| s.rect)
    }

    pub fn is_visible(&self, handle: &NativeHandle) -> bool {
        self.state
            .lock()
            .surfaces
            .get(&handle.0)
            .map(|s| s.visible)
            .unwrap_or(false)
    }
}

impl Default for FakeNativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeBackend for FakeNativeBackend {
    fn create_window(&self, spec: NativeWindowSpec) -> Result<NativeHandle> {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.surfaces.insert(
            id,
            FakeSurface {
                rect: spec.rect,
                visible: true,
                url: spec.url,
            },
        );
        Ok(NativeHandle(id))
    }

    fn set_rect(&self, handle: &NativeHandle, rect: Rect) -> Result<()> {
        let mut state = self.state.lock();
        match state.surfaces.get_mut(&handle.0) {
            Some(surface) => {
                surface.rect = rect;
                Ok(())
            }
            None => Err(Error::NotFound(format!("native handle {}", handle.0))),
        }
    }

    fn set_visible(&self, handle: &NativeHandle, visible: bool) -> Result<()> {
        let mut state = self.state.lock();
        match state.surfaces.get_mut(&handle.0) {
            Some(surface) => {
                surface.visible = visible;
                Ok(())
            }
            None => Err(Error::NotFound(format!("native handle {}", handle.0))),
        }
    }

    fn close(&self, handle: &NativeHandle) -> Result<()> {
        let mut state = self.state.lock();
        state.surfaces.remove(&handle.0);
        state.blur_sinks.remove(&handle.0);
        Ok(())
    }

    fn create_panel(&self, spec: NativePanelSpec) -> Result<NativeHandle> {
        self.create_window(NativeWindowSpec {
            rect: spec.rect,
            url: spec.url,
            transparent: true,
            always_on_top: false,
            resizable: false,
            decorations: false,
            skip_taskbar: true,
            click_through: false,
        })
    }

    fn resize_panel(&self, handle: &NativeHandle, w: f64, h: f64) -> Result<()> {
        let mut state = self.state.lock();
        match state.surfaces.get_mut(&handle.0) {
            Some(surface) => {
                surface.rect.w = w;
                surface.rect.h = h;
                Ok(())
            }
            None => Err(Error::NotFound(format!("native handle {}", handle.0))),
        }
    }

    fn list_monitors(&self) -> Result<Vec<MonitorRecord>> {
        let state = self.state.lock();
        if state.monitors.is_empty() {
            warn!("fake backend has no monitors registered");
            return Err(Error::NoDisplays);
        }
        Ok(state.monitors.clone())
    }

    fn watch_monitors(&self, sink: MonitorChangeSink) -> MonitorWatchToken {
        let mut state = self.state.lock();
        let id = state.next_watch_id;
        state.next_watch_id += 1;
        state.monitor_sinks.insert(id, sink);
        MonitorWatchToken(id)
    }

    fn watch_panel_blur(&self, handle: &NativeHandle, sink: BlurSink) -> BlurWatchToken {
        let mut state = self.state.lock();
        let id = state.next_watch_id;
        state.next_watch_id += 1;
        state.blur_sinks.insert(id, (handle.0, sink));
        BlurWatchToken(id)
    }
}
