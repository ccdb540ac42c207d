//! macOS `NativeBackend`, grounded in the Apple-target section of the
//! winit example repo for `NSScreen` enumeration and block-based
//! `NSNotificationCenter` observation, and in the Tauri-plugin-nspanel
//! isa-swizzle pattern for non-activating floating panels (spec §4.7).
//!
//! Windows are created as ordinary borderless `NSWindow`s. Panels are
//! created the same way, then swizzled to `NSPanel` with the
//! `NonactivatingPanel` style mask so opening one never steals key focus
//! from the frontmost application — the behavior spec §4.5 requires.

use std::collections::HashMap;
use std::ptr::NonNull;

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::{AnyObject, ProtocolObject};
use objc2::{define_class, msg_send, ClassType, DefinedClass};
use objc2_app_kit::{
    NSApplication, NSBackingStoreType, NSScreen, NSWindow, NSWindowCollectionBehavior,
    NSWindowDelegate, NSWindowStyleMask,
};
use objc2_foundation::{
    MainThreadMarker, NSNotification, NSNotificationCenter, NSObject, NSObjectProtocol, NSPoint,
    NSRect, NSSize, NSString,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use halo_core::{Error, MonitorRecord, Rect, Result};

use super::{
    BlurSink, BlurWatchToken, MonitorChangeSink, MonitorWatchToken, NativeBackend, NativeHandle,
    NativePanelSpec, NativeWindowSpec,
};

/// `NSWindowStyleMaskNonactivatingPanel`. Not exposed by `objc2-app-kit`
/// as a named constant at the version pinned here, so the raw bit is
/// used directly, the same way the Tauri-plugin-nspanel reference code
/// does.
const NS_NONACTIVATING_PANEL_MASK: usize = 1 << 7;

/// The ivars behind `BlurDelegate`: the one callback `watch_panel_blur`
/// wants run when the panel resigns key.
pub struct BlurDelegateIvars {
    sink: BlurSink,
}

define_class!(
    #[unsafe(super(NSObject))]
    #[name = "HaloPanelBlurDelegate"]
    #[ivars = BlurDelegateIvars]
    struct BlurDelegate;

    unsafe impl NSObjectProtocol for BlurDelegate {}

    unsafe impl NSWindowDelegate for BlurDelegate {
        #[unsafe(method(windowDidResignKey:))]
        fn window_did_resign_key(&self, _notification: Option<&AnyObject>) {
            (self.ivars().sink)();
        }
    }
);

impl BlurDelegate {
    fn new(mtm: MainThreadMarker, sink: BlurSink) -> Retained<Self> {
        let this = Self::alloc(mtm).set_ivars(BlurDelegateIvars { sink });
        unsafe { msg_send![super(this), init] }
    }
}

struct Surface {
    window: Retained<NSWindow>,
    // Kept alive for as long as the surface exists: `NSWindow::delegate`
    // is a weak reference, so nothing else holds this once installed.
    blur_delegate: Option<Retained<BlurDelegate>>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    surfaces: HashMap<u64, Surface>,
}

pub struct AppKitBackend {
    mtm: MainThreadMarker,
    state: Mutex<State>,
}

impl AppKitBackend {
    /// Must be called on the main thread: `NSWindow`/`NSScreen` creation
    /// is only valid there, same constraint the winit macOS backend
    /// documents.
    pub fn new() -> Result<Self> {
        let mtm = MainThreadMarker::new().ok_or_else(|| {
            Error::NativeCreateFailed("AppKitBackend must be constructed on the main thread".into())
        })?;
        // Ensures a shared NSApplication exists before any window is made.
        let _app = NSApplication::sharedApplication(mtm);
        Ok(Self {
            mtm,
            state: Mutex::new(State::default()),
        })
    }

    fn new_window(&self, rect: Rect, transparent: bool, resizable: bool) -> Retained<NSWindow> {
        let content_rect = NSRect::new(
            NSPoint::new(rect.x, rect.y),
            NSSize::new(rect.w, rect.h),
        );
        let mut style_mask = NSWindowStyleMask::Borderless;
        if resizable {
            style_mask |= NSWindowStyleMask::Resizable;
        }

        let window = unsafe {
            NSWindow::initWithContentRect_styleMask_backing_defer(
                NSWindow::alloc(self.mtm),
                content_rect,
                style_mask,
                NSBackingStoreType::Buffered,
                false,
            )
        };

        unsafe {
            window.setOpaque(!transparent);
            window.setHasShadow(!transparent);
            window.setHidesOnDeactivate(false);
        }

        window
    }

    fn insert(&self, window: Retained<NSWindow>) -> NativeHandle {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.surfaces.insert(
            id,
            Surface {
                window,
                blur_delegate: None,
            },
        );
        NativeHandle(id)
    }

    fn with_window<T>(&self, handle: &NativeHandle, f: impl FnOnce(&NSWindow) -> T) -> Result<T> {
        let state = self.state.lock();
        let surface = state
            .surfaces
            .get(&handle.0)
            .ok_or_else(|| Error::NotFound(format!("native handle {}", handle.0)))?;
        Ok(f(&surface.window))
    }

    /// Runtime isa-swizzle of a plain `NSWindow` into `NSPanel`, applying
    /// the non-activating style mask and a collection behavior that
    /// follows the active space without joining the app-switcher cycle.
    fn make_non_activating_panel(&self, window: &NSWindow) {
        unsafe {
            let obj: &AnyObject = std::mem::transmute(window);
            let panel_class = objc2::runtime::AnyClass::get(c"NSPanel")
                .expect("NSPanel class must be linked into AppKit");
            objc2::ffi::object_setClass(
                obj as *const AnyObject as *mut AnyObject as *mut _,
                panel_class as *const _ as *mut _,
            );

            let current_mask: usize = msg_send![window, styleMask];
            let new_mask = current_mask | NS_NONACTIVATING_PANEL_MASK;
            let _: () = msg_send![window, setStyleMask: new_mask];

            let behavior = NSWindowCollectionBehavior::CanJoinAllSpaces
                | NSWindowCollectionBehavior::Stationary
                | NSWindowCollectionBehavior::IgnoresCycle;
            window.setCollectionBehavior(behavior);
            window.setHidesOnDeactivate(false);
        }
    }

    /// Re-enumerate `NSScreen::screens`, same logic `list_monitors` uses,
    /// shared with the change-notification handler so both paths agree
    /// on primary-monitor ordering.
    fn screens_to_records(mtm: MainThreadMarker) -> Result<Vec<MonitorRecord>> {
        let screens = NSScreen::screens(mtm);
        if screens.is_empty() {
            warn!("NSScreen::screens returned no displays");
            return Err(Error::NoDisplays);
        }

        let main_frame = NSScreen::mainScreen(mtm).map(|s| unsafe { s.frame() });

        let mut monitors = Vec::with_capacity(screens.len());
        for screen in screens.iter() {
            let frame = unsafe { screen.frame() };
            let scale = unsafe { screen.backingScaleFactor() };
            let name = screen.localizedName().to_string();
            let is_primary = main_frame.is_some_and(|m| {
                (m.origin.x - frame.origin.x).abs() < f64::EPSILON
                    && (m.origin.y - frame.origin.y).abs() < f64::EPSILON
            });

            let mut record = MonitorRecord::new(
                name,
                frame.origin.x,
                frame.origin.y,
                frame.size.width,
                frame.size.height,
            );
            record.scale_factor = scale;
            if is_primary {
                monitors.insert(0, record);
            } else {
                monitors.push(record);
            }
        }

        Ok(monitors)
    }
}

impl NativeBackend for AppKitBackend {
    fn create_window(&self, spec: NativeWindowSpec) -> Result<NativeHandle> {
        let window = self.new_window(spec.rect, spec.transparent, spec.resizable);
        unsafe {
            window.setIgnoresMouseEvents(spec.click_through);
            if spec.always_on_top {
                // NSWindowLevel floating.
                window.setLevel(3);
            }
            let title = NSString::from_str(&spec.url);
            window.setTitle(&title);
        }
        debug!(url = %spec.url, "created native window");
        Ok(self.insert(window))
    }

    fn set_rect(&self, handle: &NativeHandle, rect: Rect) -> Result<()> {
        self.with_window(handle, |window| unsafe {
            let frame = NSRect::new(NSPoint::new(rect.x, rect.y), NSSize::new(rect.w, rect.h));
            window.setFrame_display(frame, true);
        })
    }

    fn set_visible(&self, handle: &NativeHandle, visible: bool) -> Result<()> {
        self.with_window(handle, |window| unsafe {
            if visible {
                window.makeKeyAndOrderFront(None);
            } else {
                window.orderOut(None);
            }
        })
    }

    fn close(&self, handle: &NativeHandle) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(surface) = state.surfaces.remove(&handle.0) {
            unsafe { surface.window.close() };
        }
        Ok(())
    }

    fn create_panel(&self, spec: NativePanelSpec) -> Result<NativeHandle> {
        let window = self.new_window(spec.rect, true, false);
        self.make_non_activating_panel(&window);
        unsafe {
            let title = NSString::from_str(&spec.url);
            window.setTitle(&title);
        }
        debug!(url = %spec.url, "created non-activating panel");
        Ok(self.insert(window))
    }

    fn resize_panel(&self, handle: &NativeHandle, w: f64, h: f64) -> Result<()> {
        self.with_window(handle, |window| unsafe {
            let mut frame = window.frame();
            frame.size = NSSize::new(w, h);
            window.setFrame_display(frame, true);
        })
    }

    fn list_monitors(&self) -> Result<Vec<MonitorRecord>> {
        Self::screens_to_records(self.mtm)
    }

    fn watch_monitors(&self, sink: MonitorChangeSink) -> MonitorWatchToken {
        let center = unsafe { NSNotificationCenter::defaultCenter() };
        let name = NSString::from_str("NSApplicationDidChangeScreenParametersNotification");

        // `addObserverForName:object:queue:usingBlock:` copies the block,
        // so there is nothing of ours left to keep alive after this call
        // returns; `queue: None` runs the handler on the thread that
        // posts the notification, which for this one is always main.
        let block = RcBlock::new(move |_note: NonNull<NSNotification>| {
            let Some(mtm) = MainThreadMarker::new() else {
                warn!("screen-parameters notification fired off the main thread");
                return;
            };
            match Self::screens_to_records(mtm) {
                Ok(records) => sink(records),
                Err(e) => warn!(error = %e, "failed to re-enumerate monitors after a topology change"),
            }
        });

        let _observer: Retained<AnyObject> = unsafe {
            msg_send![
                &center,
                addObserverForName: Some(&*name),
                object: Option::<&AnyObject>::None,
                queue: Option::<&AnyObject>::None,
                usingBlock: &*block,
            ]
        };

        MonitorWatchToken(0)
    }

    fn watch_panel_blur(&self, handle: &NativeHandle, sink: BlurSink) -> BlurWatchToken {
        let mut state = self.state.lock();
        let Some(surface) = state.surfaces.get_mut(&handle.0) else {
            warn!(handle = handle.0, "watch_panel_blur on an unknown native handle");
            return BlurWatchToken(0);
        };

        let delegate = BlurDelegate::new(self.mtm, sink);
        let protocol_delegate = ProtocolObject::from_ref(&*delegate);
        unsafe { surface.window.setDelegate(Some(protocol_delegate)) };
        surface.blur_delegate = Some(delegate);

        BlurWatchToken(handle.0)
    }
}
