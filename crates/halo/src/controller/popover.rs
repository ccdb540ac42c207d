//! Popover Controller (spec §4.5): anchor-relative placement,
//! auto-sizing, exclusive groups, and blur-to-dismiss.
//!
//! The record map lives behind an `Arc<Mutex<_>>` rather than being
//! threaded through every call like `WindowRegistry`, because the native
//! blur callback (spec §9 "Cyclic ownership") must be able to reach back
//! into the controller from a `'static` closure the backend holds on the
//! panel's behalf. Everything else about the engine's single-threaded
//! model is unchanged: in practice the blur callback fires from the UI
//! thread's own event delivery, never concurrently with a command being
//! processed.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use halo_core::event::Event;
use halo_core::popover::{self, Align, ExclusiveGroup, PopoverRecord};
use halo_core::{Error, MonitorTable, Rect, Result, Role, Status, WindowConfig, WindowRecord};

use crate::native::{NativeBackend, NativeHandle, NativePanelSpec};

struct Entry {
    record: PopoverRecord,
    handle: NativeHandle,
}

#[derive(Default)]
struct State {
    popovers: HashMap<String, Entry>,
    events: VecDeque<Event>,
}

impl State {
    /// Remove `id` if present, close its native panel, and push exactly
    /// one `PopoverClosed` event. No-op (no event) if `id` isn't open —
    /// this is what makes blur-then-close and close-then-blur races both
    /// resolve to at-most-once emission (spec §9 Open Question (a)).
    fn close_internal(&mut self, backend: &dyn NativeBackend, id: &str) -> bool {
        match self.popovers.remove(id) {
            Some(entry) => {
                let _ = backend.close(&entry.handle);
                self.events.push_back(Event::PopoverClosed(id.to_string()));
                true
            }
            None => false,
        }
    }
}

pub struct OpenResult {
    pub label: String,
    pub closed: bool,
    pub max_height: f64,
}

pub struct PopoverController {
    backend: Arc<dyn NativeBackend>,
    min_max_height: f64,
    state: Arc<Mutex<State>>,
}

impl PopoverController {
    pub fn new(backend: Arc<dyn NativeBackend>, min_max_height: f64) -> Self {
        Self {
            backend,
            min_max_height,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Open (or, if already open, toggle-close) a popover. See spec §4.5
    /// "Exclusive groups" for the `exclusive` semantics and the state
    /// machine diagram for the toggle contract.
    pub fn open(
        &self,
        id: &str,
        anchor: Rect,
        width: f64,
        height: f64,
        align: Align,
        offset_y: f64,
        exclusive: ExclusiveGroup,
        monitors: &MonitorTable,
    ) -> Result<OpenResult> {
        // Toggle: re-opening an already-open id closes it instead.
        {
            let mut state = self.state.lock();
            if state.close_internal(self.backend.as_ref(), id) {
                info!(id, "popover toggle-closed on re-open");
                return Ok(OpenResult {
                    label: halo_core::window::derive_label(Role::Popover, id),
                    closed: true,
                    max_height: self.min_max_height,
                });
            }
        }

        // Exclusive-group closures complete before the new open proceeds
        // (spec §5 ordering guarantees).
        self.close_matching_group(id, &exclusive);

        let placement = popover::place(anchor, width, height, align, offset_y, monitors)
            .ok_or_else(|| Error::UnresolvablePosition("anchor is not on any monitor".to_string()))?;

        let label = halo_core::window::derive_label(Role::Popover, id);
        let handle = self
            .backend
            .create_panel(NativePanelSpec {
                rect: placement.rect,
                url: format!("?popover={}&max_height={}", id, placement.max_height as i64),
            })
            .map_err(|e| Error::NativePanelUnavailable(e.to_string()))?;

        let window = WindowRecord::new(id, Role::Popover, placement.rect, None, WindowConfig::default());
        let record = PopoverRecord {
            window,
            anchor,
            align,
            offset_y,
            max_height: placement.max_height,
            exclusive_group: exclusive,
        };

        {
            let mut state = self.state.lock();
            state.popovers.insert(id.to_string(), Entry { record, handle: handle.clone() });
        }

        self.arm_blur_watch(id, &handle);

        info!(id, max_height = placement.max_height, "opened popover");
        Ok(OpenResult {
            label,
            closed: false,
            max_height: placement.max_height,
        })
    }

    fn arm_blur_watch(&self, id: &str, handle: &NativeHandle) {
        let state = self.state.clone();
        let backend = self.backend.clone();
        let id = id.to_string();
        self.backend.watch_panel_blur(
            handle,
            Box::new(move || {
                state.lock().close_internal(&*backend, &id);
            }),
        );
    }

    fn close_matching_group(&self, opening_id: &str, exclusive: &ExclusiveGroup) {
        let matching: Vec<String> = {
            let state = self.state.lock();
            state
                .popovers
                .keys()
                .filter(|existing_id| *existing_id != opening_id && popover::matches_group(existing_id, exclusive))
                .cloned()
                .collect()
        };
        for id in matching {
            let mut state = self.state.lock();
            state.close_internal(self.backend.as_ref(), &id);
        }
    }

    /// Idempotent per spec §4.5.
    pub fn close(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.close_internal(self.backend.as_ref(), id);
        Ok(())
    }

    pub fn close_all(&self) -> Result<()> {
        let ids: Vec<String> = self.state.lock().popovers.keys().cloned().collect();
        for id in ids {
            self.close(&id)?;
        }
        Ok(())
    }

    pub fn list_open(&self) -> Vec<String> {
        self.state.lock().popovers.keys().cloned().collect()
    }

    /// Clamp the caller's requested size to the panel's `max_height`
    /// (spec §4.5 auto-sizing contract).
    pub fn set_size(&self, id: &str, width: f64, height: f64) -> Result<Rect> {
        let mut state = self.state.lock();
        let entry = state
            .popovers
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let clamped_height = height.min(entry.record.max_height).max(self.min_max_height);
        self.backend.resize_panel(&entry.handle, width, clamped_height)?;
        entry.record.window.rectangle.w = width;
        entry.record.window.rectangle.h = clamped_height;
        Ok(entry.record.window.rectangle)
    }

    /// Called after `MonitorTopologyChanged`; closes any popover whose
    /// anchor no longer sits on any monitor (spec §9 Open Question (b)).
    pub fn close_popovers_with_vanished_anchor(&self, monitors: &MonitorTable) {
        let vanished: Vec<String> = {
            let state = self.state.lock();
            state
                .popovers
                .iter()
                .filter(|(_, entry)| monitors.containing_point(entry.record.anchor.x, entry.record.anchor.y).is_none())
                .map(|(id, _)| id.clone())
                .collect()
        };
        for id in vanished {
            let _ = self.close(&id);
        }
    }

    pub fn drain_events(&self) -> Vec<Event> {
        self.state.lock().events.drain(..).collect()
    }

    pub fn status_of(&self, id: &str) -> Option<Status> {
        self.state.lock().popovers.get(id).map(|e| e.record.window.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::fake::FakeNativeBackend;
    use halo_core::MonitorRecord;

    fn controller() -> (PopoverController, Arc<FakeNativeBackend>) {
        let backend = Arc::new(FakeNativeBackend::new());
        (PopoverController::new(backend.clone(), 1.0), backend)
    }

    fn monitors() -> MonitorTable {
        MonitorTable::new(vec![MonitorRecord::new("primary", 0.0, 0.0, 1440.0, 900.0)])
    }

    #[test]
    fn open_places_panel_below_anchor_and_centers() {
        let (controller, _backend) = controller();
        let anchor = Rect::new(100.0, 40.0, 24.0, 24.0);
        let result = controller
            .open("menu", anchor, 340.0, 420.0, Align::Center, 8.0, ExclusiveGroup::None, &monitors())
            .unwrap();
        assert!(!result.closed);
        assert_eq!(result.max_height, 828.0);
    }

    #[test]
    fn reopening_same_id_toggles_closed() {
        let (controller, _backend) = controller();
        let anchor = Rect::new(100.0, 40.0, 24.0, 24.0);
        controller
            .open("menu", anchor, 340.0, 420.0, Align::Center, 8.0, ExclusiveGroup::None, &monitors())
            .unwrap();
        let second = controller
            .open("menu", anchor, 340.0, 420.0, Align::Center, 8.0, ExclusiveGroup::None, &monitors())
            .unwrap();
        assert!(second.closed);
        assert!(controller.list_open().is_empty());
    }

    #[test]
    fn exclusive_group_closes_prior_members_before_opening() {
        let (controller, _backend) = controller();
        let anchor = Rect::new(0.0, 0.0, 10.0, 10.0);
        let group = ExclusiveGroup::Prefix("github".to_string());
        controller
            .open("github-issues", anchor, 100.0, 100.0, Align::Start, 0.0, group.clone(), &monitors())
            .unwrap();
        assert!(controller.drain_events().is_empty());

        controller
            .open("github-prs", anchor, 100.0, 100.0, Align::Start, 0.0, group.clone(), &monitors())
            .unwrap();
        let events = controller.drain_events();
        assert_eq!(events, vec![Event::PopoverClosed("github-issues".to_string())]);
        assert_eq!(controller.list_open(), vec!["github-prs".to_string()]);
    }

    #[test]
    fn set_size_clamps_to_max_height() {
        let (controller, backend) = controller();
        let anchor = Rect::new(0.0, 600.0, 10.0, 10.0);
        controller
            .open("p", anchor, 100.0, 100.0, Align::Start, 0.0, ExclusiveGroup::None, &monitors())
            .unwrap();
        // Remaining space below anchor is 900 - 610 = 290.
        let rect = controller.set_size("p", 400.0, 600.0).unwrap();
        assert_eq!(rect.h, 290.0);

        let rect = controller.set_size("p", 400.0, 200.0).unwrap();
        assert_eq!(rect.h, 200.0);

        let handle = {
            let state = controller.state.lock();
            state.popovers.get("p").unwrap().handle.clone()
        };
        assert_eq!(backend.rect_of(&handle).unwrap().h, 200.0);
    }

    #[test]
    fn blur_closes_panel_and_emits_closed_exactly_once_even_if_fired_twice() {
        let (controller, backend) = controller();
        let anchor = Rect::new(0.0, 0.0, 10.0, 10.0);
        controller
            .open("p", anchor, 100.0, 100.0, Align::Start, 0.0, ExclusiveGroup::None, &monitors())
            .unwrap();
        let handle = {
            let state = controller.state.lock();
            state.popovers.get("p").unwrap().handle.clone()
        };

        backend.simulate_blur(&handle);
        backend.simulate_blur(&handle);

        let events = controller.drain_events();
        assert_eq!(events, vec![Event::PopoverClosed("p".to_string())]);
        assert!(controller.list_open().is_empty());
    }

    #[test]
    fn close_all_is_idempotent_and_emits_one_event_per_popover() {
        let (controller, _backend) = controller();
        let anchor = Rect::new(0.0, 0.0, 10.0, 10.0);
        controller
            .open("a", anchor, 10.0, 10.0, Align::Start, 0.0, ExclusiveGroup::None, &monitors())
            .unwrap();
        controller
            .open("b", anchor, 10.0, 10.0, Align::Start, 0.0, ExclusiveGroup::None, &monitors())
            .unwrap();
        controller.close_all().unwrap();
        let mut events = controller.drain_events();
        events.sort_by_key(|e| format!("{e:?}"));
        assert_eq!(
            events,
            vec![
                Event::PopoverClosed("a".to_string()),
                Event::PopoverClosed("b".to_string())
            ]
        );
        assert!(controller.close_all().is_ok());
        assert!(controller.drain_events().is_empty());
    }
}
