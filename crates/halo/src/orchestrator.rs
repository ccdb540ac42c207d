//! Coordinator Orchestrator (spec §4.6): role detection, pending/
//! completed window id tracking, `wait_for_all`, `hide_self`, and
//! broadcasting `MonitorTopologyChanged`/`ExternalEvent` to subscribers.
//!
//! Per spec §9 Design Note "Global state": this is an owned structure
//! constructed at startup (`Engine` holds one), not an ambient
//! `thread_local!` singleton.

use std::collections::HashSet;
use std::sync::Condvar;
use std::sync::Mutex;

use halo_core::event::Event;
use halo_core::ContextDescriptor;

type Subscriber = Box<dyn Fn(&Event) + Send>;

/// A coordinator was launched without a `window`/`popover` context; a
/// child has one of those set (spec §4.6 "Role detection").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRole {
    Coordinator,
    Child,
}

impl ProcessRole {
    pub fn detect(context: &ContextDescriptor) -> Self {
        match context {
            ContextDescriptor::Coordinator => ProcessRole::Coordinator,
            ContextDescriptor::InlineWindow { .. } | ContextDescriptor::Popover { .. } => {
                ProcessRole::Child
            }
        }
    }
}

struct PendingState {
    pending: HashSet<String>,
}

pub struct Orchestrator {
    role: ProcessRole,
    pending: Mutex<PendingState>,
    pending_changed: Condvar,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl Orchestrator {
    pub fn new(role: ProcessRole) -> Self {
        Self {
            role,
            pending: Mutex::new(PendingState {
                pending: HashSet::new(),
            }),
            pending_changed: Condvar::new(),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    /// Mark `id` pending from the moment the application declares it
    /// until `InlineWindowController::create` reports the surface
    /// realized.
    pub fn mark_pending(&self, id: impl Into<String>) {
        self.pending.lock().unwrap().pending.insert(id.into());
    }

    pub fn mark_completed(&self, id: &str) {
        let mut state = self.pending.lock().unwrap();
        state.pending.remove(id);
        if state.pending.is_empty() {
            self.pending_changed.notify_all();
        }
    }

    /// Blocks the calling thread until the pending set is empty. There
    /// is no internal timeout (spec §4.6 failure semantics): a caller
    /// that never completes a pending window blocks forever here, by
    /// design — callers enforce their own policy.
    pub fn wait_for_all(&self) {
        let mut state = self.pending.lock().unwrap();
        while !state.pending.is_empty() {
            state = self.pending_changed.wait(state).unwrap();
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().pending.len()
    }

    pub fn subscribe(&self, sink: Subscriber) {
        self.subscribers.lock().unwrap().push(sink);
    }

    /// Broadcast an event to every subscriber. The caller is responsible
    /// for having already defensively copied any shared state into the
    /// event (spec §5 "Shared resource policy").
    pub fn broadcast(&self, event: Event) {
        for sink in self.subscribers.lock().unwrap().iter() {
            sink(&event);
        }
    }
}
