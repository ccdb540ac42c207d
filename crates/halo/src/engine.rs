//! The owning-thread run loop: wires the registries, controllers, and
//! orchestrator together and drains `EngineMessage`s one at a time,
//! matching spec §5's single-threaded cooperative event-loop model.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use halo_core::event::Event;
use halo_core::{ContextDescriptor, HostConfig, MonitorTable, Result, Role, Status, WindowConfig, WindowRecord};

use crate::channel::{Command, EngineMessage, HostHandle, Reply};
use crate::controller::{InlineWindowController, PopoverController};
use crate::native::{NativeBackend, NativeWindowSpec};
use crate::orchestrator::{Orchestrator, ProcessRole};
use crate::registry::{MonitorRegistry, WindowRegistry};

/// There is exactly one coordinator record per process (spec §3
/// invariant); its id is fixed rather than host-chosen since the
/// coordinator surface isn't declared through `CreateInlineWindow`.
const COORDINATOR_ID: &str = "__coordinator__";

pub struct Engine {
    backend: Arc<dyn NativeBackend>,
    windows: WindowRegistry,
    monitors: MonitorRegistry,
    inline: InlineWindowController,
    popovers: PopoverController,
    orchestrator: Arc<Orchestrator>,
    sender: mpsc::Sender<EngineMessage>,
}

impl Engine {
    /// Construct the engine and its paired `HostHandle`. Call `run` with
    /// the returned receiver to start draining commands.
    pub fn new(backend: Arc<dyn NativeBackend>, config: &HostConfig, context: &ContextDescriptor) -> (Self, HostHandle, mpsc::Receiver<EngineMessage>) {
        let (sender, receiver) = mpsc::channel();

        let role = ProcessRole::detect(context);
        let inline = InlineWindowController::new(backend.clone(), config);
        let popovers = PopoverController::new(backend.clone(), config.popover_min_max_height);
        let orchestrator = Arc::new(Orchestrator::new(role));

        let mut engine = Self {
            backend: backend.clone(),
            windows: WindowRegistry::new(),
            monitors: MonitorRegistry::new(config.monitor_coalesce_ms),
            inline,
            popovers,
            orchestrator,
            sender: sender.clone(),
        };

        engine.seed_initial_monitors();
        engine.arm_monitor_watch();
        if role == ProcessRole::Coordinator {
            engine.register_coordinator_surface(config);
        }

        (engine, HostHandle::new(sender), receiver)
    }

    /// Realize the coordinator's own native surface (spec §3: "exactly
    /// one coordinator record exists for the process's lifetime"; spec
    /// §4.6: `hide_self` "hides the coordinator's own native surface").
    /// A native-creation failure here is logged rather than propagated:
    /// there is no caller to report it to at construction time, and a
    /// coordinator without its own surface can still manage children.
    fn register_coordinator_surface(&mut self, config: &HostConfig) {
        let rect = self
            .monitors
            .list()
            .ok()
            .and_then(|m| m.first())
            .map(|m| halo_core::Rect::new(m.x, m.y, 1.0, 1.0))
            .unwrap_or(halo_core::Rect::new(0.0, 0.0, 1.0, 1.0));
        let url = format!("{}{}", config.coordinator.origin, config.coordinator.path);

        let handle = match self.backend.create_window(NativeWindowSpec {
            rect,
            url: url.clone(),
            transparent: true,
            always_on_top: false,
            resizable: false,
            decorations: false,
            skip_taskbar: true,
            click_through: false,
        }) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "failed to create the coordinator's own native surface");
                return;
            }
        };

        let mut record = WindowRecord::new(COORDINATOR_ID, Role::Coordinator, rect, None, WindowConfig::default());
        record.status = Status::Pending;
        if let Err(e) = self.windows.insert(record, handle.clone()) {
            warn!(error = %e, "failed to register the coordinator window record");
            let _ = self.backend.close(&handle);
            return;
        }

        if let Err(e) = self.backend.set_visible(&handle, true) {
            warn!(error = %e, "failed to show the coordinator's own native surface");
            return;
        }
        let _ = self.windows.set_status(COORDINATOR_ID, Status::Visible);
        info!(url, "registered coordinator surface");
    }

    pub fn orchestrator(&self) -> Arc<Orchestrator> {
        self.orchestrator.clone()
    }

    fn seed_initial_monitors(&mut self) {
        match self.backend.list_monitors() {
            Ok(records) => {
                let generation = self.monitors.record_notification(MonitorTable::new(records));
                self.monitors.apply_if_current(generation);
            }
            Err(e) => warn!(error = %e, "no monitor snapshot available at startup"),
        }
    }

    fn arm_monitor_watch(&self) {
        let sender = self.sender.clone();
        self.backend.watch_monitors(Box::new(move |records| {
            let _ = sender.send(EngineMessage::MonitorRawNotification(records));
        }));
    }

    fn current_monitors(&self) -> MonitorTable {
        MonitorTable::new(self.monitors.list().map(<[_]>::to_vec).unwrap_or_default())
    }

    /// Drain the engine's queue until the sender side is dropped. Each
    /// message is handled to completion before the next is read, giving
    /// the "operations against the same id are serialized in issue
    /// order" guarantee of spec §5 for free.
    pub fn run(&mut self, receiver: mpsc::Receiver<EngineMessage>) {
        for message in receiver.iter() {
            self.handle_message(message);
        }
    }

    fn handle_message(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::Command(command, reply_tx) => {
                let result = self.handle_command(command);
                let _ = reply_tx.send(result);
            }
            EngineMessage::MonitorRawNotification(records) => {
                let generation = self.monitors.record_notification(MonitorTable::new(records));
                let sender = self.sender.clone();
                let coalesce_ms = self.monitors.coalesce_ms();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(coalesce_ms));
                    let _ = sender.send(EngineMessage::MonitorTick(generation));
                });
            }
            EngineMessage::MonitorTick(generation) => {
                if let Some(table) = self.monitors.apply_if_current(generation) {
                    info!(count = table.list().len(), "monitor topology changed");
                    self.inline.reposition_all(&mut self.windows, &table);
                    self.popovers.close_popovers_with_vanished_anchor(&table);
                    self.orchestrator.broadcast(Event::MonitorTopologyChanged(table));
                    for event in self.popovers.drain_events() {
                        self.orchestrator.broadcast(event);
                    }
                }
            }
        }
    }

    fn handle_command(&mut self, command: Command) -> Result<Reply> {
        let reply = match command {
            Command::CreateInlineWindow { id, position, config, url } => {
                self.orchestrator.mark_pending(id.clone());
                let monitors = self.current_monitors();
                let result = self.inline.create(&mut self.windows, &monitors, &id, position, config, url);
                // Completed whether create succeeded or failed: a failed
                // create leaves nothing pending to wait on (spec §7's "a
                // failed create leaves the system in its prior state").
                self.orchestrator.mark_completed(&id);
                result.map(|_| Reply::Ok)
            }
            Command::UpdateWindowPosition { id, position } => {
                let monitors = self.current_monitors();
                self.inline
                    .update_position(&mut self.windows, &monitors, &id, position)
                    .map(|_| Reply::Ok)
            }
            Command::ShowWindow { id } => self.inline.show(&mut self.windows, &id).map(|_| Reply::Ok),
            Command::HideWindow { id } => self.inline.hide(&mut self.windows, &id).map(|_| Reply::Ok),
            Command::CloseWindow { id, idempotent } => {
                self.inline.close(&mut self.windows, &id, idempotent).map(|_| Reply::Ok)
            }
            Command::GetMonitors => match self.monitors.list() {
                Ok(records) => Ok(Reply::Monitors(records.to_vec())),
                Err(e) => Err(e),
            },
            Command::OpenPopover { id, anchor, width, height, align, offset_y, exclusive } => {
                let monitors = self.current_monitors();
                self.popovers
                    .open(&id, anchor.into(), width, height, align, offset_y, exclusive, &monitors)
                    .map(Reply::from)
            }
            Command::ClosePopover { id } => self.popovers.close(&id).map(|_| Reply::Ok),
            Command::CloseAllPopovers => self.popovers.close_all().map(|_| Reply::Ok),
            Command::GetOpenPopovers => Ok(Reply::OpenPopoverIds(self.popovers.list_open())),
            Command::SetWindowSize { id, width, height } => {
                self.popovers.set_size(&id, width, height).map(Reply::Rect)
            }
            Command::ExternalEvent { name, payload } => {
                self.orchestrator.broadcast(Event::ExternalEvent(name, payload));
                Ok(Reply::Ok)
            }
            Command::WaitForAll => {
                self.orchestrator.wait_for_all();
                Ok(Reply::Ok)
            }
            Command::HideSelf => match self.windows.ids_by_role(Role::Coordinator).first() {
                Some(id) => self.inline.hide(&mut self.windows, id).map(|_| Reply::Ok),
                None => {
                    warn!("hide_self called but no coordinator window is registered");
                    Ok(Reply::Ok)
                }
            },
        };

        for event in self.popovers.drain_events() {
            self.orchestrator.broadcast(event);
        }

        reply
    }
}
