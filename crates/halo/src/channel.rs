//! Request/response channel (spec §6): a typed `Command` enum sent over
//! a minimal hand-rolled oneshot built on `std::sync::mpsc`, since the
//! workspace carries no async runtime (see DESIGN.md for why `tokio`
//! wasn't added). `HostHandle` is `Clone` + `Send` and is what both
//! embedding application code and the IPC listener thread call.

use std::sync::mpsc;

use halo_core::popover::{Align, ExclusiveGroup};
use halo_core::{MonitorRecord, PositionDescriptor, Rect, Result, WindowConfig};

use crate::controller::popover::OpenResult;

#[derive(Debug, Clone)]
pub struct AnchorRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl From<AnchorRect> for Rect {
    fn from(a: AnchorRect) -> Self {
        Rect::new(a.x, a.y, a.w, a.h)
    }
}

/// One variant per row of spec §6's request/response channel table.
pub enum Command {
    CreateInlineWindow {
        id: String,
        position: PositionDescriptor,
        config: WindowConfig,
        url: Option<String>,
    },
    UpdateWindowPosition {
        id: String,
        position: PositionDescriptor,
    },
    ShowWindow {
        id: String,
    },
    HideWindow {
        id: String,
    },
    CloseWindow {
        id: String,
        idempotent: bool,
    },
    GetMonitors,
    OpenPopover {
        id: String,
        anchor: AnchorRect,
        width: f64,
        height: f64,
        align: Align,
        offset_y: f64,
        exclusive: ExclusiveGroup,
    },
    ClosePopover {
        id: String,
    },
    CloseAllPopovers,
    GetOpenPopovers,
    SetWindowSize {
        id: String,
        width: f64,
        height: f64,
    },
    ExternalEvent {
        name: String,
        payload: String,
    },
    WaitForAll,
    HideSelf,
}

#[derive(Debug)]
pub enum Reply {
    Ok,
    Monitors(Vec<MonitorRecord>),
    PopoverOpened { label: String, closed: bool, max_height: f64 },
    OpenPopoverIds(Vec<String>),
    Rect(Rect),
}

impl From<OpenResult> for Reply {
    fn from(r: OpenResult) -> Self {
        Reply::PopoverOpened {
            label: r.label,
            closed: r.closed,
            max_height: r.max_height,
        }
    }
}

/// A minimal oneshot built on `mpsc` with capacity 1: exactly one reply
/// is ever sent, and the receiver blocks until it arrives.
pub type ReplySender = mpsc::SyncSender<Result<Reply>>;
pub type ReplyReceiver = mpsc::Receiver<Result<Reply>>;

pub fn reply_channel() -> (ReplySender, ReplyReceiver) {
    mpsc::sync_channel(1)
}

/// Messages on the engine's owning-thread queue: a `Command` awaiting a
/// reply, or an internal monitor-coalescing timer tick (spec §5's
/// "single re-armable timer slot," carried as a message rather than a
/// side channel so it serializes with every other engine operation).
pub enum EngineMessage {
    Command(Command, ReplySender),
    MonitorRawNotification(Vec<MonitorRecord>),
    MonitorTick(u64),
}

/// Handle callers use to submit commands to the engine's owning thread
/// and block for the reply. Cheap to clone; every clone shares the same
/// underlying command queue.
#[derive(Clone)]
pub struct HostHandle {
    sender: mpsc::Sender<EngineMessage>,
}

impl HostHandle {
    pub fn new(sender: mpsc::Sender<EngineMessage>) -> Self {
        Self { sender }
    }

    fn call(&self, command: Command) -> Result<Reply> {
        let (reply_tx, reply_rx) = reply_channel();
        // A closed receiver means the engine thread has shut down;
        // surfaced to the caller as NotFound-shaped noise isn't useful,
        // so this path panics like a disconnected std::sync::mpsc call
        // normally would — there is no live engine to report an error
        // through.
        self.sender
            .send(EngineMessage::Command(command, reply_tx))
            .expect("engine command queue is closed");
        reply_rx.recv().expect("engine dropped the reply sender")
    }

    pub fn create_inline_window(
        &self,
        id: impl Into<String>,
        position: PositionDescriptor,
        config: WindowConfig,
        url: Option<String>,
    ) -> Result<()> {
        self.call(Command::CreateInlineWindow {
            id: id.into(),
            position,
            config,
            url,
        })
        .map(|_| ())
    }

    pub fn update_window_position(&self, id: impl Into<String>, position: PositionDescriptor) -> Result<()> {
        self.call(Command::UpdateWindowPosition { id: id.into(), position }).map(|_| ())
    }

    pub fn show_window(&self, id: impl Into<String>) -> Result<()> {
        self.call(Command::ShowWindow { id: id.into() }).map(|_| ())
    }

    pub fn hide_window(&self, id: impl Into<String>) -> Result<()> {
        self.call(Command::HideWindow { id: id.into() }).map(|_| ())
    }

    pub fn close_window(&self, id: impl Into<String>, idempotent: bool) -> Result<()> {
        self.call(Command::CloseWindow { id: id.into(), idempotent }).map(|_| ())
    }

    pub fn get_monitors(&self) -> Result<Vec<MonitorRecord>> {
        match self.call(Command::GetMonitors)? {
            Reply::Monitors(m) => Ok(m),
            _ => unreachable!("engine replied to GetMonitors with the wrong variant"),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn open_popover(
        &self,
        id: impl Into<String>,
        anchor: AnchorRect,
        width: f64,
        height: f64,
        align: Align,
        offset_y: f64,
        exclusive: ExclusiveGroup,
    ) -> Result<OpenResult> {
        match self.call(Command::OpenPopover {
            id: id.into(),
            anchor,
            width,
            height,
            align,
            offset_y,
            exclusive,
        })? {
            Reply::PopoverOpened { label, closed, max_height } => Ok(OpenResult { label, closed, max_height }),
            _ => unreachable!("engine replied to OpenPopover with the wrong variant"),
        }
    }

    pub fn close_popover(&self, id: impl Into<String>) -> Result<()> {
        self.call(Command::ClosePopover { id: id.into() }).map(|_| ())
    }

    pub fn close_all_popovers(&self) -> Result<()> {
        self.call(Command::CloseAllPopovers).map(|_| ())
    }

    pub fn get_open_popovers(&self) -> Result<Vec<String>> {
        match self.call(Command::GetOpenPopovers)? {
            Reply::OpenPopoverIds(ids) => Ok(ids),
            _ => unreachable!("engine replied to GetOpenPopovers with the wrong variant"),
        }
    }

    pub fn set_window_size(&self, id: impl Into<String>, width: f64, height: f64) -> Result<Rect> {
        match self.call(Command::SetWindowSize { id: id.into(), width, height })? {
            Reply::Rect(rect) => Ok(rect),
            _ => unreachable!("engine replied to SetWindowSize with the wrong variant"),
        }
    }

    pub fn external_event(&self, name: impl Into<String>, payload: impl Into<String>) -> Result<()> {
        self.call(Command::ExternalEvent { name: name.into(), payload: payload.into() }).map(|_| ())
    }

    pub fn wait_for_all(&self) -> Result<()> {
        self.call(Command::WaitForAll).map(|_| ())
    }

    pub fn hide_self(&self) -> Result<()> {
        self.call(Command::HideSelf).map(|_| ())
    }
}
