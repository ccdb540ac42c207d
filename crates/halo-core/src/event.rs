//! Events the native side pushes back to the host (spec §6 "Events").

use serde::{Deserialize, Serialize};

use crate::monitor::MonitorTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    MonitorTopologyChanged(MonitorTable),
    /// Emitted exactly once per popover per transition out of the Open
    /// state, whichever pathway (blur or explicit close) triggers it
    /// first (spec §9 Open Question (a)).
    PopoverClosed(String),
    ExternalEvent(String, String),
}
