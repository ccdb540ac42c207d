//! Monitor table: the snapshot of displays the Geometry Solver resolves
//! position descriptors against.

use serde::{Deserialize, Serialize};

/// A single display in the virtual desktop.
///
/// Origin convention: JS-style top-left for the virtual desktop. The
/// native layer is responsible for translating to the platform's native
/// (bottom-left, on macOS) origin internally — nothing above the native
/// backend boundary ever sees a flipped coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorRecord {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
    pub scale_factor: f64,
}

impl MonitorRecord {
    pub fn new(name: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            x,
            y,
            scale_factor: 1.0,
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// An ordered snapshot of all displays: primary first, then by native
/// display id ascending (callers that built the table are expected to
/// have already applied that ordering; this type does not re-sort, since
/// "native display id" is a platform concept the core doesn't know).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorTable {
    monitors: Vec<MonitorRecord>,
}

impl MonitorTable {
    pub fn new(monitors: Vec<MonitorRecord>) -> Self {
        Self { monitors }
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    pub fn list(&self) -> &[MonitorRecord] {
        &self.monitors
    }

    /// The platform-designated default display: by convention, the first
    /// entry of the snapshot.
    pub fn primary(&self) -> Option<&MonitorRecord> {
        self.monitors.first()
    }

    pub fn by_name(&self, name: &str) -> Option<&MonitorRecord> {
        self.monitors.iter().find(|m| m.name == name)
    }

    /// Resolve the `monitor` field of a position descriptor: absent or
    /// "primary" selects the primary; a named monitor that is not present
    /// falls back to the primary (spec: "Cross-monitor spans for inline
    /// windows are unsupported; if a position descriptor would span, the
    /// solver picks the anchor monitor and clamps" — the same fallback
    /// covers a vanished named monitor).
    pub fn resolve<'a>(&'a self, requested: Option<&str>) -> Option<&'a MonitorRecord> {
        match requested {
            None | Some("primary") => self.primary(),
            Some(name) => self.by_name(name).or_else(|| self.primary()),
        }
    }

    /// The monitor whose bounds contain the given point, if any.
    pub fn containing_point(&self, x: f64, y: f64) -> Option<&MonitorRecord> {
        self.monitors.iter().find(|m| m.contains_point(x, y))
    }

    /// The monitor containing a rectangle's midpoint, falling back to the
    /// primary monitor if no monitor contains it (an anchor can legally
    /// sit just outside every monitor's bounds during a topology change).
    pub fn containing_midpoint(&self, rect: &super::geometry::Rect) -> Option<&MonitorRecord> {
        let mx = rect.x + rect.w / 2.0;
        let my = rect.y + rect.h / 2.0;
        self.containing_point(mx, my).or_else(|| self.primary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MonitorTable {
        MonitorTable::new(vec![
            MonitorRecord::new("primary", 0.0, 0.0, 2560.0, 1440.0),
            MonitorRecord::new("secondary", 2560.0, 0.0, 1920.0, 1080.0),
        ])
    }

    #[test]
    fn resolve_defaults_to_primary() {
        let table = sample();
        assert_eq!(table.resolve(None).unwrap().name, "primary");
        assert_eq!(table.resolve(Some("primary")).unwrap().name, "primary");
    }

    #[test]
    fn resolve_named_monitor() {
        let table = sample();
        assert_eq!(table.resolve(Some("secondary")).unwrap().name, "secondary");
    }

    #[test]
    fn resolve_missing_monitor_falls_back_to_primary() {
        let table = sample();
        assert_eq!(table.resolve(Some("tertiary")).unwrap().name, "primary");
    }

    #[test]
    fn empty_table_has_no_primary() {
        let table = MonitorTable::default();
        assert!(table.primary().is_none());
        assert!(table.resolve(None).is_none());
    }
}
