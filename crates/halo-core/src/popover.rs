//! Popover record and the anchor-relative placement algorithm (spec §3
//! "Popover record", §4.5 "Placement algorithm").

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::monitor::MonitorTable;
use crate::window::WindowRecord;

/// Horizontal alignment along the anchor's horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    Start,
    Center,
    End,
}

/// A tagged choice for the `exclusive` argument of `open`, per spec
/// Design Note "Exclusive-group semantics": a boolean-or-prefix-string in
/// the wire contract, a tagged enum here to avoid ambiguity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExclusiveGroup {
    None,
    All,
    Prefix(String),
}

impl Default for ExclusiveGroup {
    fn default() -> Self {
        ExclusiveGroup::None
    }
}

/// Popovers close below a positive floor even when the anchor sits at the
/// monitor's bottom edge (spec §4.5 step 6, §8 boundary behavior).
pub const MIN_MAX_HEIGHT: f64 = 1.0;

/// A live popover's bookkeeping record: extends `WindowRecord` with the
/// anchor-relative fields that don't apply to inline windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopoverRecord {
    pub window: WindowRecord,
    pub anchor: Rect,
    pub align: Align,
    pub offset_y: f64,
    pub max_height: f64,
    pub exclusive_group: ExclusiveGroup,
}

/// The result of the placement algorithm: where to put the panel and how
/// tall it's allowed to grow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopoverPlacement {
    pub rect: Rect,
    pub max_height: f64,
}

/// Place a popover below an anchor rectangle (spec §4.5 steps 1-6).
///
/// 1. Locate the monitor containing the anchor's midpoint.
/// 2. Compute the horizontal origin from `align`.
/// 3. Clamp the horizontal origin to the monitor's interior.
/// 4. Compute the vertical origin as `anchor.y + anchor.h + offset_y`.
/// 5. Compute `max_height` as the remaining space below the vertical
///    origin, clamped to a positive minimum.
/// 6. The panel's requested height is clamped to `max_height`.
///
/// An anchor whose midpoint isn't inside any monitor (can happen mid
/// topology-change) falls back to the primary monitor; an anchor that is
/// still off every monitor at that point is not an error here — the
/// *caller* (`PopoverController`) is the one that decides whether a
/// vanished anchor monitor should close the popover (spec §9 Open
/// Question (b)).
pub fn place(
    anchor: Rect,
    width: f64,
    height: f64,
    align: Align,
    offset_y: f64,
    monitors: &MonitorTable,
) -> Option<PopoverPlacement> {
    let monitor = monitors.containing_midpoint(&anchor)?;

    let x_unclamped = match align {
        Align::Start => anchor.x,
        Align::Center => anchor.x + anchor.w / 2.0 - width / 2.0,
        Align::End => anchor.x + anchor.w - width,
    };

    let min_x = monitor.x;
    let max_x = monitor.x + monitor.width - width;
    let x = if max_x >= min_x {
        x_unclamped.clamp(min_x, max_x)
    } else {
        // Panel wider than the monitor: pin to the monitor's left edge.
        min_x
    };

    let y = anchor.y + anchor.h + offset_y;

    let max_height = (monitor.y + monitor.height - y).max(MIN_MAX_HEIGHT);
    let clamped_height = height.min(max_height).max(MIN_MAX_HEIGHT);

    Some(PopoverPlacement {
        rect: Rect::new(x, y, width, clamped_height),
        max_height,
    })
}

/// Whether `id` belongs to exclusive group `group` (spec §4.5 "Exclusive
/// groups"): `All` matches everything; `Prefix(p)` matches ids beginning
/// with `"p-"`; `None` matches nothing.
pub fn matches_group(id: &str, group: &ExclusiveGroup) -> bool {
    match group {
        ExclusiveGroup::None => false,
        ExclusiveGroup::All => true,
        ExclusiveGroup::Prefix(prefix) => id.starts_with(&format!("{prefix}-")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::MonitorRecord;

    fn single_monitor() -> MonitorTable {
        MonitorTable::new(vec![MonitorRecord::new("primary", 0.0, 0.0, 1440.0, 900.0)])
    }

    #[test]
    fn center_aligned_popover_clamps_to_left_edge() {
        let monitors = single_monitor();
        let anchor = Rect::new(100.0, 40.0, 24.0, 24.0);
        let placement = place(anchor, 340.0, 420.0, Align::Center, 8.0, &monitors).unwrap();
        // anchor.x + anchor.w/2 - width/2 = 100 + 12 - 170 = -58, clamped to 0
        assert_eq!(placement.rect.x, 0.0);
        assert_eq!(placement.rect.y, 72.0);
        assert_eq!(placement.rect.w, 340.0);
        assert_eq!(placement.rect.h, 420.0);
        assert_eq!(placement.max_height, 828.0);
    }

    #[test]
    fn start_align_at_right_edge_clamps_right_edge_to_monitor_width() {
        let monitors = single_monitor();
        // Anchor flush against the right edge.
        let anchor = Rect::new(1400.0, 0.0, 40.0, 24.0);
        let placement = place(anchor, 340.0, 100.0, Align::Start, 0.0, &monitors).unwrap();
        assert_eq!(placement.rect.x + placement.rect.w, 1440.0);
    }

    #[test]
    fn max_height_never_drops_to_zero_at_monitor_bottom() {
        let monitors = single_monitor();
        let anchor = Rect::new(0.0, 900.0, 10.0, 10.0);
        let placement = place(anchor, 100.0, 100.0, Align::Start, 0.0, &monitors).unwrap();
        assert!(placement.max_height >= MIN_MAX_HEIGHT);
        assert!(placement.rect.h >= MIN_MAX_HEIGHT);
    }

    #[test]
    fn height_is_clamped_to_max_height() {
        let monitors = single_monitor();
        let anchor = Rect::new(0.0, 600.0, 10.0, 10.0);
        // Remaining space below anchor is 900 - 610 = 290.
        let placement = place(anchor, 100.0, 600.0, Align::Start, 0.0, &monitors).unwrap();
        assert_eq!(placement.max_height, 290.0);
        assert_eq!(placement.rect.h, 290.0);
    }

    #[test]
    fn exclusive_group_prefix_matching() {
        let group = ExclusiveGroup::Prefix("github".to_string());
        assert!(matches_group("github-issues", &group));
        assert!(matches_group("github-prs", &group));
        assert!(!matches_group("github", &group));
        assert!(!matches_group("other-thing", &group));
    }

    #[test]
    fn exclusive_group_all_matches_everything() {
        assert!(matches_group("anything", &ExclusiveGroup::All));
    }

    #[test]
    fn exclusive_group_none_matches_nothing() {
        assert!(!matches_group("anything", &ExclusiveGroup::None));
    }
}
