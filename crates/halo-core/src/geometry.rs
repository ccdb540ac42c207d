//! Pure geometry solving: position descriptor + monitor table -> rectangle.
//!
//! These functions have no native-windowing dependencies and are suitable
//! for direct unit and property testing, in the same spirit as
//! `layout_math.rs`'s center-priority bar allocation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::monitor::MonitorTable;

/// An absolute rectangle in virtual-desktop logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// A position descriptor: the set of non-absent fields determines the box.
/// All distances are logical pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionDescriptor {
    pub monitor: Option<String>,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// The result of solving a descriptor: the rectangle plus the monitor it
/// was resolved against (callers need the monitor name to detect "the
/// named monitor disappeared" on a later topology change).
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedPlacement {
    pub rect: Rect,
    pub monitor_name: String,
}

/// Resolve one axis given `(low, high, size)` in the style of
/// `left`/`right`/`width`. Returns `(local_origin, size)` in
/// monitor-local coordinates, or `None` if the axis is not soluble from
/// exactly this combination.
fn solve_axis(
    low: Option<f64>,
    high: Option<f64>,
    size: Option<f64>,
    monitor_size: f64,
) -> Option<(f64, f64)> {
    match (low, high, size) {
        (Some(low), Some(high), None) => Some((low, monitor_size - low - high)),
        (Some(low), None, Some(size)) => Some((low, size)),
        (None, Some(high), Some(size)) => Some((monitor_size - high - size, size)),
        (Some(low), None, None) => Some((low, monitor_size - low)),
        // `right` alone: the box fills from the start edge up to `right`
        // away from the end edge, mirroring the `left`-alone case.
        (None, Some(high), None) => Some((0.0, monitor_size - high)),
        (None, None, Some(size)) => Some(((monitor_size - size) / 2.0, size)),
        (Some(_), Some(_), Some(_)) | (None, None, None) => None,
    }
}

/// Solve a position descriptor against a monitor table.
///
/// # Algorithm (spec §4.1)
///
/// 1. Select the monitor (`MonitorTable::resolve`).
/// 2. For each axis, exactly one soluble combination of the three fields
///    must be present.
/// 3. Compute local coordinates inside the chosen monitor.
/// 4. Translate to virtual-desktop coordinates by adding the monitor's
///    origin.
///
/// Widths/heights are clamped to `max(1, w)`. A descriptor with no
/// soluble axis, or one that would solve to a rectangle whose origin lies
/// outside the virtual desktop, fails with `UnresolvablePosition`.
pub fn solve(descriptor: &PositionDescriptor, monitors: &MonitorTable) -> Result<SolvedPlacement> {
    let monitor = monitors
        .resolve(descriptor.monitor.as_deref())
        .ok_or(Error::NoDisplays)?;

    let horizontal = solve_axis(descriptor.left, descriptor.right, descriptor.width, monitor.width)
        .ok_or_else(|| {
            Error::UnresolvablePosition(
                "horizontal axis requires exactly one of (left+right, left+width, right+width, left, right, width)"
                    .to_string(),
            )
        })?;
    let vertical = solve_axis(descriptor.top, descriptor.bottom, descriptor.height, monitor.height)
        .ok_or_else(|| {
            Error::UnresolvablePosition(
                "vertical axis requires exactly one of (top+bottom, top+height, bottom+height, top, bottom, height)"
                    .to_string(),
            )
        })?;

    let (x_local, w) = horizontal;
    let (y_local, h) = vertical;

    let w = w.max(1.0);
    let h = h.max(1.0);

    if x_local.is_nan() || y_local.is_nan() {
        return Err(Error::UnresolvablePosition(
            "position descriptor produced a NaN coordinate".to_string(),
        ));
    }

    // A combination like `{right: 1000, width: 1500}` on a narrower
    // monitor solves to a negative local origin; spec §4.1's tie-break
    // rejects that instead of placing the rect off the monitor (and the
    // §8 invariant requires the origin stay within the monitor's bounds).
    if x_local < 0.0 || y_local < 0.0 {
        return Err(Error::UnresolvablePosition(format!(
            "position descriptor solves to an origin outside the monitor: ({x_local}, {y_local})"
        )));
    }

    let rect = Rect::new(monitor.x + x_local, monitor.y + y_local, w, h);

    Ok(SolvedPlacement {
        rect,
        monitor_name: monitor.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::MonitorRecord;

    fn single_monitor(w: f64, h: f64) -> MonitorTable {
        MonitorTable::new(vec![MonitorRecord::new("primary", 0.0, 0.0, w, h)])
    }

    fn two_monitors() -> MonitorTable {
        MonitorTable::new(vec![
            MonitorRecord::new("primary", 0.0, 0.0, 2560.0, 1440.0),
            MonitorRecord::new("secondary", 2560.0, 0.0, 1920.0, 1080.0),
        ])
    }

    #[test]
    fn bar_top_with_left_right_height() {
        let monitors = single_monitor(1440.0, 900.0);
        let descriptor = PositionDescriptor {
            top: Some(9.0),
            left: Some(20.0),
            right: Some(20.0),
            height: Some(60.0),
            ..Default::default()
        };
        let solved = solve(&descriptor, &monitors).unwrap();
        assert_eq!(solved.rect, Rect::new(20.0, 9.0, 1400.0, 60.0));
    }

    #[test]
    fn named_monitor_translates_origin() {
        let monitors = two_monitors();
        let descriptor = PositionDescriptor {
            monitor: Some("secondary".to_string()),
            top: Some(0.0),
            left: Some(0.0),
            right: Some(0.0),
            height: Some(40.0),
            ..Default::default()
        };
        let solved = solve(&descriptor, &monitors).unwrap();
        assert_eq!(solved.rect, Rect::new(2560.0, 0.0, 1920.0, 40.0));
        assert_eq!(solved.monitor_name, "secondary");
    }

    #[test]
    fn width_and_height_only_centers() {
        let monitors = single_monitor(1440.0, 900.0);
        let descriptor = PositionDescriptor {
            width: Some(300.0),
            height: Some(200.0),
            ..Default::default()
        };
        let solved = solve(&descriptor, &monitors).unwrap();
        assert_eq!(solved.rect, Rect::new(570.0, 350.0, 300.0, 200.0));
    }

    #[test]
    fn left_alone_fills_to_edge() {
        let monitors = single_monitor(1440.0, 900.0);
        let descriptor = PositionDescriptor {
            left: Some(100.0),
            top: Some(0.0),
            height: Some(10.0),
            ..Default::default()
        };
        let solved = solve(&descriptor, &monitors).unwrap();
        assert_eq!(solved.rect.x, 100.0);
        assert_eq!(solved.rect.w, 1340.0);
    }

    #[test]
    fn right_alone_fills_from_edge() {
        let monitors = single_monitor(1440.0, 900.0);
        let descriptor = PositionDescriptor {
            right: Some(100.0),
            top: Some(0.0),
            height: Some(10.0),
            ..Default::default()
        };
        let solved = solve(&descriptor, &monitors).unwrap();
        assert_eq!(solved.rect.x, 0.0);
        assert_eq!(solved.rect.w, 1340.0);
    }

    #[test]
    fn no_axis_fields_is_unresolvable() {
        let monitors = single_monitor(1440.0, 900.0);
        let descriptor = PositionDescriptor::default();
        assert!(solve(&descriptor, &monitors).is_err());
    }

    #[test]
    fn all_three_fields_on_an_axis_is_unresolvable() {
        let monitors = single_monitor(1440.0, 900.0);
        let descriptor = PositionDescriptor {
            left: Some(10.0),
            right: Some(10.0),
            width: Some(10.0),
            top: Some(0.0),
            height: Some(10.0),
            ..Default::default()
        };
        assert!(solve(&descriptor, &monitors).is_err());
    }

    #[test]
    fn width_clamped_to_minimum_one_pixel() {
        let monitors = single_monitor(100.0, 100.0);
        let descriptor = PositionDescriptor {
            left: Some(50.0),
            right: Some(60.0),
            top: Some(0.0),
            height: Some(10.0),
            ..Default::default()
        };
        let solved = solve(&descriptor, &monitors).unwrap();
        assert_eq!(solved.rect.w, 1.0);
    }

    #[test]
    fn missing_monitor_falls_back_to_primary() {
        let monitors = two_monitors();
        let descriptor = PositionDescriptor {
            monitor: Some("nonexistent".to_string()),
            left: Some(0.0),
            top: Some(0.0),
            width: Some(10.0),
            height: Some(10.0),
            ..Default::default()
        };
        let solved = solve(&descriptor, &monitors).unwrap();
        assert_eq!(solved.monitor_name, "primary");
    }

    #[test]
    fn negative_origin_from_oversized_width_is_unresolvable() {
        let monitors = single_monitor(1440.0, 900.0);
        let descriptor = PositionDescriptor {
            right: Some(1000.0),
            width: Some(1500.0),
            top: Some(0.0),
            height: Some(10.0),
            ..Default::default()
        };
        assert!(matches!(
            solve(&descriptor, &monitors),
            Err(Error::UnresolvablePosition(_))
        ));
    }

    #[test]
    fn no_displays_is_an_error() {
        let monitors = MonitorTable::default();
        let descriptor = PositionDescriptor {
            left: Some(0.0),
            top: Some(0.0),
            width: Some(10.0),
            height: Some(10.0),
            ..Default::default()
        };
        assert!(matches!(
            solve(&descriptor, &monitors),
            Err(Error::NoDisplays)
        ));
    }
}
