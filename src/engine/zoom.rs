use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::Error;
use crate::engine::port::{WindowHandle, WindowInspector};
use crate::model::Rect;

/// How a window gets zoomed when displays disconnect.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZoomStrategy {
    /// Assign the primary screen's visible frame to each window.
    #[default]
    SetFrame,
    /// Press the window's native zoom button and let the window manager
    /// pick the final geometry.
    Native,
}

/// Zooms every eligible window to fill `target` (the primary screen's
/// visible area). Independent of stored layouts. Per-window failures are
/// tolerated silently; returns the number of windows affected.
pub fn zoom_all<I: WindowInspector>(
    inspector: &I,
    target: Rect,
    excluded: &HashSet<String>,
    strategy: ZoomStrategy,
) -> Result<usize, Error> {
    if !inspector.is_trusted() {
        return Err(Error::PermissionDenied);
    }

    let mut zoomed = 0;
    for app in inspector.applications() {
        if excluded.contains(&app.name) {
            debug!("skipping excluded app {}", app.name);
            continue;
        }
        for window in inspector.windows(&app) {
            let result = match strategy {
                ZoomStrategy::SetFrame => window.set_frame(target),
                ZoomStrategy::Native => window.perform_zoom(),
            };
            match result {
                Ok(()) => zoomed += 1,
                Err(e) => debug!("could not zoom a window of {}: {e}", app.name),
            }
        }
    }

    info!("zoomed {zoomed} windows");
    Ok(zoomed)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::engine::testing::FakeInspector;

    fn visible() -> Rect { Rect::new(0.0, 25.0, 1440.0, 875.0) }

    #[test]
    fn set_frame_strategy_fills_the_visible_area() {
        let mut inspector = FakeInspector::new();
        let notes = inspector.add_app("Notes", Some("com.apple.Notes"));
        let a = inspector.add_window(notes, "Untitled", Rect::new(10.0, 20.0, 800.0, 600.0));
        let b = inspector.add_window(notes, "Groceries", Rect::new(50.0, 60.0, 400.0, 300.0));

        let count = zoom_all(&inspector, visible(), &HashSet::new(), ZoomStrategy::SetFrame)
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(a.current_frame(), visible());
        assert_eq!(b.current_frame(), visible());
    }

    #[test]
    fn native_strategy_presses_the_zoom_button() {
        let mut inspector = FakeInspector::new();
        let notes = inspector.add_app("Notes", Some("com.apple.Notes"));
        let window = inspector.add_window(notes, "Untitled", Rect::new(10.0, 20.0, 800.0, 600.0));

        let count =
            zoom_all(&inspector, visible(), &HashSet::new(), ZoomStrategy::Native).unwrap();

        assert_eq!(count, 1);
        assert_eq!(window.zoom_count(), 1);
        assert_eq!(window.current_frame(), Rect::new(10.0, 20.0, 800.0, 600.0));
    }

    #[test]
    fn excluded_apps_are_not_touched() {
        let mut inspector = FakeInspector::new();
        let finder = inspector.add_app("Finder", Some("com.apple.finder"));
        let untouched = inspector.add_window(finder, "Downloads", Rect::new(0.0, 0.0, 500.0, 400.0));
        let notes = inspector.add_app("Notes", Some("com.apple.Notes"));
        inspector.add_window(notes, "Untitled", Rect::new(10.0, 20.0, 800.0, 600.0));

        let excluded: HashSet<String> = ["Finder".to_string()].into();
        let count = zoom_all(&inspector, visible(), &excluded, ZoomStrategy::SetFrame).unwrap();

        assert_eq!(count, 1);
        assert_eq!(untouched.current_frame(), Rect::new(0.0, 0.0, 500.0, 400.0));
    }

    #[test]
    fn failures_are_silent_and_reflected_in_the_count() {
        let mut inspector = FakeInspector::new();
        let notes = inspector.add_app("Notes", Some("com.apple.Notes"));
        let good = inspector.add_window(notes, "Untitled", Rect::new(10.0, 20.0, 800.0, 600.0));
        let bad = inspector.add_window(notes, "Closing", Rect::new(0.0, 0.0, 100.0, 100.0));
        bad.break_window();

        let count =
            zoom_all(&inspector, visible(), &HashSet::new(), ZoomStrategy::SetFrame).unwrap();
        assert_eq!(count, 1);
        assert_eq!(good.current_frame(), visible());
    }

    #[test]
    fn permission_gate_returns_denied() {
        let inspector = FakeInspector::untrusted();
        let result = zoom_all(&inspector, visible(), &HashSet::new(), ZoomStrategy::SetFrame);
        assert_eq!(result.unwrap_err(), Error::PermissionDenied);
    }
}
