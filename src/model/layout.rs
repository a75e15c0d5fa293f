use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::display::DisplayConfiguration;

/// A window frame in global screen coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect { x, y, width, height }
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// One captured window. There is no persistent window identifier at the OS
/// level; restore reconstructs identity from `(bundle_id, title)`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindowRecord {
    pub app_name: String,
    pub bundle_id: Option<String>,
    pub title: String,
    pub frame: Rect,
    pub is_minimized: bool,
    /// Index into the display list at capture time. Informational only.
    pub screen_index: usize,
}

/// A named snapshot of window frames tied to one display configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Layout {
    pub configuration: DisplayConfiguration,
    pub windows: Vec<WindowRecord>,
    pub name: String,
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_point_excludes_far_edges() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(rect.contains_point(0.0, 0.0));
        assert!(rect.contains_point(99.9, 49.9));
        assert!(!rect.contains_point(100.0, 0.0));
        assert!(!rect.contains_point(0.0, 50.0));
        assert!(!rect.contains_point(-1.0, 10.0));
    }
}
