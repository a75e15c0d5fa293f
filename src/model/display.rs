use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::layout::Rect;

/// One attached display as reported by the OS. `frame` is the full bounds,
/// `visible_frame` excludes the menu bar and Dock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenInfo {
    pub frame: Rect,
    pub visible_frame: Rect,
}

impl ScreenInfo {
    /// Deterministic identifier derived from geometry. Stable across
    /// reconnects of the same physical arrangement.
    pub fn identifier(&self) -> String {
        format!(
            "{}x{}@{},{}",
            self.frame.width as i64,
            self.frame.height as i64,
            self.frame.x as i64,
            self.frame.y as i64
        )
    }
}

/// Fingerprint of the current set of attached displays. Constructed fresh on
/// every configuration-change signal; never mutated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DisplayConfiguration {
    pub external_display_count: usize,
    /// One identifier per display, sorted so comparison is order-independent.
    pub display_ids: Vec<String>,
    pub total_width: i64,
    pub total_height: i64,
    pub captured_at: DateTime<Utc>,
}

impl DisplayConfiguration {
    pub fn from_screens(screens: &[ScreenInfo]) -> DisplayConfiguration {
        let external_count = screens.len().saturating_sub(1);

        let mut display_ids: Vec<String> = screens.iter().map(ScreenInfo::identifier).collect();
        display_ids.sort();

        let total_width = screens.iter().map(|s| s.frame.width as i64).sum();
        let total_height = screens
            .iter()
            .map(|s| (s.frame.y + s.frame.height) as i64)
            .max()
            .unwrap_or(0);

        DisplayConfiguration {
            external_display_count: external_count,
            display_ids,
            total_width,
            total_height,
            captured_at: Utc::now(),
        }
    }

    /// Identity comparison. Dimensions and capture time are informational
    /// and deliberately excluded.
    pub fn matches(&self, other: &DisplayConfiguration) -> bool {
        self.external_display_count == other.external_display_count
            && self.display_ids == other.display_ids
    }

    pub fn is_docked(&self) -> bool { self.external_display_count > 0 }
}
