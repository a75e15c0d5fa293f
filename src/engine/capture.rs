use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::engine::Error;
use crate::engine::port::{WindowHandle, WindowInspector};
use crate::model::{DisplayConfiguration, Layout, ScreenInfo, WindowRecord};

/// Snapshots every eligible window into a layout stamped with
/// `configuration`. Windows whose position or size cannot be read are
/// skipped, not failed; a layout with no windows is valid. No window is
/// mutated.
pub fn capture_layout<I: WindowInspector>(
    inspector: &I,
    screens: &[ScreenInfo],
    configuration: DisplayConfiguration,
    excluded: &HashSet<String>,
    name: &str,
) -> Result<Layout, Error> {
    if !inspector.is_trusted() {
        return Err(Error::PermissionDenied);
    }

    let mut windows = Vec::new();
    for app in inspector.applications() {
        if excluded.contains(&app.name) {
            debug!("skipping excluded app {}", app.name);
            continue;
        }
        for window in inspector.windows(&app) {
            let frame = match window.frame() {
                Ok(frame) => frame,
                Err(e) => {
                    debug!("skipping unreadable window of {}: {e}", app.name);
                    continue;
                }
            };
            // Title and minimized state are best-effort matching keys.
            let title = window.title().unwrap_or_default();
            let is_minimized = window.is_minimized().unwrap_or(false);
            let screen_index = screens
                .iter()
                .position(|s| s.frame.contains_point(frame.x, frame.y))
                .unwrap_or(0);

            windows.push(WindowRecord {
                app_name: app.name.clone(),
                bundle_id: app.bundle_id.clone(),
                title,
                frame,
                is_minimized,
                screen_index,
            });
        }
    }

    info!("captured {} windows into layout '{}'", windows.len(), name);
    Ok(Layout {
        configuration,
        windows,
        name: name.to_string(),
        saved_at: Utc::now(),
    })
}
