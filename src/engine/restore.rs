use tracing::{debug, info};

use crate::engine::Error;
use crate::engine::port::{WindowHandle, WindowInspector};
use crate::model::Layout;

/// Re-applies a stored layout's frames onto currently running windows.
///
/// Matching is best-effort: a record finds its application by bundle id and
/// its window by exact title. Records whose app is not running or whose
/// title no longer exists are skipped. If two windows of one app share a
/// title, the first match wins and may be the wrong one; this is an accepted
/// limitation of reconstructing identity from `(bundle_id, title)`.
///
/// Returns the number of windows repositioned. Zero is a no-op outcome for
/// the caller to interpret, not an error.
pub fn restore_layout<I: WindowInspector>(inspector: &I, layout: &Layout) -> Result<usize, Error> {
    if !inspector.is_trusted() {
        return Err(Error::PermissionDenied);
    }

    let apps = inspector.applications();
    let mut restored = 0;

    for record in &layout.windows {
        let Some(app) = apps.iter().find(|a| a.bundle_id == record.bundle_id) else {
            debug!("{} is not running, skipping its record", record.app_name);
            continue;
        };
        let Some(window) = inspector
            .windows(app)
            .into_iter()
            .find(|w| w.title().is_ok_and(|t| t == record.title))
        else {
            debug!("no window titled {:?} in {}", record.title, app.name);
            continue;
        };
        match window.set_frame(record.frame) {
            Ok(()) => restored += 1,
            Err(e) => debug!("could not reposition {:?} of {}: {e}", record.title, app.name),
        }
    }

    info!("restored {} of {} windows from '{}'", restored, layout.windows.len(), layout.name);
    Ok(restored)
}
