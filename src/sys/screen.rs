use objc2_app_kit::NSScreen;
use objc2_core_foundation::CGRect;
use objc2_foundation::MainThreadMarker;

use crate::model::{Rect, ScreenInfo};

fn rect(cg: CGRect) -> Rect {
    Rect::new(cg.origin.x, cg.origin.y, cg.size.width, cg.size.height)
}

/// The currently attached screens. The main screen is first; the list may be
/// empty (e.g. a headless wake).
pub fn screens(mtm: MainThreadMarker) -> Vec<ScreenInfo> {
    NSScreen::screens(mtm)
        .iter()
        .map(|screen| ScreenInfo {
            frame: rect(screen.frame()),
            visible_frame: rect(screen.visibleFrame()),
        })
        .collect()
}
