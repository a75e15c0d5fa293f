//! Display reconfiguration notifications, delivered on the main run loop.

use std::ffi::c_void;

use objc2_foundation::MainThreadMarker;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::actor::reactor::{self, Event};
use crate::sys::screen;

type CGDirectDisplayID = u32;
type CGDisplayChangeSummaryFlags = u32;

const BEGIN_CONFIGURATION_FLAG: CGDisplayChangeSummaryFlags = 1;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGDisplayRegisterReconfigurationCallback(
        callback: unsafe extern "C-unwind" fn(
            display: CGDirectDisplayID,
            flags: CGDisplayChangeSummaryFlags,
            user_info: *mut c_void,
        ),
        user_info: *mut c_void,
    ) -> i32;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFRunLoopRun();
}

/// Blocks on the main run loop, delivering reconfiguration callbacks.
pub fn run_main_loop(_mtm: MainThreadMarker) {
    unsafe { CFRunLoopRun() };
}

static EVENTS_TX: OnceCell<reactor::Sender> = OnceCell::new();

unsafe extern "C-unwind" fn reconfig_callback(
    display: CGDirectDisplayID,
    flags: CGDisplayChangeSummaryFlags,
    _user_info: *mut c_void,
) {
    // The callback fires once when reconfiguration begins and again per
    // display when it completes; only the completions matter. The reactor
    // coalesces the per-display burst.
    if flags & BEGIN_CONFIGURATION_FLAG != 0 {
        return;
    }
    debug!(display, flags, "display reconfigured");

    // Reconfiguration callbacks are delivered on the main run loop.
    let Some(mtm) = MainThreadMarker::new() else {
        warn!("display callback fired off the main thread, ignoring");
        return;
    };
    if let Some(tx) = EVENTS_TX.get() {
        tx.send(Event::DisplaysChanged(screen::screens(mtm)));
    }
}

/// Registers for reconfiguration callbacks. Must be called from the main
/// thread before its run loop starts.
pub fn init(events_tx: reactor::Sender) {
    if EVENTS_TX.set(events_tx).is_err() {
        warn!("display notifications already initialized");
        return;
    }
    let err =
        unsafe { CGDisplayRegisterReconfigurationCallback(reconfig_callback, std::ptr::null_mut()) };
    if err != 0 {
        warn!("CGDisplayRegisterReconfigurationCallback failed: {err}");
    }
}
