use objc2::msg_send;
use objc2::rc::Retained;
use objc2_app_kit::{NSApplicationActivationPolicy, NSRunningApplication, NSWorkspace};
use objc2_foundation::NSString;

use crate::engine::port::{Application, Pid};

pub trait NSRunningApplicationExt {
    fn pid(&self) -> Pid;
    fn bundle_id(&self) -> Option<Retained<NSString>>;
    fn localized_name(&self) -> Option<Retained<NSString>>;
}

impl NSRunningApplicationExt for NSRunningApplication {
    fn pid(&self) -> Pid { unsafe { msg_send![self, processIdentifier] } }

    fn bundle_id(&self) -> Option<Retained<NSString>> { self.bundleIdentifier() }

    fn localized_name(&self) -> Option<Retained<NSString>> { self.localizedName() }
}

/// Regular, user-visible applications only; agents and background-only
/// processes are filtered out.
pub fn running_applications() -> Vec<Application> {
    NSWorkspace::sharedWorkspace()
        .runningApplications()
        .into_iter()
        .filter(|app| app.activationPolicy() == NSApplicationActivationPolicy::Regular)
        .flat_map(|app| {
            Some(Application {
                name: app.localized_name()?.to_string(),
                bundle_id: app.bundle_id().as_deref().map(ToString::to_string),
                pid: app.pid(),
            })
        })
        .collect()
}
