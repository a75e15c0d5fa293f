//! Dock autohide control. Writes the Dock's `autohide` default and restarts
//! it so the change takes effect.

use std::process::Command;

use tracing::{info, warn};

use crate::actor::reactor::DockController;

pub struct Dock;

impl DockController for Dock {
    fn set_autohide(&self, hidden: bool) {
        info!("setting Dock autohide to {hidden}");

        let value = if hidden { "true" } else { "false" };
        let status = Command::new("defaults")
            .args(["write", "com.apple.dock", "autohide", "-bool", value])
            .status();
        match status {
            Ok(status) if status.success() => {}
            Ok(status) => {
                warn!("defaults write exited with {status}");
                return;
            }
            Err(e) => {
                warn!("could not run defaults: {e}");
                return;
            }
        }

        if let Err(e) = Command::new("killall").arg("Dock").status() {
            warn!("could not restart the Dock: {e}");
        }
    }
}
