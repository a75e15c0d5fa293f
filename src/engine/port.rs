//! Capability interface over the OS window-inspection layer. The engines
//! only see this trait pair; the macOS adapter lives in `sys::accessibility`
//! and a fake lives in `engine::testing`.

use thiserror::Error;

use crate::model::Rect;

pub type Pid = i32;

/// A regular, user-visible application.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub name: String,
    pub bundle_id: Option<String>,
    pub pid: Pid,
}

/// Per-window failure. Never fatal to a batch; the window is skipped and the
/// operation's count reflects the shortfall.
#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("window attribute could not be read")]
    ReadFailed,
    #[error("window attribute could not be written")]
    WriteFailed,
    #[error("window does not support this action")]
    Unsupported,
    #[error("window is gone")]
    Gone,
}

pub trait WindowInspector {
    type Window: WindowHandle;

    /// Whether the one-time window-inspection permission has been granted.
    /// Checked before any enumeration attempt.
    fn is_trusted(&self) -> bool;

    fn applications(&self) -> Vec<Application>;

    fn windows(&self, app: &Application) -> Vec<Self::Window>;
}

pub trait WindowHandle {
    fn title(&self) -> Result<String, WindowError>;
    fn frame(&self) -> Result<Rect, WindowError>;
    fn set_frame(&self, frame: Rect) -> Result<(), WindowError>;
    fn is_minimized(&self) -> Result<bool, WindowError>;
    /// Press the window's native zoom affordance, if it has one.
    fn perform_zoom(&self) -> Result<(), WindowError>;
}
