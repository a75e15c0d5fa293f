pub mod actor;
pub mod common;
pub mod engine;
pub mod model;
#[cfg(target_os = "macos")]
pub mod sys;
