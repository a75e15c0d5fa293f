//! macOS adapters behind the OS-independent seams.

pub mod accessibility;
pub mod app;
pub mod display_notify;
pub mod dock;
pub mod screen;
