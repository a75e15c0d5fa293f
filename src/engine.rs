//! The capture, restore, and zoom engines. All three go through the
//! [`port::WindowInspector`] seam and share the same failure policy: a
//! missing accessibility grant aborts the whole operation, anything that
//! goes wrong with a single window is skipped and reflected in the count.

pub mod capture;
pub mod port;
pub mod restore;
pub mod zoom;

#[cfg(test)]
pub mod testing;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("accessibility permission not granted")]
    PermissionDenied,
}
