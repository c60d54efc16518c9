//! Joystick data acquisition
//!
//! Reads raw `js_event` records from a Linux joystick node and turns axis
//! events into normalized [`AxisSample`](crate::types::AxisSample)s.

use std::path::{Path, PathBuf};

use thiserror::Error;

mod device;
mod js_event;
pub mod scanner;

pub use device::{JoystickDevice, ReadOutcome};
pub use js_event::JsEvent;
pub use scanner::{scan_joysticks, select_device};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Joystick device not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No joystick devices found under {}; make sure the board is connected and paired", .0.display())]
    NoDevices(PathBuf),

    #[error("Permission denied opening {} (is the user in the 'input' group?)", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Joystick device disconnected: {}", .0.display())]
    Disconnected(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub fn from_io(path: &Path, e: std::io::Error) -> Self {
        let path = path.to_path_buf();
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ if e.raw_os_error() == Some(libc::ENODEV) => Self::Disconnected(path),
            _ => Self::Io { path, source: e },
        }
    }
}
