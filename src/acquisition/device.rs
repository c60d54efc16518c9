//! Non-blocking reader for a Linux joystick device node.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{JsEvent, SourceError};
use crate::config::defaults::JS_EVENT_SIZE;

/// Result of one non-blocking read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Event(JsEvent),
    /// A short read; the bytes are dropped
    Malformed(usize),
    /// Nothing to read right now
    Pending,
    /// The node returned end-of-file
    Eof,
}

pub struct JoystickDevice {
    file: File,
    path: PathBuf,
}

impl JoystickDevice {
    /// Open `path` read-only and non-blocking.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|e| SourceError::from_io(path, e))?;
        info!(device = %path.display(), "Opened joystick device");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read at most one `js_event` without blocking.
    pub fn read_event(&mut self) -> Result<ReadOutcome, SourceError> {
        let mut buf = [0u8; JS_EVENT_SIZE];
        match self.file.read(&mut buf) {
            Ok(0) => Ok(ReadOutcome::Eof),
            Ok(n) if n == JS_EVENT_SIZE => Ok(JsEvent::decode(&buf)
                .map_or(ReadOutcome::Malformed(n), ReadOutcome::Event)),
            Ok(n) => Ok(ReadOutcome::Malformed(n)),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                Ok(ReadOutcome::Pending)
            }
            Err(e) => Err(SourceError::from_io(&self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_records_then_eof() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&10u32.to_le_bytes());
        bytes.extend_from_slice(&(-32000i16).to_le_bytes());
        bytes.extend_from_slice(&[0x02, 1]);
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();

        let mut dev = JoystickDevice::open(file.path()).unwrap();
        match dev.read_event().unwrap() {
            ReadOutcome::Event(ev) => {
                assert_eq!(ev.number, 1);
                assert_eq!(ev.value, -32000);
            }
            other => panic!("expected event, got {other:?}"),
        }
        assert_eq!(dev.read_event().unwrap(), ReadOutcome::Eof);
    }

    #[test]
    fn test_short_tail_is_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
        file.flush().unwrap();
        let mut dev = JoystickDevice::open(file.path()).unwrap();
        assert_eq!(dev.read_event().unwrap(), ReadOutcome::Malformed(3));
    }

    #[test]
    fn test_missing_device_is_not_found() {
        let err = JoystickDevice::open(Path::new("/nonexistent/js9")).err().unwrap();
        assert!(matches!(err, SourceError::NotFound(_)));
    }
}
