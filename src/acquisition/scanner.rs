//! Joystick device discovery.
//!
//! Lists `js<N>` nodes under `/dev/input` so a board can be used without
//! naming its device, and so `--list-devices` has something to print.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::SourceError;
use crate::config::defaults::{JOYSTICK_DIR, JOYSTICK_PREFIX};

/// Joystick nodes under `/dev/input`, ordered by index.
pub fn scan_joysticks() -> Vec<PathBuf> {
    scan_joysticks_in(Path::new(JOYSTICK_DIR))
}

/// Joystick nodes (`js0`, `js1`, ...) in `dir`, ordered by index.
///
/// An unreadable directory yields an empty list.
pub fn scan_joysticks_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Cannot scan for joysticks");
            return Vec::new();
        }
    };

    let mut found: Vec<(u32, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let index = joystick_index(name.to_str()?)?;
            Some((index, entry.path()))
        })
        .collect();
    found.sort_by_key(|(index, _)| *index);
    found.into_iter().map(|(_, path)| path).collect()
}

/// The configured device if any, else the first joystick found in `dir`.
pub fn select_device(configured: Option<&Path>, dir: &Path) -> Result<PathBuf, SourceError> {
    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }
    let path = scan_joysticks_in(dir)
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::NoDevices(dir.to_path_buf()))?;
    info!(device = %path.display(), "Using first joystick found");
    Ok(path)
}

fn joystick_index(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(JOYSTICK_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
