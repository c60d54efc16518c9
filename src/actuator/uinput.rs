//! Thin `/dev/uinput` wrapper for creating virtual input devices.
//!
//! Only the handful of ioctls needed to declare keys and absolute axes and to
//! create/destroy the device are used. Events are written as raw
//! `struct input_event` records.

#![allow(unsafe_code)]

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;

use tracing::{debug, warn};

use super::ActuatorError;

pub const UINPUT_PATH: &str = "/dev/uinput";

// ============================================================================
// Event Codes (linux/input-event-codes.h)
// ============================================================================

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_ABS: u16 = 0x03;
pub const SYN_REPORT: u16 = 0;

pub const KEY_W: u16 = 17;
pub const KEY_Y: u16 = 21;
pub const KEY_X: u16 = 45;
pub const KEY_B: u16 = 48;
pub const KEY_SPACE: u16 = 57;

pub const BTN_A: u16 = 0x130;
pub const BTN_B: u16 = 0x131;
pub const BTN_X: u16 = 0x133;
pub const BTN_Y: u16 = 0x134;
pub const BTN_TL: u16 = 0x136;
pub const BTN_TR: u16 = 0x137;
pub const BTN_SELECT: u16 = 0x13a;
pub const BTN_START: u16 = 0x13b;
pub const BTN_MODE: u16 = 0x13c;
pub const BTN_THUMBL: u16 = 0x13d;
pub const BTN_THUMBR: u16 = 0x13e;

pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_RX: u16 = 0x03;
pub const ABS_RY: u16 = 0x04;

pub const BUS_USB: u16 = 0x03;

// ============================================================================
// ioctl Requests (linux/uinput.h, generic _IOC encoding)
// ============================================================================

const UI_DEV_CREATE: libc::c_ulong = 0x5501;
const UI_DEV_DESTROY: libc::c_ulong = 0x5502;
const UI_DEV_SETUP: libc::c_ulong = 0x405c_5503;
const UI_ABS_SETUP: libc::c_ulong = 0x401c_5504;
const UI_SET_EVBIT: libc::c_ulong = 0x4004_5564;
const UI_SET_KEYBIT: libc::c_ulong = 0x4004_5565;
const UI_SET_ABSBIT: libc::c_ulong = 0x4004_5567;

const UINPUT_MAX_NAME_SIZE: usize = 80;

#[repr(C)]
struct InputId {
    bustype: u16,
    vendor: u16,
    product: u16,
    version: u16,
}

#[repr(C)]
struct UinputSetup {
    id: InputId,
    name: [u8; UINPUT_MAX_NAME_SIZE],
    ff_effects_max: u32,
}

#[repr(C)]
struct InputAbsinfo {
    value: i32,
    minimum: i32,
    maximum: i32,
    fuzz: i32,
    flat: i32,
    resolution: i32,
}

#[repr(C)]
struct UinputAbsSetup {
    code: u16,
    absinfo: InputAbsinfo,
}

// ============================================================================
// Device Description
// ============================================================================

/// Absolute axis exposed by a virtual device.
#[derive(Debug, Clone, Copy)]
pub struct AbsAxis {
    pub code: u16,
    pub min: i32,
    pub max: i32,
}

/// Everything needed to create a virtual device.
#[derive(Debug, Clone)]
pub struct DeviceSpec<'a> {
    pub name: &'a str,
    pub vendor: u16,
    pub product: u16,
    pub keys: &'a [u16],
    pub axes: &'a [AbsAxis],
}

// ============================================================================
// Event Sink
// ============================================================================

/// One `input_event` without its timestamp (the kernel fills it in).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    pub fn key(code: u16, pressed: bool) -> Self {
        Self { kind: EV_KEY, code, value: i32::from(pressed) }
    }

    pub fn abs(code: u16, value: i32) -> Self {
        Self { kind: EV_ABS, code, value }
    }

    pub fn sync() -> Self {
        Self { kind: EV_SYN, code: SYN_REPORT, value: 0 }
    }
}

/// Destination for synthetic input events.
pub trait InputSink: Send {
    fn emit(&mut self, event: InputEvent) -> Result<(), ActuatorError>;

    /// Emit a batch followed by a single `SYN_REPORT`.
    fn emit_frame(&mut self, events: &[InputEvent]) -> Result<(), ActuatorError> {
        for event in events {
            self.emit(*event)?;
        }
        self.emit(InputEvent::sync())
    }
}

/// Recording sink for tests.
impl InputSink for Vec<InputEvent> {
    fn emit(&mut self, event: InputEvent) -> Result<(), ActuatorError> {
        self.push(event);
        Ok(())
    }
}

/// Recording sink that refuses the writes with the given indices (0-based).
///
/// Writes that reach the device are kept so tests can see which inputs are
/// still held afterwards.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingSink {
    pub delivered: Vec<InputEvent>,
    fail_at: Vec<usize>,
    attempts: usize,
}

#[cfg(test)]
impl FailingSink {
    pub fn failing_at(writes: &[usize]) -> Self {
        Self {
            fail_at: writes.to_vec(),
            ..Self::default()
        }
    }

    /// Whether `code` was last reported pressed.
    pub fn is_held(&self, code: u16) -> bool {
        self.delivered
            .iter()
            .rev()
            .find(|e| e.kind == EV_KEY && e.code == code)
            .is_some_and(|e| e.value != 0)
    }
}

#[cfg(test)]
impl InputSink for FailingSink {
    fn emit(&mut self, event: InputEvent) -> Result<(), ActuatorError> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_at.contains(&attempt) {
            return Err(ActuatorError::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe)));
        }
        self.delivered.push(event);
        Ok(())
    }
}

// ============================================================================
// uinput Device
// ============================================================================

/// A live virtual device; destroyed on drop.
pub struct UinputDevice {
    file: File,
    name: String,
}

impl UinputDevice {
    pub fn create(spec: &DeviceSpec<'_>) -> Result<Self, ActuatorError> {
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(UINPUT_PATH)
            .map_err(|e| ActuatorError::Unavailable(format!("cannot open {UINPUT_PATH}: {e}")))?;
        let fd = file.as_raw_fd();

        if !spec.keys.is_empty() {
            ioctl_int(fd, UI_SET_EVBIT, EV_KEY, "UI_SET_EVBIT")?;
            for &key in spec.keys {
                ioctl_int(fd, UI_SET_KEYBIT, key, "UI_SET_KEYBIT")?;
            }
        }

        if !spec.axes.is_empty() {
            ioctl_int(fd, UI_SET_EVBIT, EV_ABS, "UI_SET_EVBIT")?;
            for axis in spec.axes {
                ioctl_int(fd, UI_SET_ABSBIT, axis.code, "UI_SET_ABSBIT")?;
                let setup = UinputAbsSetup {
                    code: axis.code,
                    absinfo: InputAbsinfo {
                        value: 0,
                        minimum: axis.min,
                        maximum: axis.max,
                        fuzz: 0,
                        flat: 0,
                        resolution: 0,
                    },
                };
                ioctl_ptr(fd, UI_ABS_SETUP, &setup, "UI_ABS_SETUP")?;
            }
        }

        let mut name = [0u8; UINPUT_MAX_NAME_SIZE];
        // keep the trailing NUL
        let len = spec.name.len().min(UINPUT_MAX_NAME_SIZE - 1);
        name[..len].copy_from_slice(&spec.name.as_bytes()[..len]);
        let setup = UinputSetup {
            id: InputId {
                bustype: BUS_USB,
                vendor: spec.vendor,
                product: spec.product,
                version: 1,
            },
            name,
            ff_effects_max: 0,
        };
        ioctl_ptr(fd, UI_DEV_SETUP, &setup, "UI_DEV_SETUP")?;

        // SAFETY: fd is a valid open uinput descriptor; UI_DEV_CREATE takes no argument.
        let rc = unsafe { libc::ioctl(fd, UI_DEV_CREATE as _) };
        if rc < 0 {
            return Err(last_os_error("UI_DEV_CREATE"));
        }

        debug!(device = spec.name, "Created uinput device");
        Ok(Self {
            file,
            name: spec.name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl InputSink for UinputDevice {
    fn emit(&mut self, event: InputEvent) -> Result<(), ActuatorError> {
        // struct input_event: timeval, u16 type, u16 code, s32 value
        let mut record = vec![0u8; std::mem::size_of::<libc::timeval>()];
        record.extend_from_slice(&event.kind.to_ne_bytes());
        record.extend_from_slice(&event.code.to_ne_bytes());
        record.extend_from_slice(&event.value.to_ne_bytes());
        self.file.write_all(&record)?;
        Ok(())
    }
}

impl Drop for UinputDevice {
    fn drop(&mut self) {
        // SAFETY: the descriptor stays open until `file` is dropped after this.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), UI_DEV_DESTROY as _) };
        if rc < 0 {
            warn!(device = %self.name, error = %std::io::Error::last_os_error(), "Failed to destroy uinput device");
        }
    }
}

// ============================================================================
// ioctl Helpers
// ============================================================================

fn ioctl_int(fd: libc::c_int, request: libc::c_ulong, arg: u16, what: &str) -> Result<(), ActuatorError> {
    // SAFETY: the UI_SET_*BIT requests take a plain int argument.
    let rc = unsafe { libc::ioctl(fd, request as _, libc::c_int::from(arg)) };
    if rc < 0 {
        return Err(last_os_error(what));
    }
    Ok(())
}

fn ioctl_ptr<T>(fd: libc::c_int, request: libc::c_ulong, arg: &T, what: &str) -> Result<(), ActuatorError> {
    // SAFETY: `arg` is a #[repr(C)] struct matching the request's size and lives across the call.
    let rc = unsafe { libc::ioctl(fd, request as _, std::ptr::from_ref(arg)) };
    if rc < 0 {
        return Err(last_os_error(what));
    }
    Ok(())
}

fn last_os_error(what: &str) -> ActuatorError {
    ActuatorError::Unavailable(format!("{what} failed: {}", std::io::Error::last_os_error()))
}
