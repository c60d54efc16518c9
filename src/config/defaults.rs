//! System-wide default constants.
//!
//! Centralises the fixed numbers of the board, the wire format and the
//! pipeline. Tunable timings live in [`super::DetectionConfig`].

// ============================================================================
// Board
// ============================================================================

/// Number of pressure sensors on the board.
pub const AXIS_COUNT: usize = 4;

/// Heavy end of the meaningful sensor window.
pub const BOARD_MIN: f64 = -1.0;

/// Unloaded end of the meaningful sensor window.
pub const BOARD_MAX: f64 = -0.85;

/// Fraction of the window where the "one side raised" midpoint sits.
pub const HALF_FRACTION: f64 = 0.5;

// ============================================================================
// Detection Timings
// ============================================================================

pub const WALKING_HOLD_SECS: f64 = 0.5;
pub const FLAMINGO_HOLD_SECS: f64 = 0.5;
pub const JUMP_DISPLAY_SECS: f64 = 1.0;
pub const USER_ABSENT_SECS: f64 = 1.0;

/// Fraction of the window that counts as "near minimum" (5%).
pub const JUMP_ABSENCE_THRESHOLD_PERCENT: f64 = 0.05;

// ============================================================================
// Joystick Wire Format
// ============================================================================

/// Size of one `js_event` record (u32 time, i16 value, u8 type, u8 number).
pub const JS_EVENT_SIZE: usize = 8;

/// `JS_EVENT_AXIS`
pub const JS_EVENT_AXIS: u8 = 0x02;

/// Divisor that maps a raw `i16` axis value into `[-1.0, +1.0]`.
pub const AXIS_NORMALIZER: f64 = 32767.0;

/// Glob-like prefix scanned for joystick devices.
pub const JOYSTICK_DIR: &str = "/dev/input";
pub const JOYSTICK_PREFIX: &str = "js";

// ============================================================================
// Pipeline
// ============================================================================

/// Sleep when the device has no pending event (milliseconds).
pub const POLL_INTERVAL_MS: u64 = 10;

/// Emit a debug progress line every N axis events.
pub const PROGRESS_LOG_INTERVAL: u64 = 500;

// ============================================================================
// Output
// ============================================================================

/// How long the gamepad holds the jump button down (milliseconds).
pub const JUMP_HOLD_MS: u64 = 100;

/// Virtual gamepad stick range.
pub const STICK_MIN: i32 = -32768;
pub const STICK_MAX: i32 = 32767;

/// Stick deflection used for "forward" (evdev convention: negative Y is up).
pub const STICK_FORWARD: i32 = -32767;
