//! Linux joystick `js_event` decoding.
//!
//! ```text
//! offset  size  field
//!   0      4    time    (u32, ms, little-endian)
//!   4      2    value   (i16, little-endian)
//!   6      1    type    (0x01 button, 0x02 axis, | 0x80 init)
//!   7      1    number  (axis / button index)
//! ```
//!
//! Only plain axis events are used. Init-flagged events have a different
//! type byte and are ignored along with buttons.

use crate::config::defaults::{AXIS_NORMALIZER, JS_EVENT_AXIS, JS_EVENT_SIZE};
use crate::types::AxisSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsEvent {
    pub time_ms: u32,
    pub value: i16,
    pub kind: u8,
    pub number: u8,
}

impl JsEvent {
    /// Decode one record. Anything but exactly 8 bytes is rejected.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; JS_EVENT_SIZE] = bytes.try_into().ok()?;
        Some(Self {
            time_ms: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            value: i16::from_le_bytes([bytes[4], bytes[5]]),
            kind: bytes[6],
            number: bytes[7],
        })
    }

    pub fn is_axis(&self) -> bool {
        self.kind == JS_EVENT_AXIS
    }

    /// Raw value scaled into `[-1.0, +1.0]` (-32768 maps just past -1.0).
    pub fn normalized(&self) -> f64 {
        f64::from(self.value) / AXIS_NORMALIZER
    }

    /// The axis reading carried by this event, if it is an axis event for
    /// one of the first `axis_count` axes.
    pub fn axis_sample(&self, axis_count: usize) -> Option<AxisSample> {
        let index = usize::from(self.number);
        (self.is_axis() && index < axis_count).then(|| AxisSample {
            index,
            value: self.normalized(),
        })
    }
}
