//! Shared data structures for the balance-board posture pipeline
//!
//! - Sample side: AxisSample (one reading), AxisVector (latest value per sensor),
//!   SidePair (pad-half means)
//! - Detection side: Posture (what the user is doing), Side (which half is raised)

use serde::{Deserialize, Serialize};

use crate::config::defaults::{AXIS_COUNT, BOARD_MAX, BOARD_MIN};

// ============================================================================
// Sensor Window
// ============================================================================

/// Width of the meaningful sensor window (`|MAX - MIN|`, nominally 0.15).
pub fn board_range() -> f64 {
    (BOARD_MAX - BOARD_MIN).abs()
}

// ============================================================================
// Samples
// ============================================================================

/// Latest normalized value for each of the four pressure sensors.
///
/// Values live in `[-1.0, +1.0]`; only `[-1.0, -0.85]` carries meaning.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisVector(pub [f64; AXIS_COUNT]);

impl AxisVector {
    /// Mean of the two axes on each pad half.
    ///
    /// Axes 0 and 1 are the right half, axes 2 and 3 the left half.
    pub fn side_pair(&self) -> SidePair {
        let a = &self.0;
        SidePair {
            left: (a[2] + a[3]) / 2.0,
            right: (a[0] + a[1]) / 2.0,
        }
    }
}

/// One normalized axis reading taken off the joystick stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSample {
    pub index: usize,
    pub value: f64,
}

/// Per-half load readings fed to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SidePair {
    pub left: f64,
    pub right: f64,
}

impl SidePair {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

// ============================================================================
// Detection
// ============================================================================

/// What the user on the board is currently doing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum Posture {
    #[default]
    Standing,
    Walking,
    FlamingoIng,
    Jump,
    UserAbsent,
}

impl Posture {
    pub const ALL: [Posture; 5] = [
        Posture::Standing,
        Posture::Walking,
        Posture::FlamingoIng,
        Posture::Jump,
        Posture::UserAbsent,
    ];
}

impl std::fmt::Display for Posture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Posture::Standing => write!(f, "Standing"),
            Posture::Walking => write!(f, "Walking"),
            Posture::FlamingoIng => write!(f, "Flamingo-ing"),
            Posture::Jump => write!(f, "Jump!"),
            Posture::UserAbsent => write!(f, "User Absent"),
        }
    }
}

/// Pad half identified by a walking tick (the half that is above the midpoint).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_pair_means() {
        let axes = AxisVector([-0.90, -0.94, -0.86, -0.88]);
        let pair = axes.side_pair();
        assert!((pair.right - (-0.92)).abs() < 1e-12);
        assert!((pair.left - (-0.87)).abs() < 1e-12);
    }

    #[test]
    fn test_initial_axes_are_zero() {
        let pair = AxisVector::default().side_pair();
        assert_eq!(pair, SidePair::new(0.0, 0.0));
    }

    #[test]
    fn test_posture_display_labels() {
        assert_eq!(Posture::Standing.to_string(), "Standing");
        assert_eq!(Posture::FlamingoIng.to_string(), "Flamingo-ing");
        assert_eq!(Posture::Jump.to_string(), "Jump!");
        assert_eq!(Posture::UserAbsent.to_string(), "User Absent");
        assert_eq!(Posture::default(), Posture::Standing);
    }

    #[test]
    fn test_board_range_width() {
        assert!((board_range() - 0.15).abs() < 1e-12);
    }
}
