//! Sample Aggregator - folds single-axis updates into side pairs.

use crate::config::defaults::AXIS_COUNT;
use crate::types::{AxisVector, SidePair};

/// Latest value per sensor; all axes start at 0.0.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    axes: AxisVector,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one axis value and recompute the side pair.
    ///
    /// Returns `None` (and changes nothing) for an index outside the board.
    pub fn update(&mut self, index: usize, value: f64) -> Option<SidePair> {
        if index >= AXIS_COUNT {
            return None;
        }
        self.axes.0[index] = value;
        Some(self.axes.side_pair())
    }

    pub fn axes(&self) -> &AxisVector {
        &self.axes
    }

    pub fn side_pair(&self) -> SidePair {
        self.axes.side_pair()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_update_averages_with_zeros() {
        let mut agg = Aggregator::new();
        let pair = agg.update(0, -0.9).unwrap();
        assert!((pair.right - (-0.45)).abs() < 1e-12);
        assert_eq!(pair.left, 0.0);
    }

    #[test]
    fn test_axis_mapping() {
        let mut agg = Aggregator::new();
        agg.update(0, -0.90);
        agg.update(1, -0.94);
        agg.update(2, -0.86);
        let pair = agg.update(3, -0.88).unwrap();
        assert!((pair.right - (-0.92)).abs() < 1e-12);
        assert!((pair.left - (-0.87)).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_index_ignored() {
        let mut agg = Aggregator::new();
        agg.update(1, -0.5);
        assert!(agg.update(4, -1.0).is_none());
        assert!(agg.update(usize::MAX, -1.0).is_none());
        assert_eq!(agg.axes().0, [0.0, -0.5, 0.0, 0.0]);
    }
}
