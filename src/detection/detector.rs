//! Posture Detector - priority-ordered pattern cascade over side loads
//!
//! Each sample `(left, right, now)` is run through four recognizers in strict
//! priority order; the first that produces a posture wins:
//!
//! 1. **Jump / User Absent**: both sides near the heavy end of the window.
//!    A short episode is classified as a Jump when it ends; a long one
//!    escalates to User Absent while it lasts. Jump is then held for the
//!    display time and afterwards hands the previous posture back.
//! 2. **Flamingo**: one side raised above the midpoint for the hold time.
//! 3. **Walking**: one side raised; alternation refreshes the walking clock.
//! 4. **Walking persistence**: Walking survives short gaps between ticks.
//!
//! Anything else is Standing.
//!
//! Timestamps are seconds on a monotonic clock; they must never decrease.

use tracing::debug;

use crate::config::defaults::{BOARD_MIN, HALF_FRACTION};
use crate::config::DetectionConfig;
use crate::types::{board_range, Posture, Side, SidePair};

// ============================================================================
// Thresholds
// ============================================================================

/// Load thresholds derived once from the detection config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Distance from the heavy end that counts as "near zero" (0.0075 by default)
    pub zero: f64,
    /// Midpoint of the sensor window (-0.925)
    pub half: f64,
}

impl Thresholds {
    pub fn from_config(config: &DetectionConfig) -> Self {
        let range = board_range();
        Self {
            zero: range * config.jump_absence_threshold_percent,
            half: BOARD_MIN + range * HALF_FRACTION,
        }
    }

    /// Strictly within `zero` of the heavy end.
    pub fn near_zero(&self, v: f64) -> bool {
        (v - BOARD_MIN).abs() < self.zero
    }

    pub fn above_half(&self, v: f64) -> bool {
        v > self.half
    }

    pub fn below_half(&self, v: f64) -> bool {
        v < self.half
    }

    /// The side standing clear of the midpoint while the other sits below it.
    ///
    /// A value exactly on the midpoint is neither above nor below, so it never
    /// forms a one-foot stance.
    pub fn raised_side(&self, pair: SidePair) -> Option<Side> {
        if self.above_half(pair.left) && self.below_half(pair.right) {
            Some(Side::Left)
        } else if self.above_half(pair.right) && self.below_half(pair.left) {
            Some(Side::Right)
        } else {
            None
        }
    }
}

// ============================================================================
// Detector State
// ============================================================================

/// Everything the detector remembers between samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorState {
    pub current_posture: Posture,
    pub previous_posture: Posture,
    /// When `current_posture` was entered
    pub status_start_time: f64,
    /// Posture in force when the latest near-zero episode began
    pub pre_jump_posture: Posture,
    /// Start of the current one-foot stance
    pub one_foot_start_time: Option<f64>,
    /// Side raised during the current one-foot stance
    pub one_foot_side: Option<Side>,
    /// Start of the current near-zero episode
    pub both_sides_zero_start_time: Option<f64>,
    /// Latest accepted walking tick
    pub last_walking_pattern_time: f64,
    pub last_detected_side: Option<Side>,
}

impl DetectorState {
    fn new(start_time: f64) -> Self {
        Self {
            current_posture: Posture::Standing,
            previous_posture: Posture::Standing,
            status_start_time: start_time,
            pre_jump_posture: Posture::Standing,
            one_foot_start_time: None,
            one_foot_side: None,
            both_sides_zero_start_time: None,
            last_walking_pattern_time: 0.0,
            last_detected_side: None,
        }
    }
}

// ============================================================================
// Detector
// ============================================================================

pub struct PostureDetector {
    config: DetectionConfig,
    thresholds: Thresholds,
    state: DetectorState,
}

impl PostureDetector {
    /// Create a detector whose clock starts at `start_time`.
    pub fn new(config: DetectionConfig, start_time: f64) -> Self {
        Self {
            thresholds: Thresholds::from_config(&config),
            config,
            state: DetectorState::new(start_time),
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn current_posture(&self) -> Posture {
        self.state.current_posture
    }

    pub fn previous_posture(&self) -> Posture {
        self.state.previous_posture
    }

    /// Seconds the current posture has been held.
    pub fn time_in_status(&self, now: f64) -> f64 {
        (now - self.state.status_start_time).max(0.0)
    }

    /// Seconds of Jump display left, when Jump is the current posture.
    pub fn jump_time_remaining(&self, now: f64) -> Option<f64> {
        (self.state.current_posture == Posture::Jump)
            .then(|| (self.config.jump_display_time - self.time_in_status(now)).max(0.0))
    }

    /// Classify one sample.
    ///
    /// Mutates the pattern timers. The posture itself only changes through
    /// [`commit`](Self::commit), except that an expired Jump hands
    /// `current_posture` back to the pre-jump posture before the lower
    /// priorities run.
    pub fn determine_posture(&mut self, pair: SidePair, now: f64) -> Posture {
        if let Some(posture) = self.detect_jump_and_absence(pair, now) {
            return posture;
        }
        if let Some(posture) = self.detect_flamingo_stance(pair, now) {
            return posture;
        }
        if let Some(posture) = self.detect_walking_pattern(pair, now) {
            return posture;
        }
        if self.walking_persists(now) {
            return Posture::Walking;
        }
        Posture::Standing
    }

    /// Record an accepted transition from `from` to `to` at `now`.
    pub fn commit(&mut self, from: Posture, to: Posture, now: f64) {
        self.state.previous_posture = from;
        self.state.current_posture = to;
        self.state.status_start_time = now;
    }

    // ------------------------------------------------------------------------
    // Priority 1: Jump / User Absent
    // ------------------------------------------------------------------------

    fn detect_jump_and_absence(&mut self, pair: SidePair, now: f64) -> Option<Posture> {
        let t = self.thresholds;
        let both_near = t.near_zero(pair.left) && t.near_zero(pair.right);

        if both_near {
            match self.state.both_sides_zero_start_time {
                None => {
                    self.state.both_sides_zero_start_time = Some(now);
                    // a second take-off while Jump is displayed keeps the posture to return to
                    if self.state.current_posture != Posture::Jump {
                        self.state.pre_jump_posture = self.state.current_posture;
                    }
                    debug!(pre_jump = %self.state.pre_jump_posture, "Near-zero episode started");
                }
                Some(start) if now - start >= self.config.user_absent_time => {
                    return Some(Posture::UserAbsent);
                }
                Some(_) => {}
            }
        } else if let Some(start) = self.state.both_sides_zero_start_time.take() {
            let duration = now - start;
            debug!(duration_secs = duration, "Near-zero episode ended");
            if duration > 0.0 && duration < self.config.user_absent_time {
                return Some(Posture::Jump);
            }
        }

        if self.state.current_posture == Posture::Jump {
            if now - self.state.status_start_time < self.config.jump_display_time {
                return Some(Posture::Jump);
            }
            debug!(restored = %self.state.pre_jump_posture, "Jump display expired");
            self.state.current_posture = self.state.pre_jump_posture;
        }

        None
    }

    // ------------------------------------------------------------------------
    // Priority 2: Flamingo
    // ------------------------------------------------------------------------

    fn detect_flamingo_stance(&mut self, pair: SidePair, now: f64) -> Option<Posture> {
        let Some(side) = self.thresholds.raised_side(pair) else {
            self.state.one_foot_start_time = None;
            self.state.one_foot_side = None;
            return None;
        };

        match (self.state.one_foot_start_time, self.state.one_foot_side) {
            (Some(start), Some(held)) if held == side => {
                if now - start >= self.config.flamingo_hold_time {
                    return Some(Posture::FlamingoIng);
                }
            }
            // new stance, or the other foot came up
            _ => {
                self.state.one_foot_start_time = Some(now);
                self.state.one_foot_side = Some(side);
            }
        }
        None
    }

    // ------------------------------------------------------------------------
    // Priority 3: Walking
    // ------------------------------------------------------------------------

    fn detect_walking_pattern(&mut self, pair: SidePair, now: f64) -> Option<Posture> {
        let Some(side) = self.thresholds.raised_side(pair) else {
            self.state.last_detected_side = None;
            return None;
        };

        if self.state.last_detected_side != Some(side) {
            self.state.last_walking_pattern_time = now;
            self.state.last_detected_side = Some(side);
            debug!(%side, "Walking step");
        }
        Some(Posture::Walking)
    }

    // ------------------------------------------------------------------------
    // Priority 4: Walking persistence
    // ------------------------------------------------------------------------

    fn walking_persists(&self, now: f64) -> bool {
        self.state.current_posture == Posture::Walking
            && now - self.state.last_walking_pattern_time <= self.config.walking_hold_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.02;

    fn detector() -> PostureDetector {
        PostureDetector::new(DetectionConfig::default(), 0.0)
    }

    /// Classify and commit like the dispatcher does, returning the posture in force.
    fn step(d: &mut PostureDetector, left: f64, right: f64, now: f64) -> Posture {
        let before = d.current_posture();
        let new = d.determine_posture(SidePair::new(left, right), now);
        if new != before {
            d.commit(before, new, now);
        }
        d.current_posture()
    }

    #[test]
    fn test_default_thresholds() {
        let t = Thresholds::from_config(&DetectionConfig::default());
        assert!((t.zero - 0.0075).abs() < 1e-12);
        assert!((t.half - (-0.925)).abs() < 1e-12);
    }

    #[test]
    fn test_near_zero_is_strict_distance_from_heavy_end() {
        let t = Thresholds::from_config(&DetectionConfig::default());
        // |(-0.9926) - (-1.0)| = 0.0074 < 0.0075
        assert!(t.near_zero(-0.9926));
        assert!(t.near_zero(-1.0));
        assert!(t.near_zero(-0.999));
        // 0.008 and 0.0076 are outside the band
        assert!(!t.near_zero(-0.992));
        assert!(!t.near_zero(-0.9924));
        // the unloaded end is nowhere near
        assert!(!t.near_zero(-0.85));
    }

    #[test]
    fn test_midpoint_is_neither_side() {
        let t = Thresholds::from_config(&DetectionConfig::default());
        let half = t.half;
        assert_eq!(t.raised_side(SidePair::new(half, -0.95)), None);
        assert_eq!(t.raised_side(SidePair::new(-0.88, half)), None);
        assert_eq!(t.raised_side(SidePair::new(-0.88, -0.95)), Some(Side::Left));
        assert_eq!(t.raised_side(SidePair::new(-0.95, -0.88)), Some(Side::Right));
        assert_eq!(t.raised_side(SidePair::new(-0.88, -0.88)), None);
        assert_eq!(t.raised_side(SidePair::new(-0.95, -0.95)), None);
    }

    #[test]
    fn test_balanced_load_stays_standing() {
        let mut d = detector();
        for i in 0..100 {
            assert_eq!(step(&mut d, -0.88, -0.88, f64::from(i) * DT), Posture::Standing);
        }
    }

    #[test]
    fn test_first_tick_is_walking() {
        let mut d = detector();
        assert_eq!(step(&mut d, -0.88, -0.95, 0.0), Posture::Walking);
        assert_eq!(d.state().last_detected_side, Some(Side::Left));
        assert_eq!(d.state().one_foot_start_time, Some(0.0));
    }

    #[test]
    fn test_same_side_ticks_do_not_refresh_walking_clock() {
        let mut d = detector();
        step(&mut d, -0.88, -0.95, 0.10);
        step(&mut d, -0.88, -0.95, 0.12);
        step(&mut d, -0.88, -0.95, 0.14);
        assert_eq!(d.current_posture(), Posture::Walking);
        assert_eq!(d.state().last_walking_pattern_time, 0.10);
    }

    #[test]
    fn test_alternation_refreshes_walking_clock() {
        let mut d = detector();
        let ticks = [(-0.88, -0.95), (-0.95, -0.88), (-0.88, -0.95), (-0.95, -0.88)];
        for (i, (l, r)) in ticks.iter().enumerate() {
            let now = 0.1 + i as f64 * DT;
            step(&mut d, *l, *r, now);
            assert_eq!(d.state().last_walking_pattern_time, now);
        }
        assert_eq!(d.state().last_detected_side, Some(Side::Right));
    }

    #[test]
    fn test_no_tick_clears_last_side() {
        let mut d = detector();
        step(&mut d, -0.88, -0.95, 0.0);
        step(&mut d, -0.88, -0.88, DT);
        assert_eq!(d.state().last_detected_side, None);
        assert_eq!(d.state().one_foot_start_time, None);
    }

    #[test]
    fn test_walking_decays_after_hold() {
        let mut d = detector();
        step(&mut d, -0.88, -0.95, 1.0);
        step(&mut d, -0.95, -0.88, 1.02);
        // last alternation at 1.02; hold is inclusive
        assert_eq!(step(&mut d, -0.88, -0.88, 1.50), Posture::Walking);
        assert_eq!(step(&mut d, -0.88, -0.88, 1.51), Posture::Walking);
        assert_eq!(step(&mut d, -0.88, -0.88, 1.54), Posture::Standing);
    }

    #[test]
    fn test_flamingo_after_hold_time() {
        let mut d = detector();
        let mut now = 0.0;
        while now < 0.49 {
            let p = step(&mut d, -0.88, -0.95, now);
            assert_ne!(p, Posture::FlamingoIng, "flamingo too early at {now}");
            now += DT;
        }
        assert_eq!(step(&mut d, -0.88, -0.95, 0.5), Posture::FlamingoIng);
    }

    #[test]
    fn test_switching_feet_restarts_flamingo_timer() {
        let mut d = detector();
        step(&mut d, -0.88, -0.95, 0.0);
        step(&mut d, -0.88, -0.95, 0.3);
        step(&mut d, -0.95, -0.88, 0.4);
        assert_eq!(d.state().one_foot_start_time, Some(0.4));
        assert_eq!(d.state().one_foot_side, Some(Side::Right));
        assert_eq!(step(&mut d, -0.95, -0.88, 0.6), Posture::Walking);
        assert_eq!(step(&mut d, -0.95, -0.88, 0.95), Posture::FlamingoIng);
    }

    #[test]
    fn test_short_episode_is_jump_on_release_only() {
        let mut d = detector();
        step(&mut d, -0.88, -0.88, 0.0);
        for i in 1..=10 {
            let p = step(&mut d, -0.999, -0.999, f64::from(i) * DT);
            assert_ne!(p, Posture::Jump, "jump must not be emitted during the episode");
        }
        assert_eq!(step(&mut d, -0.9, -0.9, 0.22), Posture::Jump);
        assert_eq!(d.state().pre_jump_posture, Posture::Standing);
        assert_eq!(d.state().both_sides_zero_start_time, None);
    }

    #[test]
    fn test_jump_is_sticky_then_restores() {
        let mut d = detector();
        step(&mut d, -0.999, -0.999, 0.0);
        assert_eq!(step(&mut d, -0.9, -0.9, 0.2), Posture::Jump);
        // a one-foot stance during the display window does not interrupt it
        assert_eq!(step(&mut d, -0.88, -0.95, 0.7), Posture::Jump);
        assert_eq!(step(&mut d, -0.9, -0.9, 1.19), Posture::Jump);
        assert_eq!(step(&mut d, -0.9, -0.9, 1.25), Posture::Standing);
        assert_eq!(d.previous_posture(), Posture::Jump);
    }

    #[test]
    fn test_expiry_restores_before_lower_rules() {
        let mut d = detector();
        step(&mut d, -0.88, -0.95, 0.0);
        step(&mut d, -0.95, -0.88, 0.02);
        assert_eq!(d.current_posture(), Posture::Walking);
        step(&mut d, -0.999, -0.999, 0.04);
        assert_eq!(step(&mut d, -0.9, -0.9, 0.1), Posture::Jump);
        assert_eq!(d.state().pre_jump_posture, Posture::Walking);

        // expiry sample: restoration happens inside determine_posture
        let new = d.determine_posture(SidePair::new(-0.9, -0.9), 1.2);
        assert_eq!(d.current_posture(), Posture::Walking);
        // walking clock is stale, so persistence does not hold
        assert_eq!(new, Posture::Standing);
    }

    #[test]
    fn test_take_off_during_jump_keeps_pre_jump_posture() {
        let mut d = detector();
        step(&mut d, -0.88, -0.95, 0.0);
        step(&mut d, -0.999, -0.999, 0.02);
        assert_eq!(step(&mut d, -0.9, -0.9, 0.1), Posture::Jump);
        step(&mut d, -0.999, -0.999, 0.3);
        assert_eq!(d.state().pre_jump_posture, Posture::Walking);
        // second landing while displaying does not retrigger
        assert_eq!(step(&mut d, -0.9, -0.9, 0.4), Posture::Jump);
        assert_eq!(d.state().status_start_time, 0.1);
    }

    #[test]
    fn test_long_episode_is_absent_not_jump() {
        let mut d = detector();
        let mut saw_absent_at = None;
        for i in 0..60 {
            let now = f64::from(i) * DT;
            let p = step(&mut d, -0.999, -0.999, now);
            assert_ne!(p, Posture::Jump);
            if p == Posture::UserAbsent && saw_absent_at.is_none() {
                saw_absent_at = Some(now);
            }
        }
        let at = saw_absent_at.expect("user absent expected");
        assert!(at >= 1.0 - 1e-9, "absent reported too early at {at}");
        assert_eq!(d.current_posture(), Posture::UserAbsent);
        // leaving after a long episode is not a jump
        assert_ne!(step(&mut d, -0.9, -0.9, 1.2), Posture::Jump);
    }

    #[test]
    fn test_release_at_episode_start_is_not_jump() {
        let mut d = detector();
        step(&mut d, -0.999, -0.999, 0.5);
        // zero-length episode
        assert_eq!(step(&mut d, -0.9, -0.9, 0.5), Posture::Standing);
    }
}
