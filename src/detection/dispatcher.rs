//! Transition Dispatcher - edge detection between detector and actuator
//!
//! Wraps a [`PostureDetector`] and an [`Actuator`]. For every side pair it
//! classifies the sample, and when the result differs from the posture in
//! force before the sample it commits the transition and fires exactly one
//! actuator reaction. Repeated samples of the same posture fire nothing.
//!
//! Actuator failures are logged and counted; detection carries on.

use std::collections::HashMap;

use tracing::{info, warn};

use super::PostureDetector;
use crate::actuator::{Actuator, ActuatorError};
use crate::config::DetectionConfig;
use crate::types::{Posture, SidePair};

/// Counters kept by the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct DispatchStats {
    pub samples: u64,
    pub transitions: u64,
    pub actuator_failures: u64,
    /// Entries into each posture
    pub entries: HashMap<Posture, u64>,
}

impl DispatchStats {
    /// Entry counts for every posture entered at least once, in declaration order.
    pub fn entries_by_posture(&self) -> Vec<(Posture, u64)> {
        Posture::ALL
            .iter()
            .filter_map(|p| self.entries.get(p).map(|&n| (*p, n)))
            .collect()
    }
}

/// Snapshot of the posture in force, for progress logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub posture: Posture,
    pub held_secs: f64,
    /// Only set while Jump is displayed
    pub jump_remaining_secs: Option<f64>,
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.1}s)", self.posture, self.held_secs)?;
        if let Some(remaining) = self.jump_remaining_secs {
            write!(f, " [{remaining:.1}s left]")?;
        }
        Ok(())
    }
}

pub struct TransitionDispatcher<A: Actuator> {
    detector: PostureDetector,
    actuator: A,
    stats: DispatchStats,
}

impl<A: Actuator> TransitionDispatcher<A> {
    pub fn new(config: DetectionConfig, actuator: A, start_time: f64) -> Self {
        Self {
            detector: PostureDetector::new(config, start_time),
            actuator,
            stats: DispatchStats::default(),
        }
    }

    pub fn detector(&self) -> &PostureDetector {
        &self.detector
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    pub fn current_posture(&self) -> Posture {
        self.detector.current_posture()
    }

    pub fn status(&self, now: f64) -> StatusReport {
        StatusReport {
            posture: self.detector.current_posture(),
            held_secs: self.detector.time_in_status(now),
            jump_remaining_secs: self.detector.jump_time_remaining(now),
        }
    }

    /// Classify one sample; fire the actuator on a posture change.
    ///
    /// Returns the posture in force after the sample.
    pub async fn update(&mut self, pair: SidePair, now: f64) -> Posture {
        self.stats.samples += 1;

        let before = self.detector.current_posture();
        let new = self.detector.determine_posture(pair, now);

        if new != before {
            self.detector.commit(before, new, now);
            self.stats.transitions += 1;
            *self.stats.entries.entry(new).or_insert(0) += 1;
            info!(
                from = %before,
                to = %new,
                left = pair.left,
                right = pair.right,
                "Posture changed"
            );

            if let Err(e) = self.fire(new).await {
                self.stats.actuator_failures += 1;
                warn!(posture = %new, actuator = self.actuator.name(), error = %e, "Actuator failed");
            }
        }

        self.detector.current_posture()
    }

    /// Release everything the actuator holds.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.actuator.reset().await {
            self.stats.actuator_failures += 1;
            warn!(actuator = self.actuator.name(), error = %e, "Actuator reset failed");
        }
    }

    async fn fire(&mut self, posture: Posture) -> Result<(), ActuatorError> {
        match posture {
            Posture::Standing => self.actuator.on_standing().await,
            Posture::Walking => self.actuator.on_walking().await,
            Posture::FlamingoIng => self.actuator.on_flamingo().await,
            Posture::Jump => self.actuator.on_jump().await,
            Posture::UserAbsent => self.actuator.on_absent().await,
        }
    }
}
