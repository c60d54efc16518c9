//! Posture detection
//!
//! - [`PostureDetector`]: classifies each side pair into a [`Posture`](crate::types::Posture)
//! - [`TransitionDispatcher`]: turns posture changes into actuator calls

mod detector;
mod dispatcher;

pub use detector::{DetectorState, PostureDetector, Thresholds};
pub use dispatcher::{DispatchStats, StatusReport, TransitionDispatcher};
