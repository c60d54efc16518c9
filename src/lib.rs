//! balance-walker: balance-board posture controller
//!
//! Reads a four-sensor balance board exposed as a Linux joystick, classifies
//! the user's posture and drives a game through a virtual keyboard or gamepad.
//!
//! ## Architecture
//!
//! - **Acquisition**: non-blocking `js_event` reader and device discovery
//! - **Pipeline**: aggregator folding axis events into left/right side means
//! - **Detection**: priority state machine (Jump / User Absent, Flamingo,
//!   Walking, Standing) and the transition dispatcher
//! - **Actuator**: synthetic input backends on `/dev/uinput`

pub mod acquisition;
pub mod actuator;
pub mod config;
pub mod detection;
pub mod pipeline;
pub mod types;

pub use config::BoardConfig;

pub use types::{AxisSample, AxisVector, Posture, Side, SidePair};

pub use detection::{PostureDetector, TransitionDispatcher};

pub use actuator::{build_actuator, Actuator, ActuatorError};

pub use acquisition::SourceError;
