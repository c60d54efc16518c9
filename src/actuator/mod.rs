//! Actuators - turn posture transitions into synthetic input
//!
//! The dispatcher calls exactly one actuator method per accepted transition.
//! Backends:
//!
//! - [`KeyboardActuator`]: virtual keyboard, W held while walking, jump key tapped
//! - [`GamepadActuator`]: virtual gamepad, left stick forward, jump button pressed
//! - [`DryRunActuator`]: logs and records calls without touching the system
//!
//! Both device backends sit on a `/dev/uinput` device ([`uinput::UinputDevice`])
//! behind the [`InputSink`] seam so their key logic can be tested without one.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{OutputConfig, OutputKind};

mod dry_run;
mod gamepad;
mod keyboard;
pub mod uinput;

pub use dry_run::{ActuatorCall, DryRunActuator};
pub use gamepad::GamepadActuator;
pub use keyboard::KeyboardActuator;
pub use uinput::{InputEvent, InputSink, UinputDevice};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ActuatorError {
    /// The synthetic device could not be created (no uinput, no permission)
    #[error("Output device unavailable: {0}")]
    Unavailable(String),

    /// Writing to an existing synthetic device failed
    #[error("Output device I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Actuator Trait
// ============================================================================

/// Reaction to posture transitions.
///
/// Called from a single task, one transition at a time. `reset` must leave no
/// key or button held and must be safe to call more than once.
#[async_trait]
pub trait Actuator: Send {
    async fn on_standing(&mut self) -> Result<(), ActuatorError>;

    async fn on_walking(&mut self) -> Result<(), ActuatorError>;

    async fn on_flamingo(&mut self) -> Result<(), ActuatorError>;

    async fn on_jump(&mut self) -> Result<(), ActuatorError>;

    /// Nobody on the board. Most backends do nothing here.
    async fn on_absent(&mut self) -> Result<(), ActuatorError> {
        Ok(())
    }

    /// Release everything currently held.
    async fn reset(&mut self) -> Result<(), ActuatorError>;

    /// Human-readable backend name for logging.
    fn name(&self) -> &str;
}

#[async_trait]
impl<A: Actuator + ?Sized> Actuator for Box<A> {
    async fn on_standing(&mut self) -> Result<(), ActuatorError> {
        (**self).on_standing().await
    }

    async fn on_walking(&mut self) -> Result<(), ActuatorError> {
        (**self).on_walking().await
    }

    async fn on_flamingo(&mut self) -> Result<(), ActuatorError> {
        (**self).on_flamingo().await
    }

    async fn on_jump(&mut self) -> Result<(), ActuatorError> {
        (**self).on_jump().await
    }

    async fn on_absent(&mut self) -> Result<(), ActuatorError> {
        (**self).on_absent().await
    }

    async fn reset(&mut self) -> Result<(), ActuatorError> {
        (**self).reset().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ============================================================================
// Construction
// ============================================================================

/// Build the actuator selected by the output config.
///
/// A virtual gamepad that cannot be created falls back to the keyboard. A
/// keyboard that cannot be created is an error.
pub fn build_actuator(output: &OutputConfig, dry_run: bool) -> Result<Box<dyn Actuator>, ActuatorError> {
    if dry_run {
        info!("Dry run: postures are logged, no synthetic input is produced");
        return Ok(Box::new(DryRunActuator::new()));
    }

    match output.kind {
        OutputKind::Keyboard => Ok(Box::new(KeyboardActuator::create(output.jump_button)?)),
        OutputKind::VirtualJoystick => {
            match GamepadActuator::create(output.jump_button, output.jump_hold_ms) {
                Ok(gamepad) => Ok(Box::new(gamepad)),
                Err(e) => {
                    warn!(error = %e, "Virtual gamepad unavailable, falling back to keyboard output");
                    Ok(Box::new(KeyboardActuator::create(output.jump_button)?))
                }
            }
        }
    }
}
