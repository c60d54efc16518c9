//! Virtual keyboard backend.
//!
//! | Posture     | Reaction                  |
//! |-------------|---------------------------|
//! | Walking     | hold W                    |
//! | Standing    | release W                 |
//! | Flamingo    | release W                 |
//! | Jump        | tap the jump key          |
//! | User Absent | nothing                   |
//!
//! `reset` always releases W and the jump key, whatever this side believes is
//! held: a frame that failed halfway may have left either one down.

use async_trait::async_trait;
use tracing::debug;

use super::uinput::{self, DeviceSpec, InputEvent, InputSink, UinputDevice};
use super::{Actuator, ActuatorError};
use crate::config::JumpButton;

const DEVICE_NAME: &str = "balance-walker keyboard";

/// Key tapped for a jump with the given binding.
pub fn jump_key(button: JumpButton) -> u16 {
    match button {
        JumpButton::A => uinput::KEY_SPACE,
        JumpButton::B => uinput::KEY_B,
        JumpButton::X => uinput::KEY_X,
        JumpButton::Y => uinput::KEY_Y,
    }
}

pub struct KeyboardActuator<S: InputSink = UinputDevice> {
    sink: S,
    jump_key: u16,
    forward_held: bool,
}

impl KeyboardActuator<UinputDevice> {
    /// Create the virtual keyboard.
    pub fn create(button: JumpButton) -> Result<Self, ActuatorError> {
        let keys = [
            uinput::KEY_W,
            uinput::KEY_SPACE,
            uinput::KEY_B,
            uinput::KEY_X,
            uinput::KEY_Y,
        ];
        let device = UinputDevice::create(&DeviceSpec {
            name: DEVICE_NAME,
            vendor: 0x0001,
            product: 0x0001,
            keys: &keys,
            axes: &[],
        })?;
        Ok(Self::with_sink(device, button))
    }
}

impl<S: InputSink> KeyboardActuator<S> {
    pub fn with_sink(sink: S, button: JumpButton) -> Self {
        Self {
            sink,
            jump_key: jump_key(button),
            forward_held: false,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn release_forward(&mut self) -> Result<(), ActuatorError> {
        if self.forward_held {
            self.sink.emit_frame(&[InputEvent::key(uinput::KEY_W, false)])?;
            self.forward_held = false;
            debug!("Forward key released");
        }
        Ok(())
    }
}

#[async_trait]
impl<S: InputSink> Actuator for KeyboardActuator<S> {
    async fn on_standing(&mut self) -> Result<(), ActuatorError> {
        self.release_forward()
    }

    async fn on_walking(&mut self) -> Result<(), ActuatorError> {
        if !self.forward_held {
            self.sink.emit_frame(&[InputEvent::key(uinput::KEY_W, true)])?;
            self.forward_held = true;
            debug!("Forward key held");
        }
        Ok(())
    }

    async fn on_flamingo(&mut self) -> Result<(), ActuatorError> {
        self.release_forward()
    }

    async fn on_jump(&mut self) -> Result<(), ActuatorError> {
        self.sink.emit_frame(&[InputEvent::key(self.jump_key, true)])?;
        self.sink.emit_frame(&[InputEvent::key(self.jump_key, false)])
    }

    async fn reset(&mut self) -> Result<(), ActuatorError> {
        self.sink.emit_frame(&[
            InputEvent::key(uinput::KEY_W, false),
            InputEvent::key(self.jump_key, false),
        ])?;
        self.forward_held = false;
        debug!("Keyboard reset");
        Ok(())
    }

    fn name(&self) -> &str {
        "keyboard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::uinput::{FailingSink, KEY_SPACE, KEY_W, KEY_Y};

    fn keyboard(button: JumpButton) -> KeyboardActuator<Vec<InputEvent>> {
        KeyboardActuator::with_sink(Vec::new(), button)
    }

    fn key_events(events: &[InputEvent]) -> Vec<(u16, i32)> {
        events
            .iter()
            .filter(|e| e.kind == uinput::EV_KEY)
            .map(|e| (e.code, e.value))
            .collect()
    }

    #[tokio::test]
    async fn test_walk_then_stand_presses_and_releases_w() {
        let mut kb = keyboard(JumpButton::A);
        kb.on_walking().await.unwrap();
        kb.on_standing().await.unwrap();
        assert_eq!(key_events(kb.sink()), vec![(KEY_W, 1), (KEY_W, 0)]);
    }

    #[tokio::test]
    async fn test_jump_taps_bound_key() {
        let mut kb = keyboard(JumpButton::Y);
        kb.on_jump().await.unwrap();
        assert_eq!(key_events(kb.sink()), vec![(KEY_Y, 1), (KEY_Y, 0)]);

        let mut kb = keyboard(JumpButton::A);
        kb.on_jump().await.unwrap();
        assert_eq!(key_events(kb.sink()), vec![(KEY_SPACE, 1), (KEY_SPACE, 0)]);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let mut kb = keyboard(JumpButton::A);
        kb.on_walking().await.unwrap();
        kb.reset().await.unwrap();
        kb.reset().await.unwrap();
        // W is no longer tracked as held, so standing sends nothing
        kb.on_standing().await.unwrap();
        assert_eq!(
            key_events(kb.sink()),
            vec![
                (KEY_W, 1),
                (KEY_W, 0),
                (KEY_SPACE, 0),
                (KEY_W, 0),
                (KEY_SPACE, 0),
            ]
        );
    }

    #[tokio::test]
    async fn test_reset_releases_jump_key_after_failed_release() {
        // writes: space down, SYN, space up (refused)
        let mut kb = KeyboardActuator::with_sink(FailingSink::failing_at(&[2]), JumpButton::A);
        assert!(kb.on_jump().await.is_err());
        assert!(kb.sink().is_held(KEY_SPACE));

        kb.reset().await.unwrap();
        assert!(!kb.sink().is_held(KEY_SPACE));
    }

    #[tokio::test]
    async fn test_reset_releases_w_after_failed_sync() {
        // writes: W down, SYN (refused)
        let mut kb = KeyboardActuator::with_sink(FailingSink::failing_at(&[1]), JumpButton::A);
        assert!(kb.on_walking().await.is_err());
        assert!(kb.sink().is_held(KEY_W));

        kb.reset().await.unwrap();
        assert!(!kb.sink().is_held(KEY_W));
        assert!(!kb.sink().is_held(KEY_SPACE));
    }

    #[tokio::test]
    async fn test_absent_produces_no_input() {
        let mut kb = keyboard(JumpButton::A);
        kb.on_absent().await.unwrap();
        assert!(kb.sink().is_empty());
    }
}
