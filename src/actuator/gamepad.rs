//! Virtual gamepad backend, announced as a wired Xbox 360 controller.
//!
//! Walking pushes the left stick fully forward; Standing and Flamingo centre
//! it. Jump presses the bound face button, holds it for `jump_hold_ms` and
//! releases it before returning, so a press is never left dangling.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::uinput::{self, AbsAxis, DeviceSpec, InputEvent, InputSink, UinputDevice};
use super::{Actuator, ActuatorError};
use crate::config::defaults::{STICK_FORWARD, STICK_MAX, STICK_MIN};
use crate::config::JumpButton;

const DEVICE_NAME: &str = "balance-walker gamepad";
const XBOX_VENDOR: u16 = 0x045e;
const XBOX_360_PRODUCT: u16 = 0x028e;

const BUTTONS: [u16; 11] = [
    uinput::BTN_A,
    uinput::BTN_B,
    uinput::BTN_X,
    uinput::BTN_Y,
    uinput::BTN_TL,
    uinput::BTN_TR,
    uinput::BTN_SELECT,
    uinput::BTN_START,
    uinput::BTN_MODE,
    uinput::BTN_THUMBL,
    uinput::BTN_THUMBR,
];

const STICK_AXES: [u16; 4] = [uinput::ABS_X, uinput::ABS_Y, uinput::ABS_RX, uinput::ABS_RY];

/// Button pressed for a jump with the given binding.
pub fn jump_button_code(button: JumpButton) -> u16 {
    match button {
        JumpButton::A => uinput::BTN_A,
        JumpButton::B => uinput::BTN_B,
        JumpButton::X => uinput::BTN_X,
        JumpButton::Y => uinput::BTN_Y,
    }
}

pub struct GamepadActuator<S: InputSink = UinputDevice> {
    sink: S,
    jump_button: u16,
    jump_hold: Duration,
}

impl GamepadActuator<UinputDevice> {
    /// Create the virtual gamepad.
    pub fn create(button: JumpButton, jump_hold_ms: u64) -> Result<Self, ActuatorError> {
        let axes = STICK_AXES.map(|code| AbsAxis {
            code,
            min: STICK_MIN,
            max: STICK_MAX,
        });
        let device = UinputDevice::create(&DeviceSpec {
            name: DEVICE_NAME,
            vendor: XBOX_VENDOR,
            product: XBOX_360_PRODUCT,
            keys: &BUTTONS,
            axes: &axes,
        })?;
        Ok(Self::with_sink(device, button, Duration::from_millis(jump_hold_ms)))
    }
}

impl<S: InputSink> GamepadActuator<S> {
    pub fn with_sink(sink: S, button: JumpButton, jump_hold: Duration) -> Self {
        Self {
            sink,
            jump_button: jump_button_code(button),
            jump_hold,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn set_left_stick_y(&mut self, value: i32) -> Result<(), ActuatorError> {
        debug!(value, "Left stick Y");
        self.sink.emit_frame(&[
            InputEvent::abs(uinput::ABS_X, 0),
            InputEvent::abs(uinput::ABS_Y, value),
        ])
    }
}

#[async_trait]
impl<S: InputSink> Actuator for GamepadActuator<S> {
    async fn on_standing(&mut self) -> Result<(), ActuatorError> {
        self.set_left_stick_y(0)
    }

    async fn on_walking(&mut self) -> Result<(), ActuatorError> {
        self.set_left_stick_y(STICK_FORWARD)
    }

    async fn on_flamingo(&mut self) -> Result<(), ActuatorError> {
        self.set_left_stick_y(0)
    }

    async fn on_jump(&mut self) -> Result<(), ActuatorError> {
        self.sink.emit_frame(&[InputEvent::key(self.jump_button, true)])?;
        tokio::time::sleep(self.jump_hold).await;

        let release = [InputEvent::key(self.jump_button, false)];
        if let Err(e) = self.sink.emit_frame(&release) {
            warn!(error = %e, "Jump release failed, retrying once");
            self.sink.emit_frame(&release)?;
        }
        Ok(())
    }

    async fn reset(&mut self) -> Result<(), ActuatorError> {
        let mut frame: Vec<InputEvent> = STICK_AXES.iter().map(|&code| InputEvent::abs(code, 0)).collect();
        frame.extend(BUTTONS.iter().map(|&code| InputEvent::key(code, false)));
        self.sink.emit_frame(&frame)
    }

    fn name(&self) -> &str {
        "virtual_joystick"
    }
}
