//! Sample source abstraction.
//!
//! The processing loop only sees [`SourceEvent`]s; where they come from (a
//! live joystick node or a scripted replay) is hidden behind [`SampleSource`].

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::acquisition::{JoystickDevice, ReadOutcome, SourceError};
use crate::types::AxisSample;

/// Events produced by a sample source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceEvent {
    /// A normalized reading for one board axis
    Axis(AxisSample),
    /// A record was read but carries nothing for the board (button, init, malformed)
    Skipped,
    /// Nothing pending; the loop should wait a poll interval
    Idle,
    /// No more data will arrive
    Eof,
}

/// Trait abstracting where axis samples come from.
///
/// The processing loop calls [`next_event`](SampleSource::next_event) in a
/// `select!` with cancellation, so implementations must not block.
#[async_trait]
pub trait SampleSource: Send {
    async fn next_event(&mut self) -> Result<SourceEvent, SourceError>;

    /// Human-readable name for logging.
    fn source_name(&self) -> &str;
}

// ============================================================================
// Joystick Source
// ============================================================================

/// Live board attached as a Linux joystick device.
pub struct JoystickSource {
    device: JoystickDevice,
    axis_count: usize,
    name: String,
}

impl JoystickSource {
    pub fn open(path: &Path, axis_count: usize) -> Result<Self, SourceError> {
        let device = JoystickDevice::open(path)?;
        Ok(Self {
            name: format!("joystick {}", path.display()),
            device,
            axis_count,
        })
    }
}

#[async_trait]
impl SampleSource for JoystickSource {
    async fn next_event(&mut self) -> Result<SourceEvent, SourceError> {
        match self.device.read_event()? {
            ReadOutcome::Event(ev) => Ok(ev
                .axis_sample(self.axis_count)
                .map_or(SourceEvent::Skipped, SourceEvent::Axis)),
            ReadOutcome::Malformed(len) => {
                debug!(len, device = %self.device.path().display(), "Dropped short joystick read");
                Ok(SourceEvent::Skipped)
            }
            ReadOutcome::Pending => Ok(SourceEvent::Idle),
            ReadOutcome::Eof => Ok(SourceEvent::Eof),
        }
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
