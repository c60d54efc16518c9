//! Log-only actuator for `--dry-run` and for tests.

use async_trait::async_trait;
use tracing::info;

use super::{Actuator, ActuatorError};

/// One call received by a [`DryRunActuator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Standing,
    Walking,
    Flamingo,
    Jump,
    Absent,
    Reset,
}

/// Calls kept by [`DryRunActuator::new`]; older ones are dropped.
pub const CALL_HISTORY_LIMIT: usize = 4096;

/// Logs every reaction and keeps the most recent calls.
#[derive(Debug)]
pub struct DryRunActuator {
    calls: Vec<ActuatorCall>,
    limit: usize,
}

impl Default for DryRunActuator {
    fn default() -> Self {
        Self::with_history_limit(CALL_HISTORY_LIMIT)
    }
}

impl DryRunActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            calls: Vec::new(),
            limit,
        }
    }

    /// The retained calls, oldest first.
    pub fn calls(&self) -> &[ActuatorCall] {
        &self.calls
    }

    fn record(&mut self, call: ActuatorCall) {
        info!(action = ?call, "[dry-run] actuator");
        if self.limit == 0 {
            return;
        }
        if self.calls.len() >= self.limit {
            self.calls.remove(0);
        }
        self.calls.push(call);
    }
}

#[async_trait]
impl Actuator for DryRunActuator {
    async fn on_standing(&mut self) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Standing);
        Ok(())
    }

    async fn on_walking(&mut self) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Walking);
        Ok(())
    }

    async fn on_flamingo(&mut self) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Flamingo);
        Ok(())
    }

    async fn on_jump(&mut self) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Jump);
        Ok(())
    }

    async fn on_absent(&mut self) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Absent);
        Ok(())
    }

    async fn reset(&mut self) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Reset);
        Ok(())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
