//! Scripted replay of timestamped axis samples.
//!
//! [`ReplaySource`] yields samples in order and moves a shared
//! [`ReplayClock`] to each sample's timestamp before yielding it, so a
//! processing loop driven by the pair sees exactly the scripted timing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::clock::Clock;
use super::source::{SampleSource, SourceEvent};
use crate::acquisition::SourceError;
use crate::types::{AxisSample, SidePair};

/// Clock that only moves when the replay says so.
#[derive(Debug, Clone, Default)]
pub struct ReplayClock {
    bits: Arc<AtomicU64>,
}

impl ReplayClock {
    pub fn set(&self, secs: f64) {
        self.bits.store(secs.to_bits(), Ordering::SeqCst);
    }
}

impl Clock for ReplayClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Default)]
pub struct ReplaySource {
    steps: VecDeque<(f64, SourceEvent)>,
    clock: ReplayClock,
}

impl ReplaySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock handle to hand to the processing loop.
    pub fn clock(&self) -> ReplayClock {
        self.clock.clone()
    }

    pub fn push_axis(&mut self, at: f64, index: usize, value: f64) -> &mut Self {
        self.steps.push_back((at, SourceEvent::Axis(AxisSample { index, value })));
        self
    }

    /// Queue the four axis updates that produce `pair` (right half first).
    pub fn push_pair(&mut self, at: f64, pair: SidePair) -> &mut Self {
        self.push_axis(at, 0, pair.right)
            .push_axis(at, 1, pair.right)
            .push_axis(at, 2, pair.left)
            .push_axis(at, 3, pair.left)
    }

    pub fn push_skipped(&mut self, at: f64) -> &mut Self {
        self.steps.push_back((at, SourceEvent::Skipped));
        self
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

#[async_trait]
impl SampleSource for ReplaySource {
    async fn next_event(&mut self) -> Result<SourceEvent, SourceError> {
        match self.steps.pop_front() {
            Some((at, event)) => {
                self.clock.set(at);
                Ok(event)
            }
            None => Ok(SourceEvent::Eof),
        }
    }

    fn source_name(&self) -> &str {
        "replay"
    }
}
