//! Sample processing loop: source -> aggregator -> dispatcher.
//!
//! One task reads the source, folds each axis sample into a side pair,
//! timestamps it once and hands it to the [`TransitionDispatcher`]. The loop
//! ends on cancellation, end of input or a source error; in every case the
//! actuator is reset before [`run()`](ProcessingLoop::run) returns.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::aggregator::Aggregator;
use super::clock::{Clock, MonotonicClock};
use super::source::{SampleSource, SourceEvent};
use crate::actuator::Actuator;
use crate::config::defaults::PROGRESS_LOG_INTERVAL;
use crate::config::BoardConfig;
use crate::detection::TransitionDispatcher;

/// Why the loop stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoopExit {
    #[default]
    Cancelled,
    SourceExhausted,
    SourceFailed(String),
}

/// Counters reported at shutdown.
#[derive(Debug, Clone, Default)]
pub struct LoopStats {
    pub events_read: u64,
    pub axis_events: u64,
    pub skipped_events: u64,
    pub transitions: u64,
    pub actuator_failures: u64,
    pub exit: LoopExit,
}

pub struct ProcessingLoop<A: Actuator, C: Clock = MonotonicClock> {
    aggregator: Aggregator,
    dispatcher: TransitionDispatcher<A>,
    clock: C,
    cancel_token: CancellationToken,
    poll_interval: Duration,
    stats: LoopStats,
}

impl<A: Actuator, C: Clock> ProcessingLoop<A, C> {
    pub fn new(config: &BoardConfig, actuator: A, clock: C, cancel_token: CancellationToken) -> Self {
        let start = clock.now();
        Self {
            aggregator: Aggregator::new(),
            dispatcher: TransitionDispatcher::new(config.detection, actuator, start),
            clock,
            cancel_token,
            poll_interval: Duration::from_millis(config.device.poll_interval_ms),
            stats: LoopStats::default(),
        }
    }

    pub fn dispatcher(&self) -> &TransitionDispatcher<A> {
        &self.dispatcher
    }

    /// Run until cancellation, end of input or a source error.
    pub async fn run<S: SampleSource + ?Sized>(&mut self, source: &mut S) -> LoopStats {
        info!("📊 Reading board samples from {}...", source.source_name());
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        loop {
            let event = tokio::select! {
                biased;
                () = self.cancel_token.cancelled() => {
                    info!("[ProcessingLoop] Shutdown signal received");
                    self.stats.exit = LoopExit::Cancelled;
                    break;
                }
                result = source.next_event() => match result {
                    Ok(ev) => ev,
                    Err(e) => {
                        error!("[ProcessingLoop] Source error: {}", e);
                        self.stats.exit = LoopExit::SourceFailed(e.to_string());
                        break;
                    }
                }
            };

            match event {
                SourceEvent::Axis(sample) => {
                    self.stats.events_read += 1;
                    let Some(pair) = self.aggregator.update(sample.index, sample.value) else {
                        self.stats.skipped_events += 1;
                        continue;
                    };
                    self.stats.axis_events += 1;

                    let now = self.clock.now();
                    self.dispatcher.update(pair, now).await;

                    if self.stats.axis_events % PROGRESS_LOG_INTERVAL == 0 {
                        debug!(
                            events = self.stats.axis_events,
                            left = pair.left,
                            right = pair.right,
                            "📈 {}",
                            self.dispatcher.status(now)
                        );
                    }
                }
                SourceEvent::Skipped => {
                    self.stats.events_read += 1;
                    self.stats.skipped_events += 1;
                }
                SourceEvent::Idle => {
                    tokio::select! {
                        () = self.cancel_token.cancelled() => {}
                        () = tokio::time::sleep(self.poll_interval) => {}
                    }
                }
                SourceEvent::Eof => {
                    info!(
                        "[ProcessingLoop] Source reached end ({} events read)",
                        self.stats.events_read
                    );
                    self.stats.exit = LoopExit::SourceExhausted;
                    break;
                }
            }
        }

        self.dispatcher.shutdown().await;

        let dispatch = self.dispatcher.stats();
        self.stats.transitions = dispatch.transitions;
        self.stats.actuator_failures = dispatch.actuator_failures;

        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("📊 FINAL STATISTICS");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("   Events Read:          {}", self.stats.events_read);
        info!("   Axis Events:          {}", self.stats.axis_events);
        info!("   Skipped Events:       {}", self.stats.skipped_events);
        info!("   Posture Transitions:  {}", self.stats.transitions);
        info!("   Actuator Failures:    {}", self.stats.actuator_failures);
        for (posture, count) in dispatch.entries_by_posture() {
            info!("   Entered {:<14} {}", format!("{posture}:"), count);
        }
        info!("   Final Posture:        {}", self.dispatcher.current_posture());
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        self.stats.clone()
    }
}
