//! Processing Pipeline Module
//!
//! ```text
//! SampleSource ──> Aggregator ──> TransitionDispatcher ──> Actuator
//!  (axis events)   (side pair)    (detector + edge)       (uinput)
//! ```
//!
//! Everything runs on one task; a posture change is acted on before the next
//! sample is read.

mod aggregator;
pub mod clock;
pub mod processing_loop;
pub mod replay;
pub mod source;

pub use aggregator::Aggregator;
pub use clock::{Clock, MonotonicClock};
pub use processing_loop::{LoopExit, LoopStats, ProcessingLoop};
pub use replay::{ReplayClock, ReplaySource};
pub use source::{JoystickSource, SampleSource, SourceEvent};
