//! Replay of stored recordings.

mod engine;
mod sink;

pub use engine::{ReplayEngine, ReplayOptions, ReplayOutcome, ReplayStatus, MAX_LOOPS};
pub use sink::{InjectError, InputSink, RdevSink};
