//! action-recorder library crate.
//!
//! Captures mouse and keyboard activity with pause-compensated timing and
//! replays it later, optionally looped and rescaled to the current display.
//!
//! The pieces, leaves first:
//! - [`event`]: the event model and key symbols
//! - [`recording`]: the persisted document and the merged replay timeline
//! - [`capture`]: the capture session state machine and its worker thread
//! - [`store`]: one JSON document per recording in a directory
//! - [`replay`]: timed playback into an [`replay::InputSink`]
//! - [`cancel`]: the cancellation flag and the hotkey that raises it

pub mod cancel;
pub mod capture;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod hook;
pub mod keymap;
pub mod recorder;
pub mod recording;
pub mod replay;
pub mod store;

pub use error::{RecorderError, Result};
pub use recorder::Recorder;
