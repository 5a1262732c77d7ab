//! Live capture of mouse and keyboard input.
//!
//! [`CaptureSession`] is the state machine that turns raw notifications
//! into timestamped events. [`CaptureWorker`] runs a session on its own
//! thread, fed by the shared input hook.

mod session;
mod worker;

pub use session::{
    CaptureSession, CaptureSettings, ScrollMode, SessionControl, SessionState, SessionStatus,
    Status,
};
pub use worker::{CaptureMessage, CaptureWorker};
