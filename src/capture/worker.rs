//! Runs a capture session on a dedicated thread.
//!
//! The worker is the only writer to the session's buffers. Hook input and
//! control requests arrive on one channel and are applied in order.

use super::session::{CaptureSession, SessionControl, SessionStatus, Status};
use crate::error::{RecorderError, Result};
use crate::event::ScreenResolution;
use crate::hook::{InputHook, RawInput};
use crate::recording::Recording;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Messages consumed by the worker thread.
#[derive(Debug)]
pub enum CaptureMessage {
    Input(RawInput),
    Pause(Sender<Result<()>>),
    Resume(Sender<Result<()>>),
    Stop,
}

impl From<RawInput> for CaptureMessage {
    fn from(raw: RawInput) -> Self {
        CaptureMessage::Input(raw)
    }
}

pub struct CaptureWorker {
    sender: Sender<CaptureMessage>,
    handle: Option<JoinHandle<Result<Option<Recording>>>>,
    status: Arc<SessionStatus>,
}

impl CaptureWorker {
    /// Start `session` and attach it to `hook`.
    ///
    /// The session is started before this returns, so state errors are
    /// reported synchronously.
    pub fn spawn(
        mut session: CaptureSession,
        screen: ScreenResolution,
        hook: &InputHook,
    ) -> Result<Self> {
        session.start(screen)?;
        let status = session.status_handle();

        let (sender, receiver) = mpsc::channel();
        hook.subscribe(sender.clone());

        let handle = thread::spawn(move || run(session, receiver));

        Ok(Self {
            sender,
            handle: Some(handle),
            status,
        })
    }

    pub fn status(&self) -> Status {
        self.status.snapshot()
    }

    /// Whether the worker is still capturing.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn pause(&self) -> Result<()> {
        self.request(CaptureMessage::Pause, "pause")
    }

    pub fn resume(&self) -> Result<()> {
        self.request(CaptureMessage::Resume, "resume")
    }

    /// Ask the worker to stop without waiting for it.
    pub fn request_stop(&self) {
        let _ = self.sender.send(CaptureMessage::Stop);
    }

    /// Stop the session and collect its recording.
    pub fn stop(mut self) -> Result<Option<Recording>> {
        self.request_stop();
        self.join()
    }

    fn join(&mut self) -> Result<Option<Recording>> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| {
                log::error!("Capture worker panicked");
                RecorderError::InvalidState {
                    action: "stop",
                    state: "crashed",
                }
            })?,
            None => Err(RecorderError::InvalidState {
                action: "stop",
                state: "idle",
            }),
        }
    }

    fn request(
        &self,
        message: impl FnOnce(Sender<Result<()>>) -> CaptureMessage,
        action: &'static str,
    ) -> Result<()> {
        let stopped = || RecorderError::InvalidState {
            action,
            state: "idle",
        };
        let (reply_tx, reply_rx) = mpsc::channel();
        self.sender
            .send(message(reply_tx))
            .map_err(|_| stopped())?;
        reply_rx.recv().map_err(|_| stopped())?
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.request_stop();
            let _ = self.join();
        }
    }
}

fn run(mut session: CaptureSession, receiver: Receiver<CaptureMessage>) -> Result<Option<Recording>> {
    log::debug!("Capture worker started");
    for message in receiver.iter() {
        match message {
            CaptureMessage::Input(raw) => {
                if session.on_raw_event(raw) == SessionControl::Stop {
                    log::info!("Stop key pressed, ending capture");
                    break;
                }
            }
            CaptureMessage::Pause(reply) => {
                let _ = reply.send(session.pause());
            }
            CaptureMessage::Resume(reply) => {
                let _ = reply.send(session.resume());
            }
            CaptureMessage::Stop => break,
        }
    }
    session.stop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureSettings;
    use crate::clock::ManualClock;
    use crate::event::{KeySymbol, NamedKey, Point};
    use std::time::{Duration, Instant};

    fn worker(hook: &InputHook) -> (CaptureWorker, ManualClock) {
        let clock = ManualClock::new();
        let session = CaptureSession::new(CaptureSettings::default(), Arc::new(clock.clone()));
        let worker = CaptureWorker::spawn(session, ScreenResolution::default(), hook).unwrap();
        (worker, clock)
    }

    fn wait_until_stopped(worker: &CaptureWorker) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while worker.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_worker_collects_hook_input() {
        let hook = InputHook::new();
        let (worker, _) = worker(&hook);
        assert!(worker.status().recording);

        hook.dispatch(RawInput::MouseMove {
            pos: Point::new(3.0, 4.0),
        });
        hook.dispatch(RawInput::Key {
            key: KeySymbol::Char('z'),
            pressed: true,
        });

        let rec = worker.stop().unwrap().unwrap();
        assert_eq!(rec.mouse_events().len(), 1);
        assert_eq!(rec.keyboard_events().len(), 1);
    }

    #[test]
    fn test_worker_pause_and_resume() {
        let hook = InputHook::new();
        let (worker, _) = worker(&hook);
        worker.pause().unwrap();
        assert!(worker.status().paused);
        assert!(worker.pause().is_err());
        worker.resume().unwrap();
        assert!(!worker.status().paused);
        assert!(worker.stop().unwrap().is_none());
    }

    #[test]
    fn test_stop_key_ends_worker() {
        let hook = InputHook::new();
        let (worker, _) = worker(&hook);
        hook.dispatch(RawInput::MouseMove {
            pos: Point::new(1.0, 1.0),
        });
        hook.dispatch(RawInput::Key {
            key: KeySymbol::Named(NamedKey::Escape),
            pressed: true,
        });
        wait_until_stopped(&worker);
        assert!(!worker.is_running());
        assert!(!worker.status().recording);
        assert!(worker.pause().is_err());

        let rec = worker.stop().unwrap().unwrap();
        assert_eq!(rec.mouse_events().len(), 1);
    }

    #[test]
    fn test_spawn_requires_idle_session() {
        let hook = InputHook::new();
        let clock = ManualClock::new();
        let mut session = CaptureSession::new(CaptureSettings::default(), Arc::new(clock));
        session.start(ScreenResolution::default()).unwrap();
        let result = CaptureWorker::spawn(session, ScreenResolution::default(), &hook);
        assert!(matches!(result, Err(RecorderError::InvalidState { .. })));
    }
}
