//! High-level recorder used by the CLI.
//!
//! Ties a capture worker, the recording store and the replay engine
//! together behind the operations a front-end needs.

use crate::cancel::{CancellationSignal, Hotkey, HotkeyObserver};
use crate::capture::{CaptureSession, CaptureSettings, CaptureWorker, Status};
use crate::clock::{Clock, SystemClock};
use crate::error::{RecorderError, Result};
use crate::event::ScreenResolution;
use crate::hook::InputHook;
use crate::recording::Recording;
use crate::replay::{InputSink, RdevSink, ReplayEngine, ReplayOptions, ReplayOutcome};
use crate::store::RecordingStore;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct Recorder {
    settings: CaptureSettings,
    cancel_hotkey: Hotkey,
    store: RecordingStore,
    hook: Option<Arc<InputHook>>,
    clock: Arc<dyn Clock>,
    sink: Mutex<Box<dyn InputSink>>,
    worker: Mutex<Option<CaptureWorker>>,
    cancel: CancellationSignal,
}

impl Recorder {
    /// Recorder wired to the OS input hook and `rdev` injection.
    ///
    /// The OS hook is only attached once capture or replay starts.
    pub fn new(settings: CaptureSettings, cancel_hotkey: Hotkey, store: RecordingStore) -> Self {
        Self {
            settings,
            cancel_hotkey,
            store,
            hook: None,
            clock: Arc::new(SystemClock::new()),
            sink: Mutex::new(Box::new(RdevSink::new())),
            worker: Mutex::new(None),
            cancel: CancellationSignal::new(),
        }
    }

    /// Recorder with explicit collaborators.
    pub fn with_parts(
        settings: CaptureSettings,
        cancel_hotkey: Hotkey,
        store: RecordingStore,
        hook: Arc<InputHook>,
        clock: Arc<dyn Clock>,
        sink: Box<dyn InputSink>,
    ) -> Self {
        Self {
            settings,
            cancel_hotkey,
            store,
            hook: Some(hook),
            clock,
            sink: Mutex::new(sink),
            worker: Mutex::new(None),
            cancel: CancellationSignal::new(),
        }
    }

    pub fn store(&self) -> &RecordingStore {
        &self.store
    }

    /// Begin capturing.
    pub fn start(&self) -> Result<()> {
        let mut worker = lock(&self.worker);
        if worker.as_ref().is_some_and(CaptureWorker::is_running) {
            return Err(RecorderError::InvalidState {
                action: "start",
                state: "recording",
            });
        }
        // A session ended by its stop key has not been collected yet.
        if let Some(finished) = worker.take() {
            self.persist(finished.stop()?)?;
        }

        let screen = self.screen_size();
        let session = CaptureSession::new(self.settings.clone(), self.clock.clone());
        *worker = Some(CaptureWorker::spawn(session, screen, &self.hook())?);
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        match lock(&self.worker).as_ref() {
            Some(worker) => worker.pause(),
            None => Err(RecorderError::InvalidState {
                action: "pause",
                state: "idle",
            }),
        }
    }

    pub fn resume(&self) -> Result<()> {
        match lock(&self.worker).as_ref() {
            Some(worker) => worker.resume(),
            None => Err(RecorderError::InvalidState {
                action: "resume",
                state: "idle",
            }),
        }
    }

    /// End capture and persist the result.
    ///
    /// Returns the new recording's id, or `None` if nothing was captured.
    pub fn stop(&self) -> Result<Option<String>> {
        let worker = lock(&self.worker).take().ok_or(RecorderError::InvalidState {
            action: "stop",
            state: "idle",
        })?;
        self.persist(worker.stop()?)
    }

    /// Ask a running capture to stop without collecting it.
    pub fn request_stop(&self) {
        if let Some(worker) = lock(&self.worker).as_ref() {
            worker.request_stop();
        }
    }

    pub fn status(&self) -> Status {
        lock(&self.worker)
            .as_ref()
            .map(CaptureWorker::status)
            .unwrap_or_default()
    }

    pub fn list(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        self.store.delete(id)
    }

    /// Replay a stored recording.
    ///
    /// The cancel hotkey is watched for the duration of the call.
    pub fn replay(&self, id: &str, options: &ReplayOptions) -> Result<ReplayOutcome> {
        options.validate()?;
        let recording = self.store.load(id).map_err(|e| {
            log::error!("Cannot replay {}: {}", id, e);
            e
        })?;

        let mut sink = lock(&self.sink);
        let engine = ReplayEngine::new(self.clock.clone(), self.cancel.clone());
        let hook = self.hook();
        if !hook.is_listening() {
            log::warn!(
                "Input listener is not running; {} will not stop this replay",
                self.cancel_hotkey
            );
        }
        let _observer = HotkeyObserver::spawn(&hook, self.cancel_hotkey, self.cancel.clone());
        log::info!("Replaying {} (press {} to stop)", id, self.cancel_hotkey);
        engine.replay(&recording, options, &mut **sink)
    }

    /// External stop request for a running replay.
    pub fn cancel_replay(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_signal(&self) -> CancellationSignal {
        self.cancel.clone()
    }

    pub fn export(&self, ids: &[String]) -> Result<String> {
        self.store.export_document(ids)
    }

    pub fn import(&self, document: &str) -> Result<Vec<String>> {
        self.store.import(document)
    }

    fn hook(&self) -> Arc<InputHook> {
        self.hook.clone().unwrap_or_else(InputHook::global)
    }

    fn persist(&self, recording: Option<Recording>) -> Result<Option<String>> {
        recording.map(|rec| self.store.save(&rec)).transpose()
    }

    fn screen_size(&self) -> ScreenResolution {
        match lock(&self.sink).screen_size() {
            Ok(size) if size.is_valid() => size,
            Ok(_) | Err(_) => {
                log::warn!("Display size unavailable, assuming {}", ScreenResolution::default());
                ScreenResolution::default()
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
