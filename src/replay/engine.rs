//! Timed playback of a recording.

use super::sink::{InjectError, InputSink};
use crate::cancel::CancellationSignal;
use crate::clock::Clock;
use crate::error::{RecorderError, Result};
use crate::event::{Event, EventKind, KeySymbol, ModifierState, NamedKey, Point, ScreenResolution};
use crate::recording::Recording;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on `loop_count`.
pub const MAX_LOOPS: u32 = 10;

/// Longest uninterrupted sleep. The cancellation signal is polled between
/// slices.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Options for a single replay call.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayOptions {
    /// Reproduce recorded inter-event delays.
    pub precision_mode: bool,
    /// Number of full passes, 1 to [`MAX_LOOPS`].
    pub loop_count: u32,
    /// Event kinds to leave out.
    pub skip: HashSet<EventKind>,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            precision_mode: true,
            loop_count: 1,
            skip: HashSet::new(),
        }
    }
}

impl ReplayOptions {
    pub fn with_precision(mut self, precision_mode: bool) -> Self {
        self.precision_mode = precision_mode;
        self
    }

    pub fn with_loops(mut self, loop_count: u32) -> Self {
        self.loop_count = loop_count;
        self
    }

    pub fn skipping(mut self, kinds: impl IntoIterator<Item = EventKind>) -> Self {
        self.skip.extend(kinds);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_LOOPS).contains(&self.loop_count) {
            return Err(RecorderError::Validation(format!(
                "loop_count must be between 1 and {}, got {}",
                MAX_LOOPS, self.loop_count
            )));
        }
        Ok(())
    }
}

/// How a replay call ended. Cancellation is a normal outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayStatus {
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub status: ReplayStatus,
    /// Passes that ran to the end.
    pub loops_completed: u32,
    pub events_executed: usize,
    /// Events skipped after an injection failure.
    pub events_failed: usize,
}

impl ReplayOutcome {
    pub fn is_cancelled(&self) -> bool {
        self.status == ReplayStatus::Cancelled
    }
}

/// Drives an [`InputSink`] through a recording's merged timeline.
///
/// The engine holds no lock across calls; callers must not run two replays
/// against the same sink at once.
pub struct ReplayEngine {
    clock: Arc<dyn Clock>,
    cancel: CancellationSignal,
}

impl ReplayEngine {
    pub fn new(clock: Arc<dyn Clock>, cancel: CancellationSignal) -> Self {
        Self { clock, cancel }
    }

    pub fn cancel_signal(&self) -> CancellationSignal {
        self.cancel.clone()
    }

    /// Replay `recording` into `sink`.
    ///
    /// Options are validated before anything is injected. Per-event
    /// failures are logged and counted, never returned.
    pub fn replay(
        &self,
        recording: &Recording,
        options: &ReplayOptions,
        sink: &mut dyn InputSink,
    ) -> Result<ReplayOutcome> {
        options.validate()?;
        self.cancel.reset();

        let timeline: Vec<&Event> = recording
            .timeline()
            .into_iter()
            .filter(|event| !options.skip.contains(&event.kind()))
            .collect();

        let screen = match sink.screen_size() {
            Ok(size) if size.is_valid() => Some(size),
            Ok(size) => {
                log::warn!("Display reported invalid size {}, replaying unscaled", size);
                None
            }
            Err(e) => {
                log::warn!("{}, replaying unscaled", e);
                None
            }
        };

        log::info!(
            "Replaying {} events x{} (precision: {})",
            timeline.len(),
            options.loop_count,
            options.precision_mode
        );

        let mut playback = Playback {
            sink,
            screen,
            modifiers: ModifierState::default(),
            held: Vec::new(),
        };
        let mut outcome = ReplayOutcome {
            status: ReplayStatus::Completed,
            loops_completed: 0,
            events_executed: 0,
            events_failed: 0,
        };

        'passes: for pass in 0..options.loop_count {
            if self.cancel.is_cancelled() {
                outcome.status = ReplayStatus::Cancelled;
                break;
            }
            log::debug!("Replay pass {}/{}", pass + 1, options.loop_count);

            let mut previous: Option<f64> = None;
            for (index, event) in timeline.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    outcome.status = ReplayStatus::Cancelled;
                    break 'passes;
                }

                let t = event.relative_time();
                if options.precision_mode {
                    if let Some(prev) = previous {
                        let delay = Duration::try_from_secs_f64((t - prev).max(0.0))
                            .unwrap_or(Duration::ZERO);
                        if !self.sleep_unless_cancelled(delay) {
                            outcome.status = ReplayStatus::Cancelled;
                            break 'passes;
                        }
                    }
                }
                previous = Some(t);

                match playback.execute(event) {
                    Ok(()) => outcome.events_executed += 1,
                    Err(e) => {
                        outcome.events_failed += 1;
                        log::error!("Skipping {} event #{}: {}", event.kind(), index, e);
                    }
                }
            }
            outcome.loops_completed += 1;
        }

        playback.release_held();

        match outcome.status {
            ReplayStatus::Completed => log::info!(
                "Replay completed: {} passes, {} events ({} failed)",
                outcome.loops_completed,
                outcome.events_executed,
                outcome.events_failed
            ),
            ReplayStatus::Cancelled => log::info!(
                "Replay stopped by user after {} full passes",
                outcome.loops_completed
            ),
        }
        Ok(outcome)
    }

    /// Sleep in slices, checking the signal before each slice and after the
    /// last. Returns false if cancelled.
    fn sleep_unless_cancelled(&self, total: Duration) -> bool {
        let mut remaining = total;
        while !remaining.is_zero() {
            if self.cancel.is_cancelled() {
                return false;
            }
            let step = remaining.min(SLEEP_SLICE);
            self.clock.sleep(step);
            remaining -= step;
        }
        !self.cancel.is_cancelled()
    }
}

/// Per-call playback state.
struct Playback<'a> {
    sink: &'a mut dyn InputSink,
    screen: Option<ScreenResolution>,
    modifiers: ModifierState,
    /// Keys pressed by KeyDown and not yet released
    held: Vec<KeySymbol>,
}

impl Playback<'_> {
    fn execute(&mut self, event: &Event) -> std::result::Result<(), InjectError> {
        match event {
            Event::MouseMove {
                pos,
                screen_resolution,
                ..
            } => {
                let target = self.scale(*pos, *screen_resolution);
                self.sink.move_to(target)
            }
            Event::MouseClick {
                pos,
                button,
                pressed,
                screen_resolution,
                ..
            } => {
                let target = self.scale(*pos, *screen_resolution);
                self.sink.move_to(target)?;
                self.sink.button(*button, *pressed)
            }
            Event::MouseScroll {
                dx,
                dy,
                is_trackpad,
                ..
            } => {
                if *is_trackpad {
                    self.trackpad_gesture()
                } else {
                    self.sink.scroll(*dx, *dy)
                }
            }
            Event::KeyDown { key, .. } => {
                self.sink.key(*key, true)?;
                self.modifiers.apply(key, true);
                if !self.held.contains(key) {
                    self.held.push(*key);
                }
                Ok(())
            }
            Event::KeyUp { key, .. } => {
                self.sink.key(*key, false)?;
                self.modifiers.apply(key, false);
                self.held.retain(|held| held != key);
                Ok(())
            }
            Event::KeyPress { key, .. } => {
                self.sink.key(*key, true)?;
                self.sink.key(*key, false)
            }
        }
    }

    fn scale(&self, pos: Point, recorded: ScreenResolution) -> Point {
        match self.screen {
            Some(current) if recorded.is_valid() => recorded.scale_to(pos, current),
            _ => pos,
        }
    }

    /// Trackpad scrolls are replayed as Shift+Space followed by Down.
    fn trackpad_gesture(&mut self) -> std::result::Result<(), InjectError> {
        let shift = KeySymbol::Named(NamedKey::Shift);
        let space = KeySymbol::Named(NamedKey::Space);
        let down = KeySymbol::Named(NamedKey::Down);
        self.sink.key(shift, true)?;
        self.sink.key(space, true)?;
        self.sink.key(space, false)?;
        self.sink.key(shift, false)?;
        self.sink.key(down, true)?;
        self.sink.key(down, false)
    }

    /// Release keys a truncated or cancelled recording left pressed.
    fn release_held(&mut self) {
        if self.held.is_empty() {
            return;
        }
        log::debug!(
            "Releasing {} held keys (ctrl: {}, alt: {}, shift: {})",
            self.held.len(),
            self.modifiers.ctrl,
            self.modifiers.alt,
            self.modifiers.shift
        );
        while let Some(key) = self.held.pop() {
            if let Err(e) = self.sink.key(key, false) {
                log::warn!("Failed to release {}: {}", key, e);
            }
            self.modifiers.apply(&key, false);
        }
    }
}
