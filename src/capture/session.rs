//! Capture session state machine.

use crate::clock::Clock;
use crate::error::{RecorderError, Result};
use crate::event::{Event, KeySymbol, Modifier, ModifierState, NamedKey, ScreenResolution};
use crate::hook::RawInput;
use crate::recording::Recording;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle of a capture session. `Paused` is never initial or terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Paused,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Active => "recording",
            SessionState::Paused => "paused",
        }
    }
}

/// How captured scroll notifications are tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollMode {
    /// Replayed as a wheel delta
    Wheel,
    /// Replayed as a keyboard scroll gesture
    #[default]
    Trackpad,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSettings {
    /// Per-stream event cap
    pub max_events: usize,
    pub record_keyboard: bool,
    pub scroll_mode: ScrollMode,
    /// Ends the session when pressed
    pub stop_key: KeySymbol,
    /// Toggles pause when pressed
    pub pause_key: KeySymbol,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            max_events: 50_000,
            record_keyboard: true,
            scroll_mode: ScrollMode::Trackpad,
            stop_key: KeySymbol::Named(NamedKey::Escape),
            pause_key: KeySymbol::Char('p'),
        }
    }
}

/// Snapshot of the session flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Status {
    pub recording: bool,
    pub paused: bool,
}

/// Session flags readable from any thread. Readers may see slightly stale
/// values.
#[derive(Debug, Default)]
pub struct SessionStatus {
    recording: AtomicBool,
    paused: AtomicBool,
}

impl SessionStatus {
    pub fn snapshot(&self) -> Status {
        Status {
            recording: self.recording.load(Ordering::SeqCst),
            paused: self.paused.load(Ordering::SeqCst),
        }
    }

    fn set(&self, state: SessionState) {
        self.recording
            .store(state != SessionState::Idle, Ordering::SeqCst);
        self.paused
            .store(state == SessionState::Paused, Ordering::SeqCst);
    }
}

/// What the session asks of its driver after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionControl {
    Continue,
    Stop,
}

/// A ctrl press waiting to see whether it starts a combo.
#[derive(Debug, Clone)]
struct PendingCtrl {
    key: KeySymbol,
    at: f64,
    /// Set when ctrl is still held after an expanded combo.
    rearmed: bool,
}

pub struct CaptureSession {
    settings: CaptureSettings,
    clock: Arc<dyn Clock>,
    status: Arc<SessionStatus>,
    state: SessionState,
    start_time: Duration,
    paused_total: Duration,
    pause_started_at: Option<Duration>,
    screen: ScreenResolution,
    mouse_events: Vec<Event>,
    keyboard_events: Vec<Event>,
    modifiers: ModifierState,
    pending_ctrl: Option<PendingCtrl>,
    ctrl_recorded: bool,
    /// Physical ctrl symbol currently down, if any.
    held_ctrl: Option<KeySymbol>,
    cap_warned: bool,
}

impl CaptureSession {
    pub fn new(settings: CaptureSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            clock,
            status: Arc::new(SessionStatus::default()),
            state: SessionState::Idle,
            start_time: Duration::ZERO,
            paused_total: Duration::ZERO,
            pause_started_at: None,
            screen: ScreenResolution::default(),
            mouse_events: Vec::new(),
            keyboard_events: Vec::new(),
            modifiers: ModifierState::default(),
            pending_ctrl: None,
            ctrl_recorded: false,
            held_ctrl: None,
            cap_warned: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Shared handle to the session flags.
    pub fn status_handle(&self) -> Arc<SessionStatus> {
        self.status.clone()
    }

    pub fn status(&self) -> Status {
        self.status.snapshot()
    }

    /// Number of events captured so far, per stream.
    pub fn event_counts(&self) -> (usize, usize) {
        (self.mouse_events.len(), self.keyboard_events.len())
    }

    /// Begin a session. `screen` is stamped on every mouse event.
    pub fn start(&mut self, screen: ScreenResolution) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(self.invalid("start"));
        }

        self.mouse_events.clear();
        self.keyboard_events.clear();
        self.modifiers = ModifierState::default();
        self.pending_ctrl = None;
        self.ctrl_recorded = false;
        self.held_ctrl = None;
        self.cap_warned = false;
        self.screen = screen;
        self.start_time = self.clock.now();
        self.paused_total = Duration::ZERO;
        self.pause_started_at = None;
        self.transition(SessionState::Active);

        log::info!("Capture started at {}", screen);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.state != SessionState::Active {
            return Err(self.invalid("pause"));
        }
        self.settle_pending_ctrl();
        self.pause_started_at = Some(self.clock.now());
        self.transition(SessionState::Paused);
        log::info!("Capture paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.state != SessionState::Paused {
            return Err(self.invalid("resume"));
        }
        if let Some(paused_at) = self.pause_started_at.take() {
            self.paused_total += self.clock.now().saturating_sub(paused_at);
        }
        self.transition(SessionState::Active);
        log::info!("Capture resumed");
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<()> {
        match self.state {
            SessionState::Active => self.pause(),
            SessionState::Paused => self.resume(),
            SessionState::Idle => Err(self.invalid("toggle pause")),
        }
    }

    /// End the session.
    ///
    /// Returns `None` when nothing was captured.
    pub fn stop(&mut self) -> Result<Option<Recording>> {
        if self.state == SessionState::Idle {
            return Err(self.invalid("stop"));
        }
        if self.state == SessionState::Active {
            self.settle_pending_ctrl();
        }
        self.pending_ctrl = None;
        self.pause_started_at = None;
        self.transition(SessionState::Idle);

        let mouse = std::mem::take(&mut self.mouse_events);
        let keyboard = std::mem::take(&mut self.keyboard_events);
        if mouse.is_empty() && keyboard.is_empty() {
            log::warn!("No events to save");
            return Ok(None);
        }

        log::info!(
            "Capture stopped: {} mouse events, {} keyboard events",
            mouse.len(),
            keyboard.len()
        );
        Ok(Some(Recording::new(mouse, keyboard)))
    }

    /// Feed one raw notification into the session.
    pub fn on_raw_event(&mut self, raw: RawInput) -> SessionControl {
        if self.state == SessionState::Idle {
            return SessionControl::Continue;
        }

        match raw {
            RawInput::Key { key, pressed } => return self.on_key(key, pressed),
            _ if self.state != SessionState::Active => {}
            RawInput::MouseMove { pos } => {
                let event = Event::MouseMove {
                    pos,
                    relative_time: self.relative_time(),
                    screen_resolution: self.screen,
                };
                self.push_mouse(event);
            }
            RawInput::Button {
                pos,
                button,
                pressed,
            } => {
                let event = Event::MouseClick {
                    pos,
                    button,
                    pressed,
                    relative_time: self.relative_time(),
                    screen_resolution: self.screen,
                };
                self.push_mouse(event);
            }
            RawInput::Wheel { pos, dx, dy } => {
                let event = Event::MouseScroll {
                    pos,
                    dx,
                    dy,
                    relative_time: self.relative_time(),
                    screen_resolution: self.screen,
                    is_trackpad: self.settings.scroll_mode == ScrollMode::Trackpad,
                };
                self.push_mouse(event);
            }
        }
        SessionControl::Continue
    }

    fn on_key(&mut self, key: KeySymbol, pressed: bool) -> SessionControl {
        if pressed && key == self.settings.stop_key {
            log::debug!("Stop key pressed");
            return SessionControl::Stop;
        }
        if key == self.settings.pause_key {
            if pressed {
                if let Err(e) = self.toggle_pause() {
                    log::warn!("Pause key ignored: {}", e);
                }
            }
            return SessionControl::Continue;
        }

        let modifier = self.modifiers.apply(&key, pressed);
        if modifier == Some(Modifier::Ctrl) {
            self.held_ctrl = pressed.then_some(key);
        }
        if self.state != SessionState::Active || !self.settings.record_keyboard {
            return SessionControl::Continue;
        }

        let now = self.relative_time();
        match (modifier, pressed) {
            (Some(Modifier::Ctrl), true) => {
                self.flush_pending_ctrl();
                self.pending_ctrl = Some(PendingCtrl {
                    key,
                    at: now,
                    rearmed: false,
                });
            }
            (Some(Modifier::Ctrl), false) => {
                self.settle_pending_ctrl();
                if self.ctrl_recorded {
                    self.ctrl_recorded = false;
                    self.push_keyboard(vec![Event::KeyUp {
                        key,
                        relative_time: now,
                    }]);
                }
            }
            (Some(_), true) => {
                self.flush_pending_ctrl();
                self.push_keyboard(vec![Event::KeyDown {
                    key,
                    relative_time: now,
                }]);
            }
            (Some(_), false) => {
                self.flush_pending_ctrl();
                self.push_keyboard(vec![Event::KeyUp {
                    key,
                    relative_time: now,
                }]);
            }
            (None, true) if self.modifiers.ctrl && is_combo_key(&key) => {
                // The held ctrl is folded into the expanded gesture.
                self.pending_ctrl = None;
                if self.push_keyboard(expand_ctrl_combo(key, now)) {
                    self.ctrl_recorded = false;
                }
                // Ctrl is still down: later keys need a fresh KeyDown.
                if let Some(held) = self.held_ctrl {
                    self.pending_ctrl = Some(PendingCtrl {
                        key: held,
                        at: now,
                        rearmed: true,
                    });
                }
            }
            (None, true) => {
                self.flush_pending_ctrl();
                self.push_keyboard(vec![Event::KeyPress {
                    key,
                    relative_time: now,
                }]);
            }
            (None, false) => {}
        }
        SessionControl::Continue
    }

    /// Seconds since start with paused intervals removed.
    fn relative_time(&self) -> f64 {
        self.clock
            .now()
            .saturating_sub(self.start_time)
            .saturating_sub(self.paused_total)
            .as_secs_f64()
    }

    /// Record a pending ctrl press unless it only follows a combo that
    /// already closed it.
    fn settle_pending_ctrl(&mut self) {
        match self.pending_ctrl {
            Some(PendingCtrl { rearmed: true, .. }) => self.pending_ctrl = None,
            _ => self.flush_pending_ctrl(),
        }
    }

    fn flush_pending_ctrl(&mut self) {
        if let Some(pending) = self.pending_ctrl.take() {
            let pushed = self.push_keyboard(vec![Event::KeyDown {
                key: pending.key,
                relative_time: pending.at,
            }]);
            self.ctrl_recorded = pushed;
        }
    }

    fn push_mouse(&mut self, event: Event) -> bool {
        if self.mouse_events.len() >= self.settings.max_events {
            self.warn_cap();
            return false;
        }
        self.mouse_events.push(event);
        true
    }

    /// Append a group of keyboard events, all or nothing.
    fn push_keyboard(&mut self, events: Vec<Event>) -> bool {
        if self.keyboard_events.len() + events.len() > self.settings.max_events {
            self.warn_cap();
            return false;
        }
        self.keyboard_events.extend(events);
        true
    }

    fn warn_cap(&mut self) {
        if !self.cap_warned {
            self.cap_warned = true;
            log::warn!(
                "Event limit of {} reached; further input is not recorded",
                self.settings.max_events
            );
        }
    }

    fn transition(&mut self, state: SessionState) {
        self.state = state;
        self.status.set(state);
    }

    fn invalid(&self, action: &'static str) -> RecorderError {
        RecorderError::InvalidState {
            action,
            state: self.state.name(),
        }
    }
}

fn is_combo_key(key: &KeySymbol) -> bool {
    matches!(
        key,
        KeySymbol::Named(NamedKey::Tab) | KeySymbol::Named(NamedKey::Backspace)
    )
}

fn expand_ctrl_combo(key: KeySymbol, at: f64) -> Vec<Event> {
    let ctrl = KeySymbol::Named(NamedKey::Ctrl);
    vec![
        Event::KeyDown {
            key: ctrl,
            relative_time: at,
        },
        Event::KeyDown {
            key,
            relative_time: at,
        },
        Event::KeyUp {
            key,
            relative_time: at,
        },
        Event::KeyUp {
            key: ctrl,
            relative_time: at,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::event::{MouseButton, Point};

    fn session_with(settings: CaptureSettings) -> (CaptureSession, ManualClock) {
        let clock = ManualClock::new();
        let session = CaptureSession::new(settings, Arc::new(clock.clone()));
        (session, clock)
    }

    fn session() -> (CaptureSession, ManualClock) {
        session_with(CaptureSettings::default())
    }

    fn mv(x: f64, y: f64) -> RawInput {
        RawInput::MouseMove {
            pos: Point::new(x, y),
        }
    }

    fn key(k: KeySymbol, pressed: bool) -> RawInput {
        RawInput::Key { key: k, pressed }
    }

    fn named(k: NamedKey) -> KeySymbol {
        KeySymbol::Named(k)
    }

    #[test]
    fn test_idle_session_ignores_input() {
        let (mut s, _) = session();
        assert_eq!(s.on_raw_event(mv(1.0, 1.0)), SessionControl::Continue);
        assert_eq!(s.event_counts(), (0, 0));
    }

    #[test]
    fn test_invalid_transitions() {
        let (mut s, _) = session();
        assert!(matches!(
            s.pause(),
            Err(RecorderError::InvalidState { action: "pause", state: "idle" })
        ));
        assert!(s.resume().is_err());
        assert!(s.stop().is_err());

        s.start(ScreenResolution::default()).unwrap();
        assert!(s.start(ScreenResolution::default()).is_err());
        assert!(s.resume().is_err());
        s.pause().unwrap();
        assert!(s.pause().is_err());
    }

    #[test]
    fn test_status_flags_follow_state() {
        let (mut s, _) = session();
        let status = s.status_handle();
        assert_eq!(status.snapshot(), Status::default());

        s.start(ScreenResolution::default()).unwrap();
        assert_eq!(status.snapshot(), Status { recording: true, paused: false });
        s.pause().unwrap();
        assert_eq!(status.snapshot(), Status { recording: true, paused: true });
        s.stop().unwrap();
        assert_eq!(status.snapshot(), Status::default());
    }

    #[test]
    fn test_pause_is_excluded_from_relative_time() {
        let (mut s, clock) = session();
        s.start(ScreenResolution::default()).unwrap();
        clock.advance_secs(1.0);
        s.on_raw_event(mv(1.0, 1.0));
        s.pause().unwrap();
        clock.advance_secs(5.0);
        s.on_raw_event(mv(2.0, 2.0));
        s.resume().unwrap();
        clock.advance_secs(1.0);
        s.on_raw_event(mv(3.0, 3.0));

        let rec = s.stop().unwrap().unwrap();
        let times: Vec<f64> = rec.mouse_events().iter().map(Event::relative_time).collect();
        assert_eq!(times, vec![1.0, 2.0]);
        assert_eq!(rec.total_duration(), 2.0);
    }

    #[test]
    fn test_stop_while_paused() {
        let (mut s, _) = session();
        s.start(ScreenResolution::default()).unwrap();
        s.on_raw_event(mv(1.0, 1.0));
        s.pause().unwrap();
        assert!(s.stop().unwrap().is_some());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_stop_without_events_produces_nothing() {
        let (mut s, _) = session();
        s.start(ScreenResolution::default()).unwrap();
        assert!(s.stop().unwrap().is_none());
    }

    #[test]
    fn test_stop_key_is_not_recorded() {
        let (mut s, _) = session();
        s.start(ScreenResolution::default()).unwrap();
        assert_eq!(
            s.on_raw_event(key(named(NamedKey::Escape), true)),
            SessionControl::Stop
        );
        assert_eq!(s.event_counts(), (0, 0));
    }

    #[test]
    fn test_pause_key_toggles() {
        let (mut s, _) = session();
        s.start(ScreenResolution::default()).unwrap();
        s.on_raw_event(key(KeySymbol::Char('p'), true));
        assert_eq!(s.state(), SessionState::Paused);
        s.on_raw_event(key(KeySymbol::Char('p'), false));
        s.on_raw_event(key(KeySymbol::Char('p'), true));
        assert_eq!(s.state(), SessionState::Active);
        assert_eq!(s.event_counts(), (0, 0));
    }

    #[test]
    fn test_clicks_and_scrolls_carry_screen() {
        let screen = ScreenResolution::new(2560.0, 1440.0);
        let (mut s, _) = session();
        s.start(screen).unwrap();
        s.on_raw_event(RawInput::Button {
            pos: Point::new(5.0, 6.0),
            button: MouseButton::Left,
            pressed: true,
        });
        s.on_raw_event(RawInput::Wheel {
            pos: Point::new(5.0, 6.0),
            dx: 0,
            dy: -1,
        });
        let rec = s.stop().unwrap().unwrap();
        assert_eq!(rec.mouse_events()[0].screen_resolution(), Some(screen));
        assert!(matches!(
            rec.mouse_events()[1],
            Event::MouseScroll { is_trackpad: true, dy: -1, .. }
        ));
    }

    #[test]
    fn test_wheel_scroll_mode() {
        let (mut s, _) = session_with(CaptureSettings {
            scroll_mode: ScrollMode::Wheel,
            ..CaptureSettings::default()
        });
        s.start(ScreenResolution::default()).unwrap();
        s.on_raw_event(RawInput::Wheel {
            pos: Point::default(),
            dx: 1,
            dy: 0,
        });
        let rec = s.stop().unwrap().unwrap();
        assert!(matches!(
            rec.mouse_events()[0],
            Event::MouseScroll { is_trackpad: false, .. }
        ));
    }

    #[test]
    fn test_plain_keys_become_keypress() {
        let (mut s, _) = session();
        s.start(ScreenResolution::default()).unwrap();
        s.on_raw_event(key(KeySymbol::Char('a'), true));
        s.on_raw_event(key(KeySymbol::Char('a'), false));
        let rec = s.stop().unwrap().unwrap();
        assert_eq!(
            rec.keyboard_events(),
            &[Event::KeyPress {
                key: KeySymbol::Char('a'),
                relative_time: 0.0
            }]
        );
    }

    #[test]
    fn test_modifiers_recorded_as_down_up() {
        let (mut s, _) = session();
        s.start(ScreenResolution::default()).unwrap();
        s.on_raw_event(key(named(NamedKey::ShiftLeft), true));
        s.on_raw_event(key(KeySymbol::Char('A'), true));
        s.on_raw_event(key(named(NamedKey::ShiftLeft), false));
        let rec = s.stop().unwrap().unwrap();
        let kinds: Vec<_> = rec.keyboard_events().iter().map(Event::kind).collect();
        use crate::event::EventKind::*;
        assert_eq!(kinds, vec![KeyDown, KeyPress, KeyUp]);
    }

    #[test]
    fn test_ctrl_tab_expands_to_four_events() {
        let (mut s, clock) = session();
        s.start(ScreenResolution::default()).unwrap();
        clock.advance_secs(0.5);
        s.on_raw_event(key(named(NamedKey::CtrlLeft), true));
        s.on_raw_event(key(named(NamedKey::Tab), true));
        s.on_raw_event(key(named(NamedKey::Tab), false));
        s.on_raw_event(key(named(NamedKey::CtrlLeft), false));

        let rec = s.stop().unwrap().unwrap();
        let ctrl = named(NamedKey::Ctrl);
        let tab = named(NamedKey::Tab);
        assert_eq!(
            rec.keyboard_events(),
            &[
                Event::KeyDown { key: ctrl, relative_time: 0.5 },
                Event::KeyDown { key: tab, relative_time: 0.5 },
                Event::KeyUp { key: tab, relative_time: 0.5 },
                Event::KeyUp { key: ctrl, relative_time: 0.5 },
            ]
        );
    }

    #[test]
    fn test_ctrl_held_after_combo_wraps_next_key() {
        let (mut s, clock) = session();
        s.start(ScreenResolution::default()).unwrap();
        clock.advance_secs(0.5);
        s.on_raw_event(key(named(NamedKey::CtrlLeft), true));
        s.on_raw_event(key(named(NamedKey::Tab), true));
        s.on_raw_event(key(named(NamedKey::Tab), false));
        clock.advance_secs(0.25);
        s.on_raw_event(key(KeySymbol::Char('w'), true));
        s.on_raw_event(key(KeySymbol::Char('w'), false));
        s.on_raw_event(key(named(NamedKey::CtrlLeft), false));

        let rec = s.stop().unwrap().unwrap();
        let ctrl = named(NamedKey::Ctrl);
        let ctrl_left = named(NamedKey::CtrlLeft);
        let tab = named(NamedKey::Tab);
        let w = KeySymbol::Char('w');
        assert_eq!(
            rec.keyboard_events(),
            &[
                Event::KeyDown { key: ctrl, relative_time: 0.5 },
                Event::KeyDown { key: tab, relative_time: 0.5 },
                Event::KeyUp { key: tab, relative_time: 0.5 },
                Event::KeyUp { key: ctrl, relative_time: 0.5 },
                Event::KeyDown { key: ctrl_left, relative_time: 0.5 },
                Event::KeyPress { key: w, relative_time: 0.75 },
                Event::KeyUp { key: ctrl_left, relative_time: 0.75 },
            ]
        );
    }

    #[test]
    fn test_stop_with_ctrl_held_after_combo() {
        let (mut s, _) = session();
        s.start(ScreenResolution::default()).unwrap();
        s.on_raw_event(key(named(NamedKey::CtrlLeft), true));
        s.on_raw_event(key(named(NamedKey::Tab), true));
        s.on_raw_event(key(named(NamedKey::Tab), true));
        let rec = s.stop().unwrap().unwrap();
        // Two combos, no dangling ctrl press.
        assert_eq!(rec.keyboard_events().len(), 8);
    }

    #[test]
    fn test_ctrl_backspace_expands() {
        let (mut s, _) = session();
        s.start(ScreenResolution::default()).unwrap();
        s.on_raw_event(key(named(NamedKey::CtrlRight), true));
        s.on_raw_event(key(named(NamedKey::Backspace), true));
        s.on_raw_event(key(named(NamedKey::CtrlRight), false));
        let rec = s.stop().unwrap().unwrap();
        assert_eq!(rec.keyboard_events().len(), 4);
    }

    #[test]
    fn test_lone_ctrl_is_recorded() {
        let (mut s, clock) = session();
        s.start(ScreenResolution::default()).unwrap();
        s.on_raw_event(key(named(NamedKey::CtrlLeft), true));
        clock.advance_secs(0.2);
        s.on_raw_event(key(KeySymbol::Char('c'), true));
        s.on_raw_event(key(named(NamedKey::CtrlLeft), false));
        let rec = s.stop().unwrap().unwrap();
        let ctrl = named(NamedKey::CtrlLeft);
        assert_eq!(
            rec.keyboard_events(),
            &[
                Event::KeyDown { key: ctrl, relative_time: 0.0 },
                Event::KeyPress { key: KeySymbol::Char('c'), relative_time: 0.2 },
                Event::KeyUp { key: ctrl, relative_time: 0.2 },
            ]
        );
    }

    #[test]
    fn test_keyboard_recording_can_be_disabled() {
        let (mut s, _) = session_with(CaptureSettings {
            record_keyboard: false,
            ..CaptureSettings::default()
        });
        s.start(ScreenResolution::default()).unwrap();
        s.on_raw_event(key(KeySymbol::Char('a'), true));
        s.on_raw_event(mv(0.0, 0.0));
        assert_eq!(s.event_counts(), (1, 0));
    }

    #[test]
    fn test_cap_halts_appends() {
        let (mut s, _) = session_with(CaptureSettings {
            max_events: 3,
            ..CaptureSettings::default()
        });
        s.start(ScreenResolution::default()).unwrap();
        for i in 0..10 {
            s.on_raw_event(mv(i as f64, 0.0));
        }
        // A four-event combo does not fit next to one keypress.
        s.on_raw_event(key(KeySymbol::Char('x'), true));
        s.on_raw_event(key(named(NamedKey::Ctrl), true));
        s.on_raw_event(key(named(NamedKey::Tab), true));
        assert_eq!(s.event_counts(), (3, 1));

        let rec = s.stop().unwrap().unwrap();
        assert_eq!(rec.mouse_events()[2], Event::MouseMove {
            pos: Point::new(2.0, 0.0),
            relative_time: 0.0,
            screen_resolution: ScreenResolution::default(),
        });
    }

    #[test]
    fn test_restart_clears_buffers() {
        let (mut s, clock) = session();
        s.start(ScreenResolution::default()).unwrap();
        s.on_raw_event(mv(1.0, 1.0));
        s.stop().unwrap();

        clock.advance_secs(10.0);
        s.start(ScreenResolution::default()).unwrap();
        s.on_raw_event(mv(2.0, 2.0));
        let rec = s.stop().unwrap().unwrap();
        assert_eq!(rec.mouse_events().len(), 1);
        assert_eq!(rec.mouse_events()[0].relative_time(), 0.0);
    }
}
