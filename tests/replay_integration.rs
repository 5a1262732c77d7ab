//! Integration tests for replay through the Recorder facade.
//!
//! A recording sink captures every injected action; a `ManualClock`
//! absorbs the precision-mode sleeps.

use action_recorder::cancel::{CancellationSignal, Hotkey};
use action_recorder::capture::CaptureSettings;
use action_recorder::clock::ManualClock;
use action_recorder::event::{Event, EventKind, KeySymbol, MouseButton, NamedKey, Point, ScreenResolution};
use action_recorder::hook::InputHook;
use action_recorder::recording::Recording;
use action_recorder::replay::{InjectError, InputSink, ReplayOptions, ReplayStatus};
use action_recorder::store::RecordingStore;
use action_recorder::{Recorder, RecorderError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Move(Point),
    Button(MouseButton, bool),
    Scroll(i64, i64),
    Key(KeySymbol, bool),
}

/// Records actions into shared state so the test can inspect them after
/// the sink is handed to the recorder.
#[derive(Clone, Default)]
struct RecordingSink {
    actions: Arc<Mutex<Vec<Action>>>,
    screen: Option<ScreenResolution>,
    /// Reject this character.
    reject: Option<char>,
}

impl RecordingSink {
    fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    fn push(&mut self, action: Action) -> Result<(), InjectError> {
        self.actions.lock().unwrap().push(action);
        Ok(())
    }
}

impl InputSink for RecordingSink {
    fn screen_size(&mut self) -> Result<ScreenResolution, InjectError> {
        self.screen
            .ok_or_else(|| InjectError::Display("headless".to_string()))
    }

    fn move_to(&mut self, pos: Point) -> Result<(), InjectError> {
        self.push(Action::Move(pos))
    }

    fn button(&mut self, button: MouseButton, pressed: bool) -> Result<(), InjectError> {
        self.push(Action::Button(button, pressed))
    }

    fn scroll(&mut self, dx: i64, dy: i64) -> Result<(), InjectError> {
        self.push(Action::Scroll(dx, dy))
    }

    fn key(&mut self, key: KeySymbol, pressed: bool) -> Result<(), InjectError> {
        if let KeySymbol::Char(c) = key {
            if Some(c) == self.reject {
                return Err(InjectError::UnresolvableKey(key));
            }
        }
        self.push(Action::Key(key, pressed))
    }
}

const RES: ScreenResolution = ScreenResolution {
    width: 1920.0,
    height: 1080.0,
};

fn mv(x: f64, t: f64) -> Event {
    Event::MouseMove {
        pos: Point::new(x, x / 2.0),
        relative_time: t,
        screen_resolution: RES,
    }
}

fn press(c: char, t: f64) -> Event {
    Event::KeyPress {
        key: KeySymbol::Char(c),
        relative_time: t,
    }
}

struct Harness {
    recorder: Recorder,
    sink: RecordingSink,
    clock: ManualClock,
    dir: TempDir,
}

fn harness_with(sink: RecordingSink) -> Harness {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new();
    let recorder = Recorder::with_parts(
        CaptureSettings::default(),
        Hotkey::default(),
        RecordingStore::new(dir.path()),
        Arc::new(InputHook::new()),
        Arc::new(clock.clone()),
        Box::new(sink.clone()),
    );
    Harness {
        recorder,
        sink,
        clock,
        dir,
    }
}

fn harness() -> Harness {
    harness_with(RecordingSink {
        screen: Some(RES),
        ..RecordingSink::default()
    })
}

fn save(h: &Harness, rec: &Recording) -> String {
    h.recorder.store().save(rec).unwrap()
}

#[test]
fn test_loops_run_full_passes() {
    let h = harness();
    let id = save(&h, &Recording::new(vec![mv(10.0, 0.0), mv(20.0, 0.5)], vec![press('a', 0.25)]));

    let outcome = h
        .recorder
        .replay(&id, &ReplayOptions::default().with_loops(3))
        .unwrap();

    assert_eq!(outcome.status, ReplayStatus::Completed);
    assert_eq!(outcome.loops_completed, 3);
    assert_eq!(outcome.events_executed, 9);
    // Each pass: move, key down, key up, move.
    assert_eq!(h.sink.actions().len(), 12);
    // No delay is inserted between passes.
    assert_eq!(h.clock.total_slept(), Duration::from_millis(1500));
}

#[test]
fn test_merged_order_is_chronological() {
    let h = harness();
    let id = save(
        &h,
        &Recording::new(vec![mv(1.0, 0.0), mv(2.0, 1.0)], vec![press('k', 0.5), press('l', 1.0)]),
    );
    h.recorder.replay(&id, &ReplayOptions::default()).unwrap();

    let k = KeySymbol::Char('k');
    let l = KeySymbol::Char('l');
    assert_eq!(
        h.sink.actions(),
        vec![
            Action::Move(Point::new(1.0, 0.5)),
            Action::Key(k, true),
            Action::Key(k, false),
            // Equal timestamps: mouse first.
            Action::Move(Point::new(2.0, 1.0)),
            Action::Key(l, true),
            Action::Key(l, false),
        ]
    );
}

#[test]
fn test_cancel_mid_pass_does_not_start_new_pass() {
    // Sink raises the recorder's signal after the fourth injected action.
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new();
    let signal_slot: Arc<Mutex<Option<CancellationSignal>>> = Arc::new(Mutex::new(None));

    struct CancellingSink {
        count: usize,
        limit: usize,
        signal: Arc<Mutex<Option<CancellationSignal>>>,
        log: Arc<Mutex<Vec<Point>>>,
    }

    impl InputSink for CancellingSink {
        fn screen_size(&mut self) -> Result<ScreenResolution, InjectError> {
            Ok(RES)
        }
        fn move_to(&mut self, pos: Point) -> Result<(), InjectError> {
            self.log.lock().unwrap().push(pos);
            self.count += 1;
            if self.count == self.limit {
                if let Some(signal) = self.signal.lock().unwrap().as_ref() {
                    signal.cancel();
                }
            }
            Ok(())
        }
        fn button(&mut self, _: MouseButton, _: bool) -> Result<(), InjectError> {
            Ok(())
        }
        fn scroll(&mut self, _: i64, _: i64) -> Result<(), InjectError> {
            Ok(())
        }
        fn key(&mut self, _: KeySymbol, _: bool) -> Result<(), InjectError> {
            Ok(())
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder::with_parts(
        CaptureSettings::default(),
        Hotkey::default(),
        RecordingStore::new(dir.path()),
        Arc::new(InputHook::new()),
        Arc::new(clock),
        Box::new(CancellingSink {
            count: 0,
            limit: 4,
            signal: signal_slot.clone(),
            log: log.clone(),
        }),
    );
    *signal_slot.lock().unwrap() = Some(recorder.cancel_signal());

    let id = recorder
        .store()
        .save(&Recording::new(vec![mv(1.0, 0.0), mv(2.0, 0.1), mv(3.0, 0.2)], vec![]))
        .unwrap();
    let outcome = recorder
        .replay(&id, &ReplayOptions::default().with_loops(3))
        .unwrap();

    assert_eq!(outcome.status, ReplayStatus::Cancelled);
    assert!(outcome.is_cancelled());
    assert_eq!(outcome.loops_completed, 1);
    assert_eq!(outcome.events_executed, 4);
    assert_eq!(log.lock().unwrap().len(), 4);
}

#[test]
fn test_loop_count_out_of_range_is_rejected_before_any_action() {
    let h = harness();
    let id = save(&h, &Recording::new(vec![mv(1.0, 0.0)], vec![]));

    for loops in [0, 11] {
        let err = h
            .recorder
            .replay(&id, &ReplayOptions::default().with_loops(loops))
            .unwrap_err();
        assert!(matches!(err, RecorderError::Validation(_)));
    }
    assert!(h.sink.actions().is_empty());

    // Validation happens before the recording is even looked up.
    let err = h
        .recorder
        .replay("recording_404", &ReplayOptions::default().with_loops(0))
        .unwrap_err();
    assert!(matches!(err, RecorderError::Validation(_)));
}

#[test]
fn test_missing_recording_is_an_error_value() {
    let h = harness();
    let err = h
        .recorder
        .replay("recording_404", &ReplayOptions::default())
        .unwrap_err();
    assert!(matches!(err, RecorderError::NotFound(_)));
    assert!(h.sink.actions().is_empty());
}

#[test]
fn test_malformed_recording_aborts_before_any_action() {
    let h = harness();
    let doc = serde_json::json!({
        "mouse_events": [
            {"type": "move", "pos": [1, 1], "relative_time": 0.0, "screen_resolution": [100, 100]},
            {"type": "move", "pos": [2, 2], "relative_time": 1.0, "screen_resolution": [0, 100]}
        ],
        "keyboard_events": []
    });
    std::fs::write(h.dir.path().join("recording_1.json"), doc.to_string()).unwrap();

    let err = h
        .recorder
        .replay("recording_1", &ReplayOptions::default())
        .unwrap_err();
    assert!(matches!(err, RecorderError::MalformedRecording { .. }));
    assert!(h.sink.actions().is_empty());
}

#[test]
fn test_rescaling_to_current_display() {
    let h = harness_with(RecordingSink {
        screen: Some(ScreenResolution::new(960.0, 540.0)),
        ..RecordingSink::default()
    });
    let id = save(&h, &Recording::new(vec![mv(400.0, 0.0)], vec![]));
    h.recorder.replay(&id, &ReplayOptions::default()).unwrap();
    assert_eq!(h.sink.actions(), vec![Action::Move(Point::new(200.0, 100.0))]);
}

#[test]
fn test_same_resolution_reproduces_coordinates_exactly() {
    let h = harness();
    let id = save(&h, &Recording::new(vec![mv(1234.5, 0.0)], vec![]));
    h.recorder.replay(&id, &ReplayOptions::default()).unwrap();
    assert_eq!(h.sink.actions(), vec![Action::Move(Point::new(1234.5, 617.25))]);
}

#[test]
fn test_filter_skips_kinds_and_their_timing() {
    let h = harness();
    let click = Event::MouseClick {
        pos: Point::new(5.0, 5.0),
        button: MouseButton::Left,
        pressed: true,
        relative_time: 2.0,
        screen_resolution: RES,
    };
    let id = save(&h, &Recording::new(vec![mv(1.0, 0.0), click], vec![press('z', 1.0)]));

    let options = ReplayOptions::default().skipping([EventKind::Move, EventKind::Click]);
    let outcome = h.recorder.replay(&id, &options).unwrap();

    assert_eq!(outcome.events_executed, 1);
    let z = KeySymbol::Char('z');
    assert_eq!(h.sink.actions(), vec![Action::Key(z, true), Action::Key(z, false)]);
    // Only one retained event, so nothing to wait for.
    assert!(h.clock.sleeps().is_empty());
}

#[test]
fn test_failed_event_is_skipped_and_replay_continues() {
    let h = harness_with(RecordingSink {
        screen: Some(RES),
        reject: Some('!'),
        ..RecordingSink::default()
    });
    let id = save(
        &h,
        &Recording::new(vec![], vec![press('a', 0.0), press('!', 0.1), press('b', 0.2)]),
    );
    let outcome = h.recorder.replay(&id, &ReplayOptions::default()).unwrap();

    assert_eq!(outcome.status, ReplayStatus::Completed);
    assert_eq!(outcome.events_executed, 2);
    assert_eq!(outcome.events_failed, 1);
    assert_eq!(h.sink.actions().len(), 4);
}

#[test]
fn test_ctrl_combo_replays_in_order() {
    let h = harness();
    let ctrl = KeySymbol::Named(NamedKey::Ctrl);
    let backspace = KeySymbol::Named(NamedKey::Backspace);
    let id = save(
        &h,
        &Recording::new(
            vec![],
            vec![
                Event::KeyDown { key: ctrl, relative_time: 0.3 },
                Event::KeyDown { key: backspace, relative_time: 0.3 },
                Event::KeyUp { key: backspace, relative_time: 0.3 },
                Event::KeyUp { key: ctrl, relative_time: 0.3 },
            ],
        ),
    );
    h.recorder
        .replay(&id, &ReplayOptions::default().with_precision(false))
        .unwrap();
    assert_eq!(
        h.sink.actions(),
        vec![
            Action::Key(ctrl, true),
            Action::Key(backspace, true),
            Action::Key(backspace, false),
            Action::Key(ctrl, false),
        ]
    );
}

#[test]
fn test_headless_sink_replays_unscaled() {
    let h = harness_with(RecordingSink::default());
    let id = save(&h, &Recording::new(vec![mv(64.0, 0.0)], vec![]));
    let outcome = h.recorder.replay(&id, &ReplayOptions::default()).unwrap();
    assert_eq!(outcome.events_executed, 1);
    assert_eq!(h.sink.actions(), vec![Action::Move(Point::new(64.0, 32.0))]);
}

#[test]
fn test_external_cancel_before_replay_is_cleared() {
    let h = harness();
    let id = save(&h, &Recording::new(vec![mv(1.0, 0.0)], vec![]));
    h.recorder.cancel_replay();
    let outcome = h.recorder.replay(&id, &ReplayOptions::default()).unwrap();
    assert_eq!(outcome.status, ReplayStatus::Completed);
}
