//! Cooperative replay cancellation.
//!
//! [`CancellationSignal`] is the shared flag the replay engine polls.
//! [`HotkeyObserver`] watches the global input hook on its own thread and
//! raises the signal when the configured chord is pressed.

use crate::event::{KeySymbol, Modifier, ModifierState};
use crate::hook::{InputHook, RawInput};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    flag: Arc<AtomicBool>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A key chord such as `ctrl+s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: KeySymbol,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid hotkey '{0}'")]
pub struct HotkeyParseError(pub String);

impl Hotkey {
    /// Whether a key press completes this chord under `modifiers`.
    pub fn matches(&self, key: &KeySymbol, modifiers: &ModifierState) -> bool {
        let same_key = match (key, &self.key) {
            (KeySymbol::Char(a), KeySymbol::Char(b)) => a.eq_ignore_ascii_case(b),
            (a, b) => a == b,
        };
        same_key
            && modifiers.is_held(Modifier::Ctrl) == self.ctrl
            && modifiers.is_held(Modifier::Alt) == self.alt
            && modifiers.is_held(Modifier::Shift) == self.shift
    }
}

impl Default for Hotkey {
    fn default() -> Self {
        Hotkey {
            ctrl: true,
            alt: false,
            shift: false,
            key: KeySymbol::Char('s'),
        }
    }
}

impl FromStr for Hotkey {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || HotkeyParseError(s.to_string());
        let mut hotkey = Hotkey {
            ctrl: false,
            alt: false,
            shift: false,
            key: KeySymbol::Char(' '),
        };
        let mut key = None;

        for part in s.split('+').map(str::trim) {
            let symbol: KeySymbol = part.parse().map_err(|_| err())?;
            match symbol.modifier() {
                Some(Modifier::Ctrl) => hotkey.ctrl = true,
                Some(Modifier::Alt) => hotkey.alt = true,
                Some(Modifier::Shift) => hotkey.shift = true,
                None if key.is_none() => key = Some(symbol),
                None => return Err(err()),
            }
        }

        hotkey.key = key.ok_or_else(err)?;
        Ok(hotkey)
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

enum ObserverMessage {
    Input(RawInput),
    Shutdown,
}

impl From<RawInput> for ObserverMessage {
    fn from(raw: RawInput) -> Self {
        ObserverMessage::Input(raw)
    }
}

/// Sets a [`CancellationSignal`] when a hotkey is pressed.
///
/// The observer keeps its own modifier state, independent of any capture
/// session or replay. Dropping it stops the observer thread.
pub struct HotkeyObserver {
    sender: Sender<ObserverMessage>,
    listener_thread: Option<JoinHandle<()>>,
}

impl HotkeyObserver {
    pub fn spawn(hook: &InputHook, hotkey: Hotkey, signal: CancellationSignal) -> Self {
        let (sender, receiver) = mpsc::channel();
        hook.subscribe(sender.clone());

        let handle = thread::spawn(move || {
            let mut modifiers = ModifierState::default();
            for message in receiver.iter() {
                let (key, pressed) = match message {
                    ObserverMessage::Input(RawInput::Key { key, pressed }) => (key, pressed),
                    ObserverMessage::Input(_) => continue,
                    ObserverMessage::Shutdown => break,
                };
                if modifiers.apply(&key, pressed).is_some() || !pressed {
                    continue;
                }
                if hotkey.matches(&key, &modifiers) && !signal.is_cancelled() {
                    log::info!("Cancel hotkey {} pressed, stopping replay", hotkey);
                    signal.cancel();
                }
            }
        });

        Self {
            sender,
            listener_thread: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        let _ = self.sender.send(ObserverMessage::Shutdown);
        if let Some(handle) = self.listener_thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for HotkeyObserver {
    fn drop(&mut self) {
        self.stop();
    }
}
