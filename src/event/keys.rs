//! Canonical key symbol table.
//!
//! Named keys are resolved once, when a raw notification is normalized or a
//! stored document is parsed. Everything else is carried as a literal
//! character.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keys with a canonical name in stored recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Shift,
    ShiftLeft,
    ShiftRight,
    Alt,
    AltLeft,
    AltRight,
    Ctrl,
    CtrlLeft,
    CtrlRight,
    Meta,
    Enter,
    CapsLock,
    Tab,
    Space,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

/// Name table. The first entry for a key is its canonical spelling.
const NAMES: &[(&str, NamedKey)] = &[
    ("shift", NamedKey::Shift),
    ("shift_l", NamedKey::ShiftLeft),
    ("shift_r", NamedKey::ShiftRight),
    ("alt", NamedKey::Alt),
    ("alt_l", NamedKey::AltLeft),
    ("alt_r", NamedKey::AltRight),
    ("alt_gr", NamedKey::AltRight),
    ("ctrl", NamedKey::Ctrl),
    ("control", NamedKey::Ctrl),
    ("ctrl_l", NamedKey::CtrlLeft),
    ("ctrl_r", NamedKey::CtrlRight),
    ("cmd", NamedKey::Meta),
    ("meta", NamedKey::Meta),
    ("cmd_l", NamedKey::Meta),
    ("cmd_r", NamedKey::Meta),
    ("enter", NamedKey::Enter),
    ("return", NamedKey::Enter),
    ("caps_lock", NamedKey::CapsLock),
    ("tab", NamedKey::Tab),
    ("space", NamedKey::Space),
    ("backspace", NamedKey::Backspace),
    ("delete", NamedKey::Delete),
    ("esc", NamedKey::Escape),
    ("escape", NamedKey::Escape),
    ("up", NamedKey::Up),
    ("down", NamedKey::Down),
    ("left", NamedKey::Left),
    ("right", NamedKey::Right),
    ("home", NamedKey::Home),
    ("end", NamedKey::End),
    ("page_up", NamedKey::PageUp),
    ("page_down", NamedKey::PageDown),
    ("insert", NamedKey::Insert),
    ("f1", NamedKey::F1),
    ("f2", NamedKey::F2),
    ("f3", NamedKey::F3),
    ("f4", NamedKey::F4),
    ("f5", NamedKey::F5),
    ("f6", NamedKey::F6),
    ("f7", NamedKey::F7),
    ("f8", NamedKey::F8),
    ("f9", NamedKey::F9),
    ("f10", NamedKey::F10),
    ("f11", NamedKey::F11),
    ("f12", NamedKey::F12),
];

impl NamedKey {
    /// Canonical name used when a recording is written.
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(_, key)| *key == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    /// Look up a key by name. Accepts the legacy `Key.` prefix.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("Key.").unwrap_or(name);
        NAMES
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, key)| *key)
    }

    /// The modifier this key contributes to, if any.
    pub fn modifier(self) -> Option<Modifier> {
        match self {
            NamedKey::Ctrl | NamedKey::CtrlLeft | NamedKey::CtrlRight => Some(Modifier::Ctrl),
            NamedKey::Alt | NamedKey::AltLeft | NamedKey::AltRight => Some(Modifier::Alt),
            NamedKey::Shift | NamedKey::ShiftLeft | NamedKey::ShiftRight => Some(Modifier::Shift),
            _ => None,
        }
    }
}

/// Modifier keys tracked during capture and replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
}

/// A key as stored in a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeySymbol {
    Named(NamedKey),
    Char(char),
}

impl KeySymbol {
    /// Normalize a typed character. Whitespace with a named key is mapped
    /// to that key.
    pub fn from_char(c: char) -> Self {
        match c {
            ' ' => KeySymbol::Named(NamedKey::Space),
            '\t' => KeySymbol::Named(NamedKey::Tab),
            '\r' | '\n' => KeySymbol::Named(NamedKey::Enter),
            '\u{8}' => KeySymbol::Named(NamedKey::Backspace),
            '\u{1b}' => KeySymbol::Named(NamedKey::Escape),
            other => KeySymbol::Char(other),
        }
    }

    pub fn modifier(&self) -> Option<Modifier> {
        match self {
            KeySymbol::Named(key) => key.modifier(),
            KeySymbol::Char(_) => None,
        }
    }
}

/// Error returned when a stored key name cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key symbol '{0}'")]
pub struct KeyParseError(pub String);

impl FromStr for KeySymbol {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(named) = NamedKey::from_name(s) {
            return Ok(KeySymbol::Named(named));
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(KeySymbol::from_char(c)),
            _ => Err(KeyParseError(s.to_string())),
        }
    }
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySymbol::Named(key) => f.write_str(key.name()),
            KeySymbol::Char(c) => write!(f, "{}", c),
        }
    }
}

impl TryFrom<String> for KeySymbol {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeySymbol> for String {
    fn from(key: KeySymbol) -> Self {
        key.to_string()
    }
}
