//! Translation between [`KeySymbol`] and `rdev` key codes.
//!
//! Characters are mapped with a US keyboard layout. Shifted characters
//! resolve to their base key plus a shift flag.

use crate::event::{KeySymbol, NamedKey};
use rdev::Key;

const LETTERS: [Key; 26] = [
    Key::KeyA,
    Key::KeyB,
    Key::KeyC,
    Key::KeyD,
    Key::KeyE,
    Key::KeyF,
    Key::KeyG,
    Key::KeyH,
    Key::KeyI,
    Key::KeyJ,
    Key::KeyK,
    Key::KeyL,
    Key::KeyM,
    Key::KeyN,
    Key::KeyO,
    Key::KeyP,
    Key::KeyQ,
    Key::KeyR,
    Key::KeyS,
    Key::KeyT,
    Key::KeyU,
    Key::KeyV,
    Key::KeyW,
    Key::KeyX,
    Key::KeyY,
    Key::KeyZ,
];

const DIGITS: [Key; 10] = [
    Key::Num0,
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
    Key::Num9,
];

/// Punctuation: (unshifted, shifted, key).
const PUNCTUATION: &[(char, char, Key)] = &[
    ('`', '~', Key::BackQuote),
    ('-', '_', Key::Minus),
    ('=', '+', Key::Equal),
    ('[', '{', Key::LeftBracket),
    (']', '}', Key::RightBracket),
    (';', ':', Key::SemiColon),
    ('\'', '"', Key::Quote),
    ('\\', '|', Key::BackSlash),
    (',', '<', Key::Comma),
    ('.', '>', Key::Dot),
    ('/', '?', Key::Slash),
];

/// Shifted digit row, indexed by digit.
const SHIFTED_DIGITS: [char; 10] = [')', '!', '@', '#', '$', '%', '^', '&', '*', '('];

/// Resolve a named key to its `rdev` code.
pub fn named_to_rdev(key: NamedKey) -> Key {
    match key {
        NamedKey::Shift | NamedKey::ShiftLeft => Key::ShiftLeft,
        NamedKey::ShiftRight => Key::ShiftRight,
        NamedKey::Alt | NamedKey::AltLeft => Key::Alt,
        NamedKey::AltRight => Key::AltGr,
        NamedKey::Ctrl | NamedKey::CtrlLeft => Key::ControlLeft,
        NamedKey::CtrlRight => Key::ControlRight,
        NamedKey::Meta => Key::MetaLeft,
        NamedKey::Enter => Key::Return,
        NamedKey::CapsLock => Key::CapsLock,
        NamedKey::Tab => Key::Tab,
        NamedKey::Space => Key::Space,
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Delete => Key::Delete,
        NamedKey::Escape => Key::Escape,
        NamedKey::Up => Key::UpArrow,
        NamedKey::Down => Key::DownArrow,
        NamedKey::Left => Key::LeftArrow,
        NamedKey::Right => Key::RightArrow,
        NamedKey::Home => Key::Home,
        NamedKey::End => Key::End,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::PageDown => Key::PageDown,
        NamedKey::Insert => Key::Insert,
        NamedKey::F1 => Key::F1,
        NamedKey::F2 => Key::F2,
        NamedKey::F3 => Key::F3,
        NamedKey::F4 => Key::F4,
        NamedKey::F5 => Key::F5,
        NamedKey::F6 => Key::F6,
        NamedKey::F7 => Key::F7,
        NamedKey::F8 => Key::F8,
        NamedKey::F9 => Key::F9,
        NamedKey::F10 => Key::F10,
        NamedKey::F11 => Key::F11,
        NamedKey::F12 => Key::F12,
    }
}

/// Resolve a character to `(key, needs_shift)`, or `None` if the US layout
/// has no key for it.
pub fn char_to_rdev(c: char) -> Option<(Key, bool)> {
    if c.is_ascii_lowercase() {
        return Some((LETTERS[(c as u8 - b'a') as usize], false));
    }
    if c.is_ascii_uppercase() {
        return Some((LETTERS[(c as u8 - b'A') as usize], true));
    }
    if c.is_ascii_digit() {
        return Some((DIGITS[(c as u8 - b'0') as usize], false));
    }
    if let Some(digit) = SHIFTED_DIGITS.iter().position(|&s| s == c) {
        return Some((DIGITS[digit], true));
    }
    PUNCTUATION.iter().find_map(|&(plain, shifted, key)| {
        if c == plain {
            Some((key, false))
        } else if c == shifted {
            Some((key, true))
        } else {
            None
        }
    })
}

/// Resolve a stored symbol to `(key, needs_shift)`.
pub fn symbol_to_rdev(symbol: &KeySymbol) -> Option<(Key, bool)> {
    match symbol {
        KeySymbol::Named(named) => Some((named_to_rdev(*named), false)),
        KeySymbol::Char(c) => char_to_rdev(*c),
    }
}

/// Normalize an observed `rdev` key.
///
/// `typed` is the text the OS reported for the key press, if any. A single
/// printable character wins over the key table so shifted characters are
/// kept as typed.
pub fn rdev_to_symbol(key: Key, typed: Option<&str>) -> Option<KeySymbol> {
    if let Some(named) = rdev_to_named(key) {
        return Some(KeySymbol::Named(named));
    }
    if let Some(c) = typed.and_then(single_printable) {
        return Some(KeySymbol::from_char(c));
    }
    rdev_to_char(key).map(KeySymbol::Char)
}

fn single_printable(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(c),
        _ => None,
    }
}

fn rdev_to_named(key: Key) -> Option<NamedKey> {
    let named = match key {
        Key::Alt => NamedKey::AltLeft,
        Key::AltGr => NamedKey::AltRight,
        Key::ShiftLeft => NamedKey::ShiftLeft,
        Key::ShiftRight => NamedKey::ShiftRight,
        Key::ControlLeft => NamedKey::CtrlLeft,
        Key::ControlRight => NamedKey::CtrlRight,
        Key::MetaLeft | Key::MetaRight => NamedKey::Meta,
        Key::Return | Key::KpReturn => NamedKey::Enter,
        Key::CapsLock => NamedKey::CapsLock,
        Key::Tab => NamedKey::Tab,
        Key::Space => NamedKey::Space,
        Key::Backspace => NamedKey::Backspace,
        Key::Delete => NamedKey::Delete,
        Key::Escape => NamedKey::Escape,
        Key::UpArrow => NamedKey::Up,
        Key::DownArrow => NamedKey::Down,
        Key::LeftArrow => NamedKey::Left,
        Key::RightArrow => NamedKey::Right,
        Key::Home => NamedKey::Home,
        Key::End => NamedKey::End,
        Key::PageUp => NamedKey::PageUp,
        Key::PageDown => NamedKey::PageDown,
        Key::Insert => NamedKey::Insert,
        Key::F1 => NamedKey::F1,
        Key::F2 => NamedKey::F2,
        Key::F3 => NamedKey::F3,
        Key::F4 => NamedKey::F4,
        Key::F5 => NamedKey::F5,
        Key::F6 => NamedKey::F6,
        Key::F7 => NamedKey::F7,
        Key::F8 => NamedKey::F8,
        Key::F9 => NamedKey::F9,
        Key::F10 => NamedKey::F10,
        Key::F11 => NamedKey::F11,
        Key::F12 => NamedKey::F12,
        _ => return None,
    };
    Some(named)
}

fn rdev_to_char(key: Key) -> Option<char> {
    if let Some(i) = LETTERS.iter().position(|&k| k == key) {
        return Some((b'a' + i as u8) as char);
    }
    if let Some(i) = DIGITS.iter().position(|&k| k == key) {
        return Some((b'0' + i as u8) as char);
    }
    let keypad = match key {
        Key::Kp0 => Some('0'),
        Key::Kp1 => Some('1'),
        Key::Kp2 => Some('2'),
        Key::Kp3 => Some('3'),
        Key::Kp4 => Some('4'),
        Key::Kp5 => Some('5'),
        Key::Kp6 => Some('6'),
        Key::Kp7 => Some('7'),
        Key::Kp8 => Some('8'),
        Key::Kp9 => Some('9'),
        Key::KpMinus => Some('-'),
        Key::KpPlus => Some('+'),
        Key::KpMultiply => Some('*'),
        Key::KpDivide => Some('/'),
        _ => None,
    };
    keypad.or_else(|| {
        PUNCTUATION
            .iter()
            .find(|&&(_, _, k)| k == key)
            .map(|&(plain, _, _)| plain)
    })
}
