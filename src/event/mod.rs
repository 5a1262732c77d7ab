//! Event model for captured and replayed input.
//!
//! Events serialize to the stored document format: a `"type"` tag, positions
//! as `[x, y]`, resolutions as `[width, height]`.

mod keys;

pub use keys::{KeyParseError, KeySymbol, Modifier, NamedKey};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A pointer position in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Display size at the moment an event was captured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct ScreenResolution {
    pub width: f64,
    pub height: f64,
}

impl ScreenResolution {
    pub fn new(width: f64, height: f64) -> Self {
        ScreenResolution { width, height }
    }

    /// Both dimensions finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Map a point captured at `self` onto a display of size `target`.
    ///
    /// Scaling is linear per axis, so a point replayed at its own resolution
    /// comes back unchanged.
    pub fn scale_to(&self, point: Point, target: ScreenResolution) -> Point {
        Point {
            x: point.x * (target.width / self.width),
            y: point.y * (target.height / self.height),
        }
    }
}

impl Default for ScreenResolution {
    fn default() -> Self {
        ScreenResolution::new(1920.0, 1080.0)
    }
}

impl From<(f64, f64)> for ScreenResolution {
    fn from((width, height): (f64, f64)) -> Self {
        ScreenResolution { width, height }
    }
}

impl From<ScreenResolution> for (f64, f64) {
    fn from(r: ScreenResolution) -> Self {
        (r.width, r.height)
    }
}

impl fmt::Display for ScreenResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Mouse buttons that can be captured and replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn name(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }
}

impl TryFrom<String> for MouseButton {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let name = value.strip_prefix("Button.").unwrap_or(&value);
        match name.to_ascii_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            _ => Err(format!("unknown mouse button '{}'", value)),
        }
    }
}

impl From<MouseButton> for String {
    fn from(button: MouseButton) -> Self {
        button.name().to_string()
    }
}

/// Type tag of an event, used for replay filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Move,
    Click,
    Scroll,
    KeyDown,
    KeyUp,
    KeyPress,
}

impl EventKind {
    pub fn tag(self) -> &'static str {
        match self {
            EventKind::Move => "move",
            EventKind::Click => "click",
            EventKind::Scroll => "scroll",
            EventKind::KeyDown => "keydown",
            EventKind::KeyUp => "keyup",
            EventKind::KeyPress => "keypress",
        }
    }

    pub fn is_mouse(self) -> bool {
        matches!(self, EventKind::Move | EventKind::Click | EventKind::Scroll)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One captured action.
///
/// `relative_time` is seconds since the capture session started, with
/// paused intervals removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "move")]
    MouseMove {
        pos: Point,
        relative_time: f64,
        screen_resolution: ScreenResolution,
    },
    #[serde(rename = "click")]
    MouseClick {
        pos: Point,
        button: MouseButton,
        pressed: bool,
        relative_time: f64,
        screen_resolution: ScreenResolution,
    },
    #[serde(rename = "scroll")]
    MouseScroll {
        pos: Point,
        dx: i64,
        dy: i64,
        relative_time: f64,
        screen_resolution: ScreenResolution,
        #[serde(rename = "trackpad", default)]
        is_trackpad: bool,
    },
    #[serde(rename = "keydown")]
    KeyDown { key: KeySymbol, relative_time: f64 },
    #[serde(rename = "keyup")]
    KeyUp { key: KeySymbol, relative_time: f64 },
    #[serde(rename = "keypress")]
    KeyPress { key: KeySymbol, relative_time: f64 },
}

impl Event {
    pub fn relative_time(&self) -> f64 {
        match self {
            Event::MouseMove { relative_time, .. }
            | Event::MouseClick { relative_time, .. }
            | Event::MouseScroll { relative_time, .. }
            | Event::KeyDown { relative_time, .. }
            | Event::KeyUp { relative_time, .. }
            | Event::KeyPress { relative_time, .. } => *relative_time,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::MouseMove { .. } => EventKind::Move,
            Event::MouseClick { .. } => EventKind::Click,
            Event::MouseScroll { .. } => EventKind::Scroll,
            Event::KeyDown { .. } => EventKind::KeyDown,
            Event::KeyUp { .. } => EventKind::KeyUp,
            Event::KeyPress { .. } => EventKind::KeyPress,
        }
    }

    pub fn is_mouse(&self) -> bool {
        self.kind().is_mouse()
    }

    /// Resolution recorded with a mouse event.
    pub fn screen_resolution(&self) -> Option<ScreenResolution> {
        match self {
            Event::MouseMove {
                screen_resolution, ..
            }
            | Event::MouseClick {
                screen_resolution, ..
            }
            | Event::MouseScroll {
                screen_resolution, ..
            } => Some(*screen_resolution),
            _ => None,
        }
    }
}

/// Live ctrl/alt/shift state, rebuilt from observed key transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl ModifierState {
    /// Update from a key transition. Returns the modifier that changed.
    pub fn apply(&mut self, key: &KeySymbol, pressed: bool) -> Option<Modifier> {
        let modifier = key.modifier()?;
        match modifier {
            Modifier::Ctrl => self.ctrl = pressed,
            Modifier::Alt => self.alt = pressed,
            Modifier::Shift => self.shift = pressed,
        }
        Some(modifier)
    }

    pub fn is_held(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Ctrl => self.ctrl,
            Modifier::Alt => self.alt,
            Modifier::Shift => self.shift,
        }
    }
}
