//! Input injection boundary.

use crate::error::RecorderError;
use crate::event::{KeySymbol, MouseButton, Point, ScreenResolution};
use crate::keymap;
use rdev::{EventType, Key};

/// Errors raised while injecting a single action.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error("No key code for symbol '{0}'")]
    UnresolvableKey(KeySymbol),

    #[error("Injection rejected: {0}")]
    Rejected(String),

    #[error("Cannot query display size: {0}")]
    Display(String),
}

impl From<InjectError> for RecorderError {
    fn from(err: InjectError) -> Self {
        RecorderError::ReplayExecution(err.to_string())
    }
}

/// Something that can synthesize input on the live system.
pub trait InputSink: Send {
    /// Current display size, used to rescale recorded coordinates.
    fn screen_size(&mut self) -> Result<ScreenResolution, InjectError>;

    /// Move the pointer to an absolute position.
    fn move_to(&mut self, pos: Point) -> Result<(), InjectError>;

    fn button(&mut self, button: MouseButton, pressed: bool) -> Result<(), InjectError>;

    fn scroll(&mut self, dx: i64, dy: i64) -> Result<(), InjectError>;

    fn key(&mut self, key: KeySymbol, pressed: bool) -> Result<(), InjectError>;
}

/// Injects input through `rdev::simulate`.
///
/// Characters are typed with a US layout; characters that need shift are
/// wrapped in a shift press and release.
#[derive(Debug, Default)]
pub struct RdevSink;

impl RdevSink {
    pub fn new() -> Self {
        RdevSink
    }

    fn send(&self, event: EventType) -> Result<(), InjectError> {
        rdev::simulate(&event).map_err(|e| InjectError::Rejected(format!("{:?}: {:?}", event, e)))
    }
}

impl InputSink for RdevSink {
    fn screen_size(&mut self) -> Result<ScreenResolution, InjectError> {
        let (width, height) =
            rdev::display_size().map_err(|e| InjectError::Display(format!("{:?}", e)))?;
        Ok(ScreenResolution::new(width as f64, height as f64))
    }

    fn move_to(&mut self, pos: Point) -> Result<(), InjectError> {
        self.send(EventType::MouseMove { x: pos.x, y: pos.y })
    }

    fn button(&mut self, button: MouseButton, pressed: bool) -> Result<(), InjectError> {
        let button = match button {
            MouseButton::Left => rdev::Button::Left,
            MouseButton::Right => rdev::Button::Right,
            MouseButton::Middle => rdev::Button::Middle,
        };
        if pressed {
            self.send(EventType::ButtonPress(button))
        } else {
            self.send(EventType::ButtonRelease(button))
        }
    }

    fn scroll(&mut self, dx: i64, dy: i64) -> Result<(), InjectError> {
        self.send(EventType::Wheel {
            delta_x: dx,
            delta_y: dy,
        })
    }

    fn key(&mut self, key: KeySymbol, pressed: bool) -> Result<(), InjectError> {
        let (code, needs_shift) =
            keymap::symbol_to_rdev(&key).ok_or(InjectError::UnresolvableKey(key))?;

        if pressed {
            if needs_shift {
                self.send(EventType::KeyPress(Key::ShiftLeft))?;
            }
            self.send(EventType::KeyPress(code))
        } else {
            self.send(EventType::KeyRelease(code))?;
            if needs_shift {
                self.send(EventType::KeyRelease(Key::ShiftLeft))?;
            }
            Ok(())
        }
    }
}
