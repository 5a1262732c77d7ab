//! Global input hook.
//!
//! One `rdev` listener thread serves the whole process. Each raw OS
//! notification is normalized into a [`RawInput`] and fanned out to every
//! live subscriber. Subscribers whose receiving side has gone away are
//! dropped on the next dispatch.

use crate::event::{KeySymbol, MouseButton, Point};
use crate::keymap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;

/// A normalized input notification.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    MouseMove { pos: Point },
    Button { pos: Point, button: MouseButton, pressed: bool },
    Wheel { pos: Point, dx: i64, dy: i64 },
    Key { key: KeySymbol, pressed: bool },
}

type Subscriber = Box<dyn Fn(RawInput) -> bool + Send>;

/// Fan-out point between the OS listener and its consumers.
pub struct InputHook {
    subscribers: Mutex<Vec<Subscriber>>,
    listening: AtomicBool,
}

static GLOBAL_HOOK: OnceLock<Arc<InputHook>> = OnceLock::new();

impl InputHook {
    /// A hook with no OS listener attached. Inputs arrive only through
    /// [`InputHook::dispatch`].
    pub fn new() -> Self {
        InputHook {
            subscribers: Mutex::new(Vec::new()),
            listening: AtomicBool::new(false),
        }
    }

    /// The process-wide hook, fed by the `rdev` listener thread.
    ///
    /// The listener is started on first use. `rdev::listen` cannot be
    /// stopped, so the thread lives until the process exits.
    pub fn global() -> Arc<InputHook> {
        GLOBAL_HOOK
            .get_or_init(|| {
                let hook = Arc::new(InputHook::new());
                spawn_listener(hook.clone());
                hook
            })
            .clone()
    }

    /// Register a channel that receives every future input.
    pub fn subscribe<T>(&self, sender: Sender<T>)
    where
        T: From<RawInput> + Send + 'static,
    {
        let subscriber: Subscriber = Box::new(move |raw| sender.send(T::from(raw)).is_ok());
        self.lock_subscribers().push(subscriber);
    }

    /// Deliver an input to all subscribers.
    pub fn dispatch(&self, raw: RawInput) {
        self.lock_subscribers()
            .retain(|subscriber| subscriber(raw.clone()));
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    /// Whether an OS listener is feeding this hook.
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for InputHook {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_listener(hook: Arc<InputHook>) {
    hook.listening.store(true, Ordering::SeqCst);
    thread::spawn(move || {
        let mut translator = RdevTranslator::default();
        let callback_hook = hook.clone();
        log::debug!("Input hook listener started");

        // Blocks for the life of the process. On macOS this requires the
        // Accessibility permission.
        let result = rdev::listen(move |event: rdev::Event| {
            if let Some(raw) = translator.translate(&event) {
                callback_hook.dispatch(raw);
            }
        });

        hook.listening.store(false, Ordering::SeqCst);
        if let Err(e) = result {
            log::error!("Input hook listener error: {:?}", e);
        }
    });
}

/// Converts `rdev` events into [`RawInput`].
///
/// `rdev` button and wheel events carry no coordinates, so the last
/// observed pointer position is attached to them.
#[derive(Debug, Default)]
pub struct RdevTranslator {
    last_pos: Point,
}

impl RdevTranslator {
    pub fn translate(&mut self, event: &rdev::Event) -> Option<RawInput> {
        match event.event_type {
            rdev::EventType::MouseMove { x, y } => {
                self.last_pos = Point::new(x, y);
                Some(RawInput::MouseMove { pos: self.last_pos })
            }
            rdev::EventType::ButtonPress(button) => Some(RawInput::Button {
                pos: self.last_pos,
                button: map_button(button)?,
                pressed: true,
            }),
            rdev::EventType::ButtonRelease(button) => Some(RawInput::Button {
                pos: self.last_pos,
                button: map_button(button)?,
                pressed: false,
            }),
            rdev::EventType::Wheel { delta_x, delta_y } => Some(RawInput::Wheel {
                pos: self.last_pos,
                dx: delta_x,
                dy: delta_y,
            }),
            rdev::EventType::KeyPress(key) => Some(RawInput::Key {
                key: keymap::rdev_to_symbol(key, event.name.as_deref())?,
                pressed: true,
            }),
            rdev::EventType::KeyRelease(key) => Some(RawInput::Key {
                key: keymap::rdev_to_symbol(key, None)?,
                pressed: false,
            }),
        }
    }
}

fn map_button(button: rdev::Button) -> Option<MouseButton> {
    match button {
        rdev::Button::Left => Some(MouseButton::Left),
        rdev::Button::Right => Some(MouseButton::Right),
        rdev::Button::Middle => Some(MouseButton::Middle),
        rdev::Button::Unknown(_) => None,
    }
}
