//! Value enums for CLI flags.

use action_recorder::capture::ScrollMode;
use action_recorder::event::EventKind;
use clap::ValueEnum;

/// Event kinds that can be left out of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SkipKind {
    Move,
    Click,
    Scroll,
    Keydown,
    Keyup,
    Keypress,
}

impl From<SkipKind> for EventKind {
    fn from(kind: SkipKind) -> Self {
        match kind {
            SkipKind::Move => EventKind::Move,
            SkipKind::Click => EventKind::Click,
            SkipKind::Scroll => EventKind::Scroll,
            SkipKind::Keydown => EventKind::KeyDown,
            SkipKind::Keyup => EventKind::KeyUp,
            SkipKind::Keypress => EventKind::KeyPress,
        }
    }
}

/// How captured scrolls are tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScrollArg {
    Wheel,
    Trackpad,
}

impl From<ScrollArg> for ScrollMode {
    fn from(arg: ScrollArg) -> Self {
        match arg {
            ScrollArg::Wheel => ScrollMode::Wheel,
            ScrollArg::Trackpad => ScrollMode::Trackpad,
        }
    }
}
