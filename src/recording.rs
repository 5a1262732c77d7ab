//! Persisted recordings and the replay timeline.

use crate::error::{RecorderError, Result};
use crate::event::Event;
use serde::{Deserialize, Serialize};

/// Summary stored alongside the event streams. Always derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub total_mouse_events: usize,
    pub total_keyboard_events: usize,
    pub total_recording_time: f64,
}

/// The two event streams captured in one session.
///
/// The streams are kept apart on disk; interleaving only happens in
/// [`Recording::timeline`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recording {
    mouse_events: Vec<Event>,
    keyboard_events: Vec<Event>,
    metadata: Metadata,
}

/// Raw document shape, before validation.
#[derive(Deserialize)]
struct RecordingDocument {
    #[serde(default)]
    mouse_events: Vec<Event>,
    #[serde(default)]
    keyboard_events: Vec<Event>,
    metadata: Option<Metadata>,
}

impl Recording {
    /// Build a recording from captured streams, deriving the metadata.
    pub fn new(mouse_events: Vec<Event>, keyboard_events: Vec<Event>) -> Self {
        let metadata = Metadata {
            total_mouse_events: mouse_events.len(),
            total_keyboard_events: keyboard_events.len(),
            total_recording_time: mouse_events.last().map(Event::relative_time).unwrap_or(0.0),
        };
        Recording {
            mouse_events,
            keyboard_events,
            metadata,
        }
    }

    pub fn mouse_events(&self) -> &[Event] {
        &self.mouse_events
    }

    pub fn keyboard_events(&self) -> &[Event] {
        &self.keyboard_events
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Seconds from session start to the last mouse event.
    pub fn total_duration(&self) -> f64 {
        self.metadata.total_recording_time
    }

    pub fn is_empty(&self) -> bool {
        self.mouse_events.is_empty() && self.keyboard_events.is_empty()
    }

    /// Parse and validate a stored document.
    ///
    /// Any structural problem is reported as `MalformedRecording` before the
    /// caller can act on a single event.
    pub fn from_json(id: &str, json: &str) -> Result<Self> {
        let document: RecordingDocument = serde_json::from_str(json)
            .map_err(|e| RecorderError::malformed(id, e.to_string()))?;
        Self::from_document(id, document)
    }

    /// Validate an already-parsed JSON value (used by bulk import).
    pub fn from_value(id: &str, value: serde_json::Value) -> Result<Self> {
        let document: RecordingDocument = serde_json::from_value(value)
            .map_err(|e| RecorderError::malformed(id, e.to_string()))?;
        Self::from_document(id, document)
    }

    fn from_document(id: &str, document: RecordingDocument) -> Result<Self> {
        validate_stream(id, "mouse_events", &document.mouse_events, true)?;
        validate_stream(id, "keyboard_events", &document.keyboard_events, false)?;

        let recording = Recording::new(document.mouse_events, document.keyboard_events);

        if let Some(stored) = document.metadata {
            if stored.total_mouse_events != recording.metadata.total_mouse_events
                || stored.total_keyboard_events != recording.metadata.total_keyboard_events
            {
                return Err(RecorderError::malformed(
                    id,
                    format!(
                        "metadata counts ({} mouse, {} keyboard) do not match streams ({} mouse, {} keyboard)",
                        stored.total_mouse_events,
                        stored.total_keyboard_events,
                        recording.metadata.total_mouse_events,
                        recording.metadata.total_keyboard_events
                    ),
                ));
            }
        }

        Ok(recording)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Both streams merged into one chronological sequence.
    ///
    /// Stable two-way merge on `relative_time`: each stream keeps its own
    /// order, and at equal timestamps mouse events come first.
    pub fn timeline(&self) -> Vec<&Event> {
        let mut merged = Vec::with_capacity(self.mouse_events.len() + self.keyboard_events.len());
        let mut mouse = self.mouse_events.iter().peekable();
        let mut keyboard = self.keyboard_events.iter().peekable();

        loop {
            let take_mouse = match (mouse.peek(), keyboard.peek()) {
                (Some(m), Some(k)) => m.relative_time() <= k.relative_time(),
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_mouse { mouse.next() } else { keyboard.next() };
            merged.extend(next);
        }

        merged
    }
}

fn validate_stream(id: &str, stream: &str, events: &[Event], mouse: bool) -> Result<()> {
    let mut previous = 0.0_f64;
    for (index, event) in events.iter().enumerate() {
        if event.is_mouse() != mouse {
            return Err(RecorderError::malformed(
                id,
                format!("{}[{}] is a '{}' event", stream, index, event.kind()),
            ));
        }
        let t = event.relative_time();
        if !t.is_finite() || t < 0.0 {
            return Err(RecorderError::malformed(
                id,
                format!("{}[{}] has invalid relative_time {}", stream, index, t),
            ));
        }
        if t < previous {
            return Err(RecorderError::malformed(
                id,
                format!(
                    "{}[{}] relative_time {} goes backwards from {}",
                    stream, index, t, previous
                ),
            ));
        }
        if let Some(res) = event.screen_resolution() {
            if !res.is_valid() {
                return Err(RecorderError::malformed(
                    id,
                    format!("{}[{}] has invalid screen_resolution {}", stream, index, res),
                ));
            }
        }
        previous = t;
    }
    Ok(())
}
