//! Raw DOM events forwarded by the host.

use crate::input::keyboard::KeyboardEvent;

/// A `beforeinput`/`input` event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputEvent {
    /// Inserted text, if any.
    pub data: Option<String>,
    /// Part of an IME composition.
    pub is_composing: bool,
}

impl InputEvent {
    /// Plain text insertion.
    #[must_use]
    pub fn text(data: &str) -> Self {
        Self {
            data: Some(data.to_string()),
            is_composing: false,
        }
    }
}

/// The browser event that started an edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawEvent {
    Keyboard(KeyboardEvent),
    Input(InputEvent),
    CompositionEnd { data: String },
    Paste,
    Cut,
}

impl RawEvent {
    /// Get the keyboard event if this is one.
    #[must_use]
    pub fn keyboard(&self) -> Option<&KeyboardEvent> {
        match self {
            Self::Keyboard(event) => Some(event),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;

    #[test]
    fn test_raw_event_accessors() {
        let event = RawEvent::Keyboard(KeyboardEvent::key(KeyCode::Enter));
        assert!(event.keyboard().is_some_and(KeyboardEvent::is_enter));
        assert!(RawEvent::Input(InputEvent::text("a")).keyboard().is_none());
    }
}
