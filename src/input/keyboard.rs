//! Keyboard event types.

use bitflags::bitflags;

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        /// Shift key.
        const SHIFT = 0b0000_0001;
        /// Alt/Option key.
        const ALT = 0b0000_0010;
        /// Control key.
        const CTRL = 0b0000_0100;
        /// Command key on macOS, Windows key elsewhere.
        const META = 0b0000_1000;
    }
}

/// The `key` of a DOM keyboard event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Backspace,
    Delete,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    Esc,
    /// A printable character (includes space).
    Char(char),
    /// IME composition in progress (`Process` / key code 229).
    Process,
    /// Any other non-printable key (`Shift`, `F1`, ...).
    Other,
}

impl KeyCode {
    /// Check if this is a character key.
    #[must_use]
    pub fn is_char(&self) -> bool {
        matches!(self, Self::Char(_))
    }

    /// Check if this is a navigation key (arrows, home, end, page up/down).
    #[must_use]
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::Left
                | Self::Right
                | Self::Up
                | Self::Down
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }

    /// Check if this is Backspace or Delete.
    #[must_use]
    pub fn is_deletion(&self) -> bool {
        matches!(self, Self::Backspace | Self::Delete)
    }

    /// Get the character if this is a character key.
    #[must_use]
    pub fn char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }
}

/// A keyboard event delivered by the host.
///
/// Handlers that take over a keystroke call [`prevent_default`] once; the
/// host reads [`default_prevented`] afterwards to skip its native handling.
///
/// [`prevent_default`]: KeyboardEvent::prevent_default
/// [`default_prevented`]: KeyboardEvent::default_prevented
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// The key code.
    pub code: KeyCode,
    /// Modifier keys held.
    pub modifiers: KeyModifiers,
    /// Part of an IME composition.
    pub is_composing: bool,
    default_prevented: bool,
}

impl KeyboardEvent {
    /// Create a new key event.
    #[must_use]
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self {
            code,
            modifiers,
            is_composing: false,
            default_prevented: false,
        }
    }

    /// Create a key event with no modifiers.
    #[must_use]
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    /// Create a character key event.
    #[must_use]
    pub fn char(c: char) -> Self {
        Self::key(KeyCode::Char(c))
    }

    /// Create a Ctrl+key event.
    #[must_use]
    pub fn with_ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CTRL)
    }

    /// Create an Alt+key event.
    #[must_use]
    pub fn with_alt(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::ALT)
    }

    /// Create a Meta+key event.
    #[must_use]
    pub fn with_meta(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::META)
    }

    /// Check if Ctrl is held.
    #[must_use]
    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(KeyModifiers::CTRL)
    }

    /// Check if Alt is held.
    #[must_use]
    pub fn alt(&self) -> bool {
        self.modifiers.contains(KeyModifiers::ALT)
    }

    /// Check if Meta is held.
    #[must_use]
    pub fn meta(&self) -> bool {
        self.modifiers.contains(KeyModifiers::META)
    }

    /// Ctrl, Alt or Meta is held.
    #[must_use]
    pub fn has_modifier_key(&self) -> bool {
        self.modifiers
            .intersects(KeyModifiers::CTRL | KeyModifiers::ALT | KeyModifiers::META)
    }

    /// A keystroke that will insert a character into the content.
    #[must_use]
    pub fn is_character_value(&self) -> bool {
        self.code.is_char() && !self.has_modifier_key()
    }

    /// Check if this is Enter.
    #[must_use]
    pub fn is_enter(&self) -> bool {
        self.code == KeyCode::Enter
    }

    /// Take over the keystroke from the host.
    ///
    /// Returns false when another handler already did.
    pub fn prevent_default(&mut self) -> bool {
        if self.default_prevented {
            tracing::debug!(code = ?self.code, "default already prevented");
            return false;
        }
        self.default_prevented = true;
        true
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}
