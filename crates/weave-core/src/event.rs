#![forbid(unsafe_code)]

//! DOM-like events fed into component handlers.

use std::fmt;

/// The kind of event an element can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer click.
    Click,
    /// Value edited (fires per keystroke).
    Input,
    /// Value committed (fires when the control considers the edit done).
    Change,
    /// Key pressed.
    KeyDown,
    /// Focus left the element.
    Blur,
    /// Focus entered the element.
    Focus,
}

impl EventKind {
    /// Lowercase DOM name (`"click"`, `"keydown"`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::Change => "change",
            Self::KeyDown => "keydown",
            Self::Blur => "blur",
            Self::Focus => "focus",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keyboard key carried by a [`EventKind::KeyDown`] event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Tab,
    ArrowUp,
    ArrowDown,
    Char(char),
}

/// An event dispatched against a rendered element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    /// What happened.
    pub kind: EventKind,
    /// New value for input/change events.
    pub value: Option<String>,
    /// Key for keydown events.
    pub key: Option<Key>,
}

impl DomEvent {
    #[must_use]
    pub fn click() -> Self {
        Self {
            kind: EventKind::Click,
            value: None,
            key: None,
        }
    }

    #[must_use]
    pub fn input(value: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Input,
            value: Some(value.into()),
            key: None,
        }
    }

    #[must_use]
    pub fn change(value: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Change,
            value: Some(value.into()),
            key: None,
        }
    }

    #[must_use]
    pub fn key_down(key: Key) -> Self {
        Self {
            kind: EventKind::KeyDown,
            value: None,
            key: Some(key),
        }
    }

    #[must_use]
    pub fn blur() -> Self {
        Self {
            kind: EventKind::Blur,
            value: None,
            key: None,
        }
    }

    #[must_use]
    pub fn focus() -> Self {
        Self {
            kind: EventKind::Focus,
            value: None,
            key: None,
        }
    }

    /// The carried value, or `""` when none.
    #[must_use]
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}
