use crate::document::NodeId;

/// Events dispatched through a [`crate::Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Pointer double-click. Bubbles from the target up to the root.
    DoubleClick { target: NodeId },
    /// Element gained focus
    Focus { target: NodeId },
    /// Element lost focus
    Blur { target: NodeId },
    /// Key press, targeted at the focused element
    Key {
        target: NodeId,
        key: Key,
        modifiers: Modifiers,
    },
}

impl Event {
    pub fn target(&self) -> NodeId {
        match self {
            Self::DoubleClick { target }
            | Self::Focus { target }
            | Self::Blur { target }
            | Self::Key { target, .. } => *target,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::DoubleClick { .. } => EventKind::DoubleClick,
            Self::Focus { .. } => EventKind::Focus,
            Self::Blur { .. } => EventKind::Blur,
            Self::Key { .. } => EventKind::Key,
        }
    }

    /// Whether the event propagates to ancestors of its target.
    pub fn bubbles(&self) -> bool {
        matches!(self, Self::DoubleClick { .. })
    }
}

/// Event names used when registering listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DoubleClick,
    Focus,
    Blur,
    Key,
}

/// Simplified key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Escape,
    Left,
    Right,
    Home,
    End,
}

impl Key {
    /// Parse a key name such as `"backspace"` or `"x"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "enter" | "return" => Key::Enter,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "tab" => Key::Tab,
            "escape" | "esc" => Key::Escape,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// Key modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    pub fn none(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}
