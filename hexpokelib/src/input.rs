//! Framework-independent input events. The GUI shell translates its own events into
//! these before routing them to a session.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character
    Char(char),
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    Enter,
    Escape,
    Backspace,
    Delete,
    F5,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                shift: false,
                ctrl: false,
            },
        }
    }

    #[must_use]
    pub const fn shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                shift: true,
                ctrl: false,
            },
        }
    }

    #[must_use]
    pub const fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                shift: false,
                ctrl: true,
            },
        }
    }

    /// Value of a typed hex digit. Digits typed with Ctrl held don't count.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn hex_digit(&self) -> Option<u8> {
        match self.key {
            Key::Char(c) if !self.modifiers.ctrl => match c.to_digit(16) {
                Some(d) => Some(d as u8),
                None => None,
            },
            _ => None,
        }
    }

    /// Is this the given character, case-insensitive
    #[must_use]
    pub const fn is_char(&self, ch: char) -> bool {
        matches!(self.key, Key::Char(c) if c.eq_ignore_ascii_case(&ch))
    }
}

/// Pointer activity over the editor, already resolved to a nibble index
/// (see [`crate::hit_test`])
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down { nibble: usize, shift: bool },
    Move { nibble: usize },
    Up,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_digit() {
        assert_eq!(KeyEvent::plain(Key::Char('a')).hex_digit(), Some(0xA));
        assert_eq!(KeyEvent::shift(Key::Char('F')).hex_digit(), Some(0xF));
        assert_eq!(KeyEvent::plain(Key::Char('g')).hex_digit(), None);
        assert_eq!(KeyEvent::ctrl(Key::Char('a')).hex_digit(), None);
        assert_eq!(KeyEvent::plain(Key::Tab).hex_digit(), None);
    }

    #[test]
    fn test_is_char() {
        assert!(KeyEvent::plain(Key::Char('e')).is_char('E'));
        assert!(!KeyEvent::plain(Key::Enter).is_char('E'));
    }
}
