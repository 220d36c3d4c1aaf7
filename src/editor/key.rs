//! Logical key codes consumed by the interactive state machines


/// A key press after translation from the console or window layer
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Key {
    /// Printable character (0x20-0x7E)
    Char(u8),
    /// Control chord, stored as the upper-case letter (Ctrl+A is `Ctrl(b'A')`)
    Ctrl(u8),
    Escape,
    Tab,
    Return,
    Backspace,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    /// The printable byte carried by this key, if any
    pub fn printable(self) -> Option<u8> {
        match self {
            Key::Char(c) if (0x20..=0x7E).contains(&c) => Some(c),
            _ => None,
        }
    }
}

/// Blocking source of keys for the headless drivers
#[cfg(test)]
pub trait KeySource {
    fn read_key(&mut self) -> std::io::Result<Key>;
}

/// Pre-recorded keys for driving the state machines in tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    keys: std::collections::VecDeque<Key>,
}

#[cfg(test)]
impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Script that types `text` one character at a time
    pub fn typing(text: &str) -> Self {
        Self::new(text.bytes().map(Key::Char))
    }

    pub fn push(&mut self, key: Key) {
        self.keys.push_back(key);
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
impl KeySource for ScriptedKeys {
    fn read_key(&mut self) -> std::io::Result<Key> {
        self.keys
            .pop_front()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "key script exhausted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable() {
        assert_eq!(Key::Char(b'a').printable(), Some(b'a'));
        assert_eq!(Key::Char(0x07).printable(), None);
        assert_eq!(Key::Return.printable(), None);
    }

    #[test]
    fn test_scripted_keys_exhaust() {
        let mut keys = ScriptedKeys::typing("ab");
        keys.push(Key::Return);
        assert_eq!(keys.read_key().unwrap(), Key::Char(b'a'));
        assert_eq!(keys.read_key().unwrap(), Key::Char(b'b'));
        assert_eq!(keys.read_key().unwrap(), Key::Return);
        assert_eq!(keys.remaining(), 0);
        assert!(keys.read_key().is_err());
    }
}
