use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key without modifiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Tab,
    BackTab,
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
    F(u8),
}

const NAMED: &[(&str, Key)] = &[
    ("enter", Key::Enter),
    ("esc", Key::Esc),
    ("tab", Key::Tab),
    ("backtab", Key::BackTab),
    ("backspace", Key::Backspace),
    ("delete", Key::Delete),
    ("insert", Key::Insert),
    ("up", Key::Up),
    ("down", Key::Down),
    ("left", Key::Left),
    ("right", Key::Right),
    ("home", Key::Home),
    ("end", Key::End),
    ("pageup", Key::PageUp),
    ("pagedown", Key::PageDown),
    ("space", Key::Char(' ')),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized key descriptor: {0:?}")]
pub struct ParseKeyError(pub String);

/// A normalized key press: `"a"`, `"J"`, `"+"`, `"Space"`, `"Ctrl+x"`,
/// `"Alt+Enter"`, `"F5"`.
///
/// Character keys are case sensitive, except under `Ctrl` where the
/// terminal cannot tell the cases apart. Names and prefixes are not.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct KeyDescriptor {
    key: Key,
    ctrl: bool,
    alt: bool,
}

impl KeyDescriptor {
    pub fn new(key: Key, ctrl: bool, alt: bool) -> Self {
        let key = match key {
            Key::Char(c) if ctrl => Key::Char(c.to_ascii_lowercase()),
            other => other,
        };
        Self { key, ctrl, alt }
    }

    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c), false, false)
    }

    pub fn key(&self) -> Key {
        self.key
    }
}

impl From<Key> for KeyDescriptor {
    fn from(key: Key) -> Self {
        Self::new(key, false, false)
    }
}

impl FromStr for KeyDescriptor {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseKeyError(s.to_string());
        let mut rest = s;
        let (mut ctrl, mut alt) = (false, false);

        // A lone "+" is a key, so a prefix must leave something behind.
        loop {
            let lower = rest.to_ascii_lowercase();
            if lower.starts_with("ctrl+") && rest.len() > 5 {
                ctrl = true;
                rest = &rest[5..];
            } else if lower.starts_with("alt+") && rest.len() > 4 {
                alt = true;
                rest = &rest[4..];
            } else {
                break;
            }
        }

        let mut chars = rest.chars();
        let key = match (chars.next(), chars.next()) {
            (Some(c), None) => Key::Char(c),
            (None, _) => return Err(err()),
            _ => {
                let lower = rest.to_ascii_lowercase();
                if let Some((_, key)) = NAMED.iter().find(|(name, _)| *name == lower) {
                    *key
                } else {
                    let n: u8 = lower
                        .strip_prefix('f')
                        .and_then(|n| n.parse().ok())
                        .filter(|n| (1..=12).contains(n))
                        .ok_or_else(err)?;
                    Key::F(n)
                }
            }
        };
        Ok(Self::new(key, ctrl, alt))
    }
}

impl fmt::Display for KeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        match self.key {
            Key::Char(' ') => f.write_str("Space"),
            Key::Char(c) => write!(f, "{c}"),
            Key::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl KeyDescriptor {
    /// Convert a terminal key event. Returns `None` for keys that cannot be
    /// bound (media keys, modifiers on their own, ...).
    pub fn from_event(event: &KeyEvent) -> Option<Self> {
        let key = match event.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Esc,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Insert => Key::Insert,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) if (1..=12).contains(&n) => Key::F(n),
            _ => return None,
        };
        Some(Self::new(
            key,
            event.modifiers.contains(KeyModifiers::CONTROL),
            event.modifiers.contains(KeyModifiers::ALT),
        ))
    }
}
