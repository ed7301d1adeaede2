//! Canonical key chords.
//!
//! A [`Chord`] is the lookup key for every binding: modifiers in the fixed
//! order `ctrl`, `alt`, `shift`, `meta`, then the base key, lower-cased and
//! joined with `+` (e.g. `ctrl+shift+p`). [`normalize`] turns a raw
//! [`KeyPress`] into one.

use crate::platform;
use std::fmt;

/// Modifier keys, declared in canonical emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Meta,
}

impl Modifier {
    /// All modifiers in the order they appear in a chord.
    pub const ORDER: [Modifier; 4] = [Modifier::Ctrl, Modifier::Alt, Modifier::Shift, Modifier::Meta];

    /// Token used inside canonical chords.
    pub fn token(self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
            Modifier::Meta => "meta",
        }
    }

    /// Label used in display strings.
    pub fn label(self) -> &'static str {
        match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::Meta => "Meta",
        }
    }

    /// Parse a modifier name, accepting the usual aliases.
    ///
    /// - `Ctrl`, `Control`
    /// - `Alt`, `Option`
    /// - `Shift`
    /// - `Meta`, `Super`, `Cmd`, `Command`, `Win`
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ctrl" | "control" => Some(Modifier::Ctrl),
            "alt" | "option" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            "meta" | "super" | "cmd" | "command" | "win" => Some(Modifier::Meta),
            _ => None,
        }
    }

    /// Exact match against a canonical token.
    pub(crate) fn from_token(s: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|m| m.token() == s)
    }
}

/// A key press as reported by the host: a base key label plus modifier flags.
///
/// The label is whatever the host calls the key (`"Escape"`, `"Esc"`, `"P"`,
/// `"ArrowUp"`, `" "`); [`normalize`] maps it onto the chord vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyPress {
    /// A press of `key` with no modifiers held.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Whether `modifier` is held during this press.
    pub fn is_held(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Ctrl => self.ctrl,
            Modifier::Alt => self.alt,
            Modifier::Shift => self.shift,
            Modifier::Meta => self.meta,
        }
    }

    /// The modifier this key *is*, when the base key itself is a modifier key.
    pub fn modifier_key(&self) -> Option<Modifier> {
        platform::canonical_key(&self.key).and_then(|k| platform::modifier_for(&k))
    }
}

/// Canonical chord string. Empty when the press had no bindable base key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chord(String);

impl Chord {
    /// The empty (unbindable) chord.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a chord from a set of held modifiers and a canonical base key.
    pub(crate) fn from_parts(held: impl Fn(Modifier) -> bool, key: &str) -> Self {
        let mut out = String::new();
        for modifier in Modifier::ORDER {
            if held(modifier) {
                out.push_str(modifier.token());
                out.push('+');
            }
        }
        out.push_str(key);
        Chord(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this chord may be bound to a command.
    pub fn is_bindable(&self) -> bool {
        !self.is_empty()
    }

    /// The base key token (`"p"` for `ctrl+shift+p`).
    pub fn key(&self) -> &str {
        self.0.rsplit('+').next().unwrap_or("")
    }

    /// Modifiers in canonical order.
    pub fn modifiers(&self) -> Vec<Modifier> {
        let mut parts: Vec<&str> = self.0.split('+').collect();
        parts.pop();
        parts.into_iter().filter_map(Modifier::from_token).collect()
    }

    /// Whether the chord includes `modifier`.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers().contains(&modifier)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Chord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a key press into its canonical chord.
///
/// Modifier-only presses, and presses whose key is outside the chord
/// vocabulary, produce the empty chord.
pub fn normalize(press: &KeyPress) -> Chord {
    let Some(key) = platform::canonical_key(&press.key) else {
        return Chord::empty();
    };
    if platform::modifier_for(&key).is_some() {
        return Chord::empty();
    }
    Chord::from_parts(|m| press.is_held(m), &key)
}
