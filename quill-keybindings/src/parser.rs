//! Key combination parser.
//!
//! Parses human-readable key strings like "Ctrl+Shift+P" (or the canonical
//! "ctrl+shift+p") into [`Chord`]s, and renders chords back for display.

use crate::chord::{Chord, KeyPress, Modifier, normalize};
use crate::platform;
use std::str::FromStr;

/// Error type for key parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty key combination")]
    Empty,
    #[error("key combination ends with modifier, no key specified")]
    MissingKey,
    #[error("multiple keys specified: already have '{0}', found '{1}'")]
    MultipleKeys(String, String),
    #[error("unknown key: '{0}'")]
    UnknownKey(String),
}

/// Parse a key combination string into a canonical [`Chord`].
///
/// Supported format: "Modifier+Modifier+Key"
///
/// Modifiers:
/// - `Ctrl`, `Control` - Control key
/// - `Alt`, `Option` - Alt/Option key
/// - `Shift` - Shift key
/// - `Meta`, `Super`, `Cmd`, `Command`, `Win` - Meta/Cmd key
///
/// Keys:
/// - Single characters: `A`, `b`, `1`, `,`
/// - Named keys: `F1`-`F24`, `Enter`, `Escape`, `Space`, `Tab`, `PageUp`, ...
/// - The plus key, written `Plus` or as a trailing `+` (`Ctrl++`)
pub fn parse_display(s: &str) -> Result<Chord, ParseError> {
    if s.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let parts = split_tokens(s);
    let mut press = KeyPress::default();
    let mut key_part: Option<&str> = None;

    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;

        if part.is_empty() {
            return Err(if is_last {
                ParseError::MissingKey
            } else {
                ParseError::UnknownKey(String::new())
            });
        }

        if let Some(modifier) = Modifier::from_name(part) {
            match modifier {
                Modifier::Ctrl => press.ctrl = true,
                Modifier::Alt => press.alt = true,
                Modifier::Shift => press.shift = true,
                Modifier::Meta => press.meta = true,
            }
            if is_last {
                // Last part is a modifier with no key - invalid
                return Err(ParseError::MissingKey);
            }
            continue;
        }

        if let Some(existing) = key_part {
            return Err(ParseError::MultipleKeys(
                existing.to_string(),
                part.to_string(),
            ));
        }
        key_part = Some(*part);
    }

    let key_str = key_part.ok_or(ParseError::MissingKey)?;
    press.key = platform::canonical_key(key_str)
        .ok_or_else(|| ParseError::UnknownKey(key_str.to_string()))?;

    let chord = normalize(&press);
    if chord.is_empty() {
        // The key named a modifier key, e.g. "Ctrl+ControlLeft"
        return Err(ParseError::MissingKey);
    }
    Ok(chord)
}

/// Split on `+`, treating a trailing `++` (or a lone `+`) as the plus key.
fn split_tokens(s: &str) -> Vec<&str> {
    let s = s.trim();
    if s == "+" {
        return vec!["+"];
    }
    if let Some(head) = s.strip_suffix("++") {
        let mut parts: Vec<&str> = head.split('+').map(str::trim).collect();
        parts.push("+");
        return parts;
    }
    s.split('+').map(str::trim).collect()
}

/// Human-readable rendering of a chord, e.g. `Ctrl+Shift+P`.
///
/// The empty chord renders as an empty string.
pub fn display_string(chord: &Chord) -> String {
    if chord.is_empty() {
        return String::new();
    }
    let mut parts: Vec<String> = chord
        .modifiers()
        .into_iter()
        .map(|m| m.label().to_string())
        .collect();
    parts.push(platform::key_label(chord.key()));
    parts.join("+")
}

impl FromStr for Chord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_display(s)
    }
}
