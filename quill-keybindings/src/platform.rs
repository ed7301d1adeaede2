//! Platform-independent key vocabulary.
//!
//! Contains:
//! - Host key label → canonical key token (`"Esc"` → `"escape"`)
//! - Canonical key token → display label (`"pageup"` → `"PageUp"`)
//! - winit event → [`KeyPress`] conversion

use crate::chord::{KeyPress, Modifier};
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Named keys in the chord vocabulary, with their display labels.
const NAMED_KEYS: &[(&str, &str)] = &[
    ("escape", "Escape"),
    ("enter", "Enter"),
    ("tab", "Tab"),
    ("space", "Space"),
    ("backspace", "Backspace"),
    ("delete", "Delete"),
    ("insert", "Insert"),
    ("home", "Home"),
    ("end", "End"),
    ("pageup", "PageUp"),
    ("pagedown", "PageDown"),
    ("up", "Up"),
    ("down", "Down"),
    ("left", "Left"),
    ("right", "Right"),
    ("plus", "Plus"),
];

/// Map a host key label onto the canonical chord vocabulary.
///
/// Single characters are lower-cased (`" "` and `"+"` become `space` and
/// `plus`). Named keys accept common aliases (`Esc`, `Return`, `PgUp`,
/// `ArrowUp`, ...), function keys run `F1`–`F24`, and modifier keys map to
/// their modifier token. Returns `None` for empty or unrecognised labels.
pub fn canonical_key(label: &str) -> Option<String> {
    let mut chars = label.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(match c {
            ' ' => "space".to_string(),
            '+' => "plus".to_string(),
            _ => c.to_lowercase().collect(),
        });
    }

    let lower = label.trim().to_lowercase();
    let canonical = match lower.as_str() {
        "" => return None,

        // Common named keys
        "escape" | "esc" => "escape",
        "enter" | "return" => "enter",
        "tab" => "tab",
        "space" | "spacebar" => "space",
        "backspace" => "backspace",
        "delete" | "del" => "delete",
        "insert" | "ins" => "insert",
        "home" => "home",
        "end" => "end",
        "pageup" | "pgup" => "pageup",
        "pagedown" | "pgdn" => "pagedown",
        "plus" => "plus",

        // Arrow keys
        "up" | "arrowup" => "up",
        "down" | "arrowdown" => "down",
        "left" | "arrowleft" => "left",
        "right" | "arrowright" => "right",

        // Modifier keys, including left/right physical variants
        "ctrl" | "control" | "controlleft" | "controlright" => "ctrl",
        "alt" | "option" | "altleft" | "altright" | "altgraph" => "alt",
        "shift" | "shiftleft" | "shiftright" => "shift",
        "meta" | "super" | "cmd" | "command" | "win" | "os" | "metaleft" | "metaright"
        | "superleft" | "superright" => "meta",

        other => return function_key(other),
    };
    Some(canonical.to_string())
}

/// `f1`..`f24`
fn function_key(s: &str) -> Option<String> {
    let n: u8 = s.strip_prefix('f')?.parse().ok()?;
    (1..=24).contains(&n).then(|| format!("f{n}"))
}

/// The modifier a canonical key token stands for, if it is a modifier key.
pub fn modifier_for(canonical: &str) -> Option<Modifier> {
    Modifier::from_token(canonical)
}

/// Display label for a canonical key token (`"p"` → `"P"`, `"f5"` → `"F5"`).
pub fn key_label(canonical: &str) -> String {
    if let Some((_, label)) = NAMED_KEYS.iter().find(|(token, _)| *token == canonical) {
        return (*label).to_string();
    }
    if let Some(modifier) = modifier_for(canonical) {
        return modifier.label().to_string();
    }
    let mut chars = canonical.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        // Keep characters whose upper case is not a single character (e.g. 'ß')
        let mut upper = c.to_uppercase();
        return match (upper.next(), upper.next()) {
            (Some(u), None) => u.to_string(),
            _ => c.to_string(),
        };
    }
    // Function keys
    canonical.to_uppercase()
}

/// Convert a winit key and modifier state into a [`KeyPress`].
///
/// The Super/Cmd/Windows key is reported as `meta`. Keys winit cannot
/// identify (dead keys, unidentified native keys) produce an empty label,
/// which normalizes to the empty chord.
pub fn key_press_from_winit(key: &Key, modifiers: ModifiersState) -> KeyPress {
    let label = match key {
        Key::Named(named) => named_key_label(*named).unwrap_or_default().to_string(),
        Key::Character(text) => text.to_string(),
        Key::Unidentified(_) | Key::Dead(_) => String::new(),
    };

    KeyPress {
        key: label,
        ctrl: modifiers.control_key(),
        alt: modifiers.alt_key(),
        shift: modifiers.shift_key(),
        meta: modifiers.super_key(),
    }
}

/// Label for the winit named keys that belong to the chord vocabulary.
fn named_key_label(named: NamedKey) -> Option<&'static str> {
    let label = match named {
        NamedKey::Escape => "escape",
        NamedKey::Enter => "enter",
        NamedKey::Tab => "tab",
        NamedKey::Space => "space",
        NamedKey::Backspace => "backspace",
        NamedKey::Delete => "delete",
        NamedKey::Insert => "insert",
        NamedKey::Home => "home",
        NamedKey::End => "end",
        NamedKey::PageUp => "pageup",
        NamedKey::PageDown => "pagedown",
        NamedKey::ArrowUp => "up",
        NamedKey::ArrowDown => "down",
        NamedKey::ArrowLeft => "left",
        NamedKey::ArrowRight => "right",
        NamedKey::Control => "ctrl",
        NamedKey::Alt | NamedKey::AltGraph => "alt",
        NamedKey::Shift => "shift",
        NamedKey::Super | NamedKey::Meta => "meta",
        NamedKey::F1 => "f1",
        NamedKey::F2 => "f2",
        NamedKey::F3 => "f3",
        NamedKey::F4 => "f4",
        NamedKey::F5 => "f5",
        NamedKey::F6 => "f6",
        NamedKey::F7 => "f7",
        NamedKey::F8 => "f8",
        NamedKey::F9 => "f9",
        NamedKey::F10 => "f10",
        NamedKey::F11 => "f11",
        NamedKey::F12 => "f12",
        _ => return None,
    };
    Some(label)
}
