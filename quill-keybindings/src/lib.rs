//! Keybinding system for quill.
//!
//! Turns raw key presses into canonical chords, keeps the command → chord
//! table (catalog defaults merged with user overrides), and records new
//! bindings live.
//!
//! Features:
//! - Canonical chords (`ctrl+shift+p`) with a fixed modifier order
//! - Human-readable display strings (`Ctrl+Shift+P`) that parse back
//! - Overrides that may share a chord, resolved in catalog order
//! - Recording sessions that capture the next bindable press

pub mod chord;
pub mod listener;
pub mod parser;
pub mod platform;
mod recorder;
mod registry;

pub use chord::{Chord, KeyPress, Modifier, normalize};
pub use listener::{ListenerGuard, ListenerKind, ListenerStats};
pub use parser::{ParseError, display_string, parse_display};
pub use recorder::{BindingRecorder, RecordOutcome};
pub use registry::{RegistryError, ShortcutRegistry};
