//! Presentation signals.
//!
//! The session never draws anything. It queues [`Signal`]s for the host to
//! render (recording prompts, conflict warnings, the tab switcher overlay,
//! the palette) and the host drains them after each event.

use crate::tabs::TabId;
use quill_keybindings::Chord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// A binding recorder is waiting for a chord for `command`
    RecordingStarted { command: String },
    /// Recording for `command` ended; `chord` is `None` when nothing was bound
    RecordingFinished {
        command: String,
        chord: Option<Chord>,
    },
    /// `command` now shares `chord` with `others`
    BindingConflict {
        command: String,
        chord: Chord,
        others: Vec<String>,
    },
    /// Show `tab` as highlighted in the recent-tab switcher
    HighlightTab { tab: TabId, cursor: usize },
    /// Make `tab` the active tab
    ActivateTab { tab: TabId },
    /// The recent-tab switcher closed without a selection
    CycleCancelled,
    OpenPalette,
    ClosePalette,
}
