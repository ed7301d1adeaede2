//! Command palette state.
//!
//! Holds the palette entries, the current query and the selection. Rendering
//! is left to the host; the session emits open/close signals.

use quill_keybindings::ShortcutRegistry;

/// One row of the palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub command: String,
    /// "Category: Description"
    pub label: String,
    /// Display chord, empty when unbound
    pub chord: String,
}

/// Command palette manager
#[derive(Debug, Default)]
pub struct CommandPalette {
    /// Whether the palette is currently visible
    pub visible: bool,

    entries: Vec<PaletteEntry>,

    /// Current search query
    query: String,

    /// Indices into `entries` that match the query, in catalog order
    filtered: Vec<usize>,

    /// Index of currently selected entry in filtered results
    selected_index: Option<usize>,
}

impl CommandPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build entries for every registered command.
    pub fn entries_from_registry(
        registry: &ShortcutRegistry,
        include_unbound: bool,
    ) -> Vec<PaletteEntry> {
        registry
            .commands()
            .iter()
            .map(|def| PaletteEntry {
                command: def.command.clone(),
                label: def.label(),
                chord: registry.display_string(&def.command),
            })
            .filter(|entry| include_unbound || !entry.chord.is_empty())
            .collect()
    }

    /// Replace the entries, keeping the query.
    pub fn set_entries(&mut self, entries: Vec<PaletteEntry>) {
        self.entries = entries;
        self.refilter();
    }

    /// Update displayed chords after bindings change.
    pub fn refresh_chords(&mut self, registry: &ShortcutRegistry) {
        for entry in &mut self.entries {
            entry.chord = registry.display_string(&entry.command);
        }
    }

    /// Open the palette with an empty query
    pub fn open(&mut self) {
        self.visible = true;
        self.query.clear();
        self.refilter();
    }

    /// Close the palette
    pub fn close(&mut self) {
        self.visible = false;
        self.query.clear();
        self.selected_index = None;
    }

    /// Toggle visibility, returning the new state.
    pub fn toggle(&mut self) -> bool {
        if self.visible {
            self.close();
        } else {
            self.open();
        }
        self.visible
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Change the query. The selection returns to the first match.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    /// Entries whose label contains `query`, ignoring case, in original order.
    pub fn filter(&self, query: &str) -> Vec<&PaletteEntry> {
        self.matching(query).map(|i| &self.entries[i]).collect()
    }

    /// Entries matching the current query.
    pub fn filtered(&self) -> Vec<&PaletteEntry> {
        self.filtered.iter().map(|&i| &self.entries[i]).collect()
    }

    /// Move the selection by `delta`, wrapping at both ends.
    pub fn move_selection(&mut self, delta: i32) {
        let len = self.filtered.len();
        if len == 0 {
            self.selected_index = None;
            return;
        }
        let current = self.selected_index.unwrap_or(0) as i64;
        self.selected_index = Some((current + i64::from(delta)).rem_euclid(len as i64) as usize);
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&PaletteEntry> {
        let index = self.selected_index?;
        self.filtered.get(index).map(|&i| &self.entries[i])
    }

    /// Take the selected command and close the palette.
    ///
    /// With nothing selected this does nothing and returns `None`.
    pub fn execute(&mut self) -> Option<String> {
        let command = self.selected()?.command.clone();
        log::debug!("Palette executing '{}'", command);
        self.close();
        Some(command)
    }

    fn matching<'a>(&'a self, query: &str) -> impl Iterator<Item = usize> + 'a {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, entry)| needle.is_empty() || entry.label.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
    }

    fn refilter(&mut self) {
        self.filtered = self.matching(&self.query).collect();
        self.selected_index = if self.filtered.is_empty() {
            None
        } else {
            Some(0)
        };
    }
}
