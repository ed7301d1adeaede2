//! Shortcut registry: catalog defaults plus a user override overlay.
//!
//! The effective binding of a command is its override if one is set, else
//! its catalog default. Several commands may share an effective chord; the
//! registry keeps every collision visible and resolves a chord to the command
//! declared first in the catalog.

use crate::chord::Chord;
use crate::parser::{display_string, parse_display};
use quill_config::{CommandDefinition, OverrideMap, OverrideStore};
use std::collections::{BTreeMap, HashMap};

/// Errors reported by the override mutators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("chord for '{0}' has no bindable key")]
    UnbindableChord(String),
}

/// Registry of commands and their effective key chords.
#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    /// Catalog in declaration order
    catalog: Vec<CommandDefinition>,
    /// Parsed default chord per catalog entry
    defaults: Vec<Option<Chord>>,
    /// Command id → catalog index
    positions: HashMap<String, usize>,
    /// User overrides, command id → chord
    overrides: BTreeMap<String, Chord>,
    /// Effective chord → catalog indices, ascending
    by_chord: HashMap<Chord, Vec<usize>>,
    /// Persistence collaborator, saved to on every override change
    store: Option<Box<dyn OverrideStore>>,
}

impl ShortcutRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry that persists overrides to `store`.
    pub fn with_store(store: impl OverrideStore + 'static) -> Self {
        Self {
            store: Some(Box::new(store)),
            ..Self::default()
        }
    }

    /// Attach (or replace) the persistence collaborator.
    pub fn set_store(&mut self, store: Box<dyn OverrideStore>) {
        self.store = Some(store);
    }

    /// Replace the command catalog.
    ///
    /// Duplicate command ids keep their first declaration. Default chords
    /// that fail to parse are logged and the command is left unbound.
    pub fn register(&mut self, catalog: &[CommandDefinition]) {
        self.catalog.clear();
        self.defaults.clear();
        self.positions.clear();

        for def in catalog {
            if self.positions.contains_key(&def.command) {
                log::warn!(
                    "Duplicate command '{}' in catalog, keeping first definition",
                    def.command
                );
                continue;
            }

            let default = match def.default_chord.as_deref() {
                None => None,
                Some(text) => match parse_display(text) {
                    Ok(chord) => Some(chord),
                    Err(e) => {
                        log::warn!(
                            "Invalid default chord '{}' for command '{}': {}",
                            text,
                            def.command,
                            e
                        );
                        None
                    }
                },
            };

            self.positions
                .insert(def.command.clone(), self.catalog.len());
            self.catalog.push(def.clone());
            self.defaults.push(default);
        }

        self.overrides.retain(|command, _| {
            let known = self.positions.contains_key(command);
            if !known {
                log::warn!("Dropping override for unregistered command '{}'", command);
            }
            known
        });

        self.rebuild_index();
        log::info!(
            "Keybinding registry initialized with {} commands ({} bound chords)",
            self.catalog.len(),
            self.by_chord.len()
        );
    }

    /// Replace the override overlay.
    ///
    /// Chords shared between commands are accepted. Entries naming unknown
    /// commands or unparsable chords are logged and skipped. Does not save.
    pub fn set_overrides(&mut self, overrides: &OverrideMap) {
        self.overrides.clear();
        for (command, text) in overrides {
            if !self.positions.contains_key(command) {
                log::warn!("Ignoring override for unknown command '{}'", command);
                continue;
            }
            match parse_display(text) {
                Ok(chord) => {
                    log::debug!("Override: {} -> {}", command, chord);
                    self.overrides.insert(command.clone(), chord);
                }
                Err(e) => {
                    log::warn!(
                        "Invalid override chord '{}' for command '{}': {}",
                        text,
                        command,
                        e
                    );
                }
            }
        }
        self.rebuild_index();
    }

    /// Load the overlay from the attached store.
    ///
    /// Returns `false` when there is no store or it failed; on failure the
    /// registry keeps its current in-memory overrides.
    pub fn load_overrides(&mut self) -> bool {
        let result = match &self.store {
            Some(store) => store.load(),
            None => return false,
        };
        match result {
            Ok(map) => {
                self.set_overrides(&map);
                log::info!("Applied {} keybinding overrides", self.overrides.len());
                true
            }
            Err(e) => {
                log::error!(
                    "Failed to load keybinding overrides, continuing with in-memory bindings: {}",
                    e
                );
                false
            }
        }
    }

    /// The command bound to `chord`.
    ///
    /// When several commands share the chord, the one declared first in the
    /// catalog wins, whether its binding comes from a default or an override.
    pub fn resolve(&self, chord: &Chord) -> Option<&CommandDefinition> {
        self.by_chord
            .get(chord)
            .and_then(|indices| indices.first())
            .map(|&i| &self.catalog[i])
    }

    /// Override if set, else the catalog default.
    pub fn effective_chord(&self, command: &str) -> Option<&Chord> {
        if let Some(chord) = self.overrides.get(command) {
            return Some(chord);
        }
        self.default_chord(command)
    }

    /// The catalog default, ignoring any override.
    pub fn default_chord(&self, command: &str) -> Option<&Chord> {
        let index = *self.positions.get(command)?;
        self.defaults[index].as_ref()
    }

    /// Human-readable effective chord, e.g. `Ctrl+Shift+P`; empty when unbound.
    pub fn display_string(&self, command: &str) -> String {
        self.effective_chord(command)
            .map(display_string)
            .unwrap_or_default()
    }

    /// Bind `command` to `chord`, replacing any previous override, and save.
    pub fn set_override(&mut self, command: &str, chord: Chord) -> Result<(), RegistryError> {
        if !self.positions.contains_key(command) {
            log::warn!("Cannot override unknown command '{}'", command);
            return Err(RegistryError::UnknownCommand(command.to_string()));
        }
        if !chord.is_bindable() {
            return Err(RegistryError::UnbindableChord(command.to_string()));
        }

        log::info!("Keybinding override: {} -> {}", command, chord);
        self.overrides.insert(command.to_string(), chord);
        self.rebuild_index();
        self.persist();
        Ok(())
    }

    /// Remove the override for `command`, restoring its default, and save.
    ///
    /// Returns whether an override was present.
    pub fn clear_override(&mut self, command: &str) -> Result<bool, RegistryError> {
        if !self.positions.contains_key(command) {
            log::warn!("Cannot clear override of unknown command '{}'", command);
            return Err(RegistryError::UnknownCommand(command.to_string()));
        }

        if self.overrides.remove(command).is_none() {
            return Ok(false);
        }
        log::info!("Keybinding override cleared: {}", command);
        self.rebuild_index();
        self.persist();
        Ok(true)
    }

    /// Current overlay in its persisted form.
    pub fn overrides(&self) -> OverrideMap {
        self.overrides
            .iter()
            .map(|(command, chord)| (command.clone(), chord.as_str().to_string()))
            .collect()
    }

    /// Whether `command` has a user override.
    pub fn is_overridden(&self, command: &str) -> bool {
        self.overrides.contains_key(command)
    }

    /// Commands whose effective binding is `chord`, in catalog order.
    pub fn commands_for(&self, chord: &Chord) -> Vec<&CommandDefinition> {
        self.by_chord
            .get(chord)
            .map(|indices| indices.iter().map(|&i| &self.catalog[i]).collect())
            .unwrap_or_default()
    }

    /// Other commands sharing `command`'s effective chord.
    pub fn conflicts_for(&self, command: &str) -> Vec<&CommandDefinition> {
        let Some(chord) = self.effective_chord(command) else {
            return Vec::new();
        };
        self.commands_for(chord)
            .into_iter()
            .filter(|def| def.command != command)
            .collect()
    }

    /// Every chord bound to more than one command, ordered by the catalog
    /// position of its winning command.
    pub fn collisions(&self) -> Vec<(Chord, Vec<&CommandDefinition>)> {
        let mut shared: Vec<(&Chord, &Vec<usize>)> = self
            .by_chord
            .iter()
            .filter(|(_, indices)| indices.len() > 1)
            .collect();
        shared.sort_by_key(|(_, indices)| indices[0]);
        shared
            .into_iter()
            .map(|(chord, indices)| {
                (
                    chord.clone(),
                    indices.iter().map(|&i| &self.catalog[i]).collect(),
                )
            })
            .collect()
    }

    /// Look up a command definition.
    pub fn get(&self, command: &str) -> Option<&CommandDefinition> {
        self.positions.get(command).map(|&i| &self.catalog[i])
    }

    /// Whether `command` is in the catalog.
    pub fn contains(&self, command: &str) -> bool {
        self.positions.contains_key(command)
    }

    /// All commands in catalog order.
    pub fn commands(&self) -> &[CommandDefinition] {
        &self.catalog
    }

    /// Check if the registry has any commands.
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Get the number of registered commands.
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    fn rebuild_index(&mut self) {
        self.by_chord.clear();
        for (i, def) in self.catalog.iter().enumerate() {
            let chord = self
                .overrides
                .get(&def.command)
                .or(self.defaults[i].as_ref());
            if let Some(chord) = chord {
                self.by_chord.entry(chord.clone()).or_default().push(i);
            }
        }
    }

    fn persist(&self) {
        if let Some(store) = &self.store {
            store.save(&self.overrides());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_config::MemoryOverrideStore;

    fn chord(s: &str) -> Chord {
        parse_display(s).unwrap()
    }

    fn catalog() -> Vec<CommandDefinition> {
        vec![
            CommandDefinition::new("save", "Save", "File", Some("Ctrl+S")),
            CommandDefinition::new("search", "Search", "Edit", None),
            CommandDefinition::new("palette", "Command Palette", "View", Some("Ctrl+Shift+P")),
        ]
    }

    fn registry() -> ShortcutRegistry {
        let mut registry = ShortcutRegistry::new();
        registry.register(&catalog());
        registry
    }

    #[test]
    fn test_empty_registry() {
        let registry = ShortcutRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.resolve(&chord("Ctrl+S")).is_none());
    }

    #[test]
    fn test_register_and_resolve_defaults() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.resolve(&chord("ctrl+s")).unwrap().command, "save");
        assert_eq!(
            registry.resolve(&chord("ctrl+shift+p")).unwrap().command,
            "palette"
        );
        assert!(registry.resolve(&chord("ctrl+q")).is_none());
        assert!(registry.effective_chord("search").is_none());
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = registry();
        registry.register(&catalog());
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.resolve(&chord("ctrl+s")).unwrap().command, "save");
    }

    #[test]
    fn test_invalid_default_chord_left_unbound() {
        let mut registry = ShortcutRegistry::new();
        registry.register(&[
            CommandDefinition::new("bad", "Bad", "Misc", Some("Ctrl+Nope")),
            CommandDefinition::new("good", "Good", "Misc", Some("F5")),
        ]);
        assert_eq!(registry.len(), 2);
        assert!(registry.effective_chord("bad").is_none());
        assert_eq!(registry.effective_chord("good"), Some(&chord("f5")));
    }

    #[test]
    fn test_duplicate_command_keeps_first() {
        let mut registry = ShortcutRegistry::new();
        registry.register(&[
            CommandDefinition::new("save", "Save", "File", Some("Ctrl+S")),
            CommandDefinition::new("save", "Save Again", "File", Some("Ctrl+Alt+S")),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("save").unwrap().description, "Save");
    }

    #[test]
    fn test_set_and_clear_override() {
        let mut registry = registry();
        registry.set_override("save", chord("ctrl+alt+s")).unwrap();
        assert_eq!(registry.effective_chord("save"), Some(&chord("ctrl+alt+s")));
        assert!(registry.is_overridden("save"));
        assert!(registry.resolve(&chord("ctrl+s")).is_none());

        assert_eq!(registry.clear_override("save"), Ok(true));
        assert_eq!(registry.effective_chord("save"), registry.default_chord("save"));
        assert_eq!(registry.resolve(&chord("ctrl+s")).unwrap().command, "save");
        assert_eq!(registry.clear_override("save"), Ok(false));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let mut registry = registry();
        assert_eq!(
            registry.set_override("nope", chord("ctrl+n")),
            Err(RegistryError::UnknownCommand("nope".to_string()))
        );
        assert_eq!(
            registry.clear_override("nope"),
            Err(RegistryError::UnknownCommand("nope".to_string()))
        );
        assert!(registry.overrides().is_empty());
    }

    #[test]
    fn test_empty_chord_is_rejected() {
        let mut registry = registry();
        assert_eq!(
            registry.set_override("save", Chord::empty()),
            Err(RegistryError::UnbindableChord("save".to_string()))
        );
        assert!(!registry.is_overridden("save"));
    }

    #[test]
    fn test_shared_chord_resolves_in_catalog_order() {
        let mut registry = registry();
        registry.set_override("search", chord("ctrl+s")).unwrap();

        // "save" is declared before "search"
        assert_eq!(registry.resolve(&chord("ctrl+s")).unwrap().command, "save");
        let sharing: Vec<&str> = registry
            .commands_for(&chord("ctrl+s"))
            .iter()
            .map(|d| d.command.as_str())
            .collect();
        assert_eq!(sharing, vec!["save", "search"]);
    }

    #[test]
    fn test_catalog_order_not_override_order_decides() {
        let mut registry = ShortcutRegistry::new();
        registry.register(&[
            CommandDefinition::new("search", "Search", "Edit", None),
            CommandDefinition::new("save", "Save", "File", Some("Ctrl+S")),
        ]);
        registry.set_override("search", chord("ctrl+s")).unwrap();
        assert_eq!(registry.resolve(&chord("ctrl+s")).unwrap().command, "search");
    }

    #[test]
    fn test_conflicts_and_collisions() {
        let mut registry = registry();
        assert!(registry.collisions().is_empty());

        registry.set_override("search", chord("ctrl+s")).unwrap();
        let conflicts: Vec<&str> = registry
            .conflicts_for("search")
            .iter()
            .map(|d| d.command.as_str())
            .collect();
        assert_eq!(conflicts, vec!["save"]);

        let collisions = registry.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].0, chord("ctrl+s"));
        assert_eq!(collisions[0].1.len(), 2);
        assert!(registry.conflicts_for("palette").is_empty());
    }

    #[test]
    fn test_display_string() {
        let mut registry = registry();
        assert_eq!(registry.display_string("palette"), "Ctrl+Shift+P");
        assert_eq!(registry.display_string("search"), "");

        registry.set_override("search", chord("alt+f3")).unwrap();
        assert_eq!(registry.display_string("search"), "Alt+F3");
    }

    #[test]
    fn test_display_string_round_trips() {
        let registry = registry();
        for def in registry.commands() {
            let display = registry.display_string(&def.command);
            match registry.effective_chord(&def.command) {
                Some(effective) => assert_eq!(&parse_display(&display).unwrap(), effective),
                None => assert!(display.is_empty()),
            }
        }
    }

    #[test]
    fn test_set_overrides_replaces_and_skips_invalid() {
        let mut registry = registry();
        registry.set_override("save", chord("ctrl+alt+s")).unwrap();

        let mut map = OverrideMap::new();
        map.insert("search".to_string(), "Ctrl+F".to_string());
        map.insert("ghost".to_string(), "Ctrl+G".to_string());
        map.insert("palette".to_string(), "Ctrl+Nope".to_string());
        registry.set_overrides(&map);

        assert!(!registry.is_overridden("save"));
        assert_eq!(registry.effective_chord("search"), Some(&chord("ctrl+f")));
        assert_eq!(registry.effective_chord("palette"), Some(&chord("ctrl+shift+p")));
        assert_eq!(registry.overrides().len(), 1);
    }

    #[test]
    fn test_mutations_persist() {
        let store = MemoryOverrideStore::new();
        let observer = store.clone();
        let mut registry = ShortcutRegistry::with_store(store);
        registry.register(&catalog());

        registry.set_override("search", chord("ctrl+f")).unwrap();
        assert_eq!(observer.save_count(), 1);
        assert_eq!(
            observer.last_saved().unwrap().get("search").map(String::as_str),
            Some("ctrl+f")
        );

        registry.clear_override("search").unwrap();
        assert_eq!(observer.save_count(), 2);
        assert!(observer.last_saved().unwrap().is_empty());

        // Rejected mutations do not save
        let _ = registry.set_override("ghost", chord("ctrl+g"));
        assert_eq!(observer.save_count(), 2);
    }

    #[test]
    fn test_load_overrides_from_store() {
        let mut map = OverrideMap::new();
        map.insert("save".to_string(), "ctrl+alt+s".to_string());
        let mut registry = ShortcutRegistry::with_store(MemoryOverrideStore::with_overrides(map));
        registry.register(&catalog());

        assert!(registry.load_overrides());
        assert_eq!(registry.effective_chord("save"), Some(&chord("ctrl+alt+s")));
    }

    #[test]
    fn test_load_failure_keeps_in_memory_state() {
        let mut registry = ShortcutRegistry::with_store(MemoryOverrideStore::failing());
        registry.register(&catalog());
        registry.set_override("search", chord("ctrl+f")).unwrap();

        assert!(!registry.load_overrides());
        assert_eq!(registry.effective_chord("search"), Some(&chord("ctrl+f")));
        assert!(!ShortcutRegistry::new().load_overrides());
    }
}
