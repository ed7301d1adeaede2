//! The input session.
//!
//! [`InputSession`] owns the keybinding registry, the binding recorder, the
//! dispatcher, the command palette, the MRU stack and the tab cycler. Every
//! key event enters through [`InputSession::handle_key`], which routes it in
//! priority order:
//!
//! 1. an active binding recorder captures everything
//! 2. releasing the held modifier commits a tab cycle (Escape cancels it)
//! 3. the dispatcher resolves the chord and runs the bound command

use crate::catalog::CommandKind;
use crate::cycle::{CycleDirection, TabCycler};
use crate::dispatcher::{ActionContext, DispatchError, DispatchResult, Dispatcher};
use crate::mru::MruStack;
use crate::palette::CommandPalette;
use crate::signal::Signal;
use crate::tabs::{TabId, TabProvider};
use quill_config::{CommandDefinition, Config, OverrideStore, PaletteConfig, TabCycleConfig};
use quill_keybindings::{
    BindingRecorder, Chord, KeyPress, ListenerStats, Modifier, RecordOutcome, RegistryError,
    ShortcutRegistry, normalize, platform,
};
use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::ModifiersState;

/// Whether a key went down or up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

impl From<ElementState> for KeyState {
    fn from(state: ElementState) -> Self {
        match state {
            ElementState::Pressed => KeyState::Pressed,
            ElementState::Released => KeyState::Released,
        }
    }
}

/// What the host should do with a key event after the session saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Not ours; deliver the key to the focused widget.
    PassThrough,
    /// A command ran; prevent the default action.
    Handled,
    /// The binding recorder consumed the key; prevent default and stop propagation.
    Captured,
}

pub struct InputSession {
    registry: ShortcutRegistry,
    recorder: BindingRecorder,
    dispatcher: Dispatcher,
    palette: CommandPalette,
    mru: MruStack,
    cycler: TabCycler,
    listeners: ListenerStats,
    tab_cycle: TabCycleConfig,
    palette_config: PaletteConfig,
    signals: Vec<Signal>,
}

impl std::fmt::Debug for InputSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSession")
            .field("commands", &self.registry.len())
            .field("recording", &self.recorder.target())
            .field("palette_visible", &self.palette.visible)
            .field("mru", &self.mru)
            .field("cycling", &self.cycler.is_active())
            .field("pending_signals", &self.signals.len())
            .finish()
    }
}

impl InputSession {
    /// Build a session over `catalog`.
    ///
    /// When a store is given its overrides are loaded now, and every later
    /// binding change is saved to it. A failed load is logged and the session
    /// starts with catalog defaults.
    pub fn new(
        catalog: &[CommandDefinition],
        config: &Config,
        store: Option<Box<dyn OverrideStore>>,
    ) -> Self {
        let mut registry = ShortcutRegistry::new();
        if let Some(store) = store {
            registry.set_store(store);
        }
        registry.register(catalog);
        registry.load_overrides();

        let listeners = ListenerStats::new();
        let dispatcher = Dispatcher::new(catalog, &listeners);
        let recorder = BindingRecorder::new(listeners.clone());

        let mut palette = CommandPalette::new();
        palette.set_entries(CommandPalette::entries_from_registry(
            &registry,
            config.palette.include_unbound,
        ));

        log::info!(
            "Input session ready: {} commands, {} overrides",
            registry.len(),
            registry.overrides().len()
        );

        Self {
            registry,
            recorder,
            dispatcher,
            palette,
            mru: MruStack::new(),
            cycler: TabCycler::new(),
            listeners,
            tab_cycle: config.tab_cycle.clone(),
            palette_config: config.palette.clone(),
            signals: Vec::new(),
        }
    }

    /// Register the handler for a catalog command.
    pub fn register_action(
        &mut self,
        command: &str,
        action: impl FnMut(&mut ActionContext) + 'static,
    ) -> Result<(), DispatchError> {
        self.dispatcher.register_action(command, action)
    }

    /// Single entry point for key events.
    pub fn handle_key(
        &mut self,
        press: &KeyPress,
        state: KeyState,
        tabs: &dyn TabProvider,
    ) -> KeyDisposition {
        if self.recorder.is_recording() {
            if state == KeyState::Pressed {
                let outcome = self.recorder.handle(press, &mut self.registry);
                self.finish_recording(outcome);
            }
            return KeyDisposition::Captured;
        }

        if state == KeyState::Released {
            if self.cycler.is_active()
                && press.modifier_key().is_some()
                && press.modifier_key() == self.cycler.held_modifier()
            {
                self.commit_cycle(tabs);
                return KeyDisposition::Handled;
            }
            return KeyDisposition::PassThrough;
        }

        let chord = normalize(press);
        if self.cycler.is_active() && chord.key() == "escape" {
            self.cycler.cancel();
            self.signals.push(Signal::CycleCancelled);
            return KeyDisposition::Handled;
        }
        if !chord.is_bindable() {
            return KeyDisposition::PassThrough;
        }

        match self.dispatcher.dispatch(&chord, &self.registry) {
            DispatchResult::Unbound => KeyDisposition::PassThrough,
            DispatchResult::Builtin(kind) => {
                self.run_builtin(kind, Some(&chord), tabs);
                KeyDisposition::Handled
            }
            DispatchResult::Invoked { .. } | DispatchResult::NoAction(_) => {
                self.run_queued_builtins(tabs);
                KeyDisposition::Handled
            }
        }
    }

    /// Route a winit keyboard event through [`handle_key`](Self::handle_key).
    pub fn handle_winit_key(
        &mut self,
        event: &KeyEvent,
        modifiers: ModifiersState,
        tabs: &dyn TabProvider,
    ) -> KeyDisposition {
        let press = platform::key_press_from_winit(&event.logical_key, modifiers);
        self.handle_key(&press, event.state.into(), tabs)
    }

    /// Run a command by id, as the palette or a menu would.
    pub fn invoke_command(&mut self, command: &str, tabs: &dyn TabProvider) -> DispatchResult {
        let result = self.dispatcher.invoke(command);
        match &result {
            DispatchResult::Builtin(kind) => self.run_builtin(*kind, None, tabs),
            _ => self.run_queued_builtins(tabs),
        }
        result
    }

    // ---------------------------------------------------------------------
    // Tabs
    // ---------------------------------------------------------------------

    /// The host made `id` the active tab.
    ///
    /// Ignored while a cycle is in progress; the commit decides the order.
    pub fn on_tab_activated(&mut self, id: TabId) {
        if self.cycler.is_active() {
            log::trace!("Ignoring activation of tab {} during tab cycle", id);
            return;
        }
        self.mru.touch(id);
    }

    pub fn on_tab_opened(&mut self, id: TabId) {
        self.mru.touch(id);
    }

    pub fn on_tab_closed(&mut self, id: TabId) {
        self.mru.remove(id);
    }

    /// Most recent tabs, up to the configured limit.
    pub fn recent_tabs(&self) -> Vec<TabId> {
        self.mru.peek(self.tab_cycle.recent_tabs_limit)
    }

    // ---------------------------------------------------------------------
    // Palette
    // ---------------------------------------------------------------------

    pub fn open_palette(&mut self) {
        self.palette.set_entries(CommandPalette::entries_from_registry(
            &self.registry,
            self.palette_config.include_unbound,
        ));
        self.palette.open();
        self.signals.push(Signal::OpenPalette);
    }

    pub fn close_palette(&mut self) {
        if self.palette.visible {
            self.palette.close();
            self.signals.push(Signal::ClosePalette);
        }
    }

    pub fn toggle_palette(&mut self) {
        if self.palette.visible {
            self.close_palette();
        } else {
            self.open_palette();
        }
    }

    pub fn set_palette_query(&mut self, query: &str) {
        self.palette.set_query(query);
    }

    pub fn move_palette_selection(&mut self, delta: i32) {
        self.palette.move_selection(delta);
    }

    /// Run the selected palette entry and close the palette.
    pub fn execute_palette(&mut self, tabs: &dyn TabProvider) -> Option<DispatchResult> {
        let command = self.palette.execute()?;
        self.signals.push(Signal::ClosePalette);
        Some(self.invoke_command(&command, tabs))
    }

    // ---------------------------------------------------------------------
    // Bindings
    // ---------------------------------------------------------------------

    /// Start recording a new chord for `command`.
    pub fn start_recording(&mut self, command: &str) -> Result<(), RegistryError> {
        if let Some(previous) = self.recorder.start(command, &self.registry)? {
            self.signals.push(Signal::RecordingFinished {
                command: previous,
                chord: None,
            });
        }
        self.signals.push(Signal::RecordingStarted {
            command: command.to_string(),
        });
        Ok(())
    }

    /// Abandon the current recording. Returns whether one was active.
    pub fn cancel_recording(&mut self) -> bool {
        match self.recorder.cancel() {
            Some(command) => {
                self.signals
                    .push(Signal::RecordingFinished { command, chord: None });
                true
            }
            None => false,
        }
    }

    pub fn set_override(&mut self, command: &str, chord: Chord) -> Result<(), RegistryError> {
        self.registry.set_override(command, chord)?;
        self.palette.refresh_chords(&self.registry);
        Ok(())
    }

    pub fn clear_override(&mut self, command: &str) -> Result<bool, RegistryError> {
        let removed = self.registry.clear_override(command)?;
        self.palette.refresh_chords(&self.registry);
        Ok(removed)
    }

    // ---------------------------------------------------------------------
    // State
    // ---------------------------------------------------------------------

    pub fn registry(&self) -> &ShortcutRegistry {
        &self.registry
    }

    pub fn palette(&self) -> &CommandPalette {
        &self.palette
    }

    pub fn mru(&self) -> &MruStack {
        &self.mru
    }

    pub fn cycler(&self) -> &TabCycler {
        &self.cycler
    }

    /// Listener bookkeeping shared by the dispatcher and the recorder.
    pub fn listeners(&self) -> &ListenerStats {
        &self.listeners
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn recording_target(&self) -> Option<&str> {
        self.recorder.target()
    }

    /// Signals queued since the last drain, oldest first.
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn finish_recording(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Committed {
                command,
                chord,
                conflicts,
            } => {
                if !conflicts.is_empty() {
                    self.signals.push(Signal::BindingConflict {
                        command: command.clone(),
                        chord: chord.clone(),
                        others: conflicts,
                    });
                }
                self.palette.refresh_chords(&self.registry);
                self.signals.push(Signal::RecordingFinished {
                    command,
                    chord: Some(chord),
                });
            }
            RecordOutcome::Cancelled { command } | RecordOutcome::Rejected { command, .. } => {
                self.signals
                    .push(Signal::RecordingFinished { command, chord: None });
            }
            RecordOutcome::Waiting | RecordOutcome::Inactive => {}
        }
    }

    fn run_queued_builtins(&mut self, tabs: &dyn TabProvider) {
        for kind in self.dispatcher.take_builtins() {
            self.run_builtin(kind, None, tabs);
        }
    }

    fn run_builtin(&mut self, kind: CommandKind, chord: Option<&Chord>, tabs: &dyn TabProvider) {
        match kind {
            CommandKind::CycleRecentTabs => self.step_cycle(CycleDirection::Forward, chord, tabs),
            CommandKind::CycleRecentTabsBack => {
                self.step_cycle(CycleDirection::Backward, chord, tabs)
            }
            CommandKind::CommandPalette => self.toggle_palette(),
            other => log::warn!("'{}' is not a session command", other.id()),
        }
    }

    fn step_cycle(&mut self, direction: CycleDirection, chord: Option<&Chord>, tabs: &dyn TabProvider) {
        let open_tabs = tabs.open_tabs();
        let open: HashSet<TabId> = open_tabs.iter().map(|tab| tab.id).collect();
        let eligible: HashSet<TabId> = open_tabs
            .iter()
            .filter(|tab| self.tab_cycle.include_pinned || !tab.is_pinned)
            .map(|tab| tab.id)
            .collect();
        self.mru.retain(|id| open.contains(&id));

        let held = chord.and_then(held_modifier);
        let Some(tab) = self
            .cycler
            .step(
                direction,
                held,
                &self.mru,
                |id| open.contains(&id),
                |id| eligible.contains(&id),
            )
        else {
            return;
        };

        let cursor = self.cycler.cursor().unwrap_or_default();
        self.signals.push(Signal::HighlightTab { tab, cursor });
        if held.is_none() {
            self.commit_cycle(tabs);
        }
    }

    fn commit_cycle(&mut self, tabs: &dyn TabProvider) {
        let open: HashSet<TabId> = tabs.open_tabs().iter().map(|tab| tab.id).collect();
        match self.cycler.commit(&mut self.mru, |id| open.contains(&id)) {
            Some(tab) => self.signals.push(Signal::ActivateTab { tab }),
            None => self.signals.push(Signal::CycleCancelled),
        }
    }
}

/// Modifier whose release ends a cycle started by `chord`.
///
/// Shift only selects direction, so it is used only when it is the sole modifier.
fn held_modifier(chord: &Chord) -> Option<Modifier> {
    let modifiers = chord.modifiers();
    modifiers
        .iter()
        .copied()
        .find(|&m| m != Modifier::Shift)
        .or_else(|| modifiers.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::tabs::TabInfo;
    use quill_config::MemoryOverrideStore;
    use quill_keybindings::{ListenerKind, parse_display};

    fn session() -> InputSession {
        InputSession::new(&default_catalog(), &Config::default(), None)
    }

    fn tabs(ids: &[TabId]) -> Vec<TabInfo> {
        ids.iter().map(|&id| TabInfo::new(id)).collect()
    }

    fn ctrl_tab() -> KeyPress {
        KeyPress::new("Tab").ctrl()
    }

    fn ctrl_up() -> KeyPress {
        KeyPress::new("Control")
    }

    #[test]
    fn test_held_modifier() {
        assert_eq!(held_modifier(&parse_display("ctrl+shift+tab").unwrap()), Some(Modifier::Ctrl));
        assert_eq!(held_modifier(&parse_display("shift+f6").unwrap()), Some(Modifier::Shift));
        assert_eq!(held_modifier(&parse_display("f6").unwrap()), None);
    }

    #[test]
    fn test_dispatcher_listener_attached_once() {
        let session = session();
        let stats = session.listeners().clone();
        assert_eq!(stats.active(ListenerKind::Dispatcher), 1);
        drop(session);
        assert_eq!(stats.active(ListenerKind::Dispatcher), 0);
    }

    #[test]
    fn test_loads_overrides_from_store() {
        let mut map = quill_config::OverrideMap::new();
        map.insert("edit.find".to_string(), "F3".to_string());
        let session = InputSession::new(
            &default_catalog(),
            &Config::default(),
            Some(Box::new(MemoryOverrideStore::with_overrides(map))),
        );
        assert_eq!(session.registry().display_string("edit.find"), "F3");
        let find = session
            .palette()
            .filtered()
            .into_iter()
            .find(|e| e.command == "edit.find")
            .map(|e| e.chord.clone());
        assert_eq!(find.as_deref(), Some("F3"));
    }

    #[test]
    fn test_cycle_commit_on_release() {
        let mut session = session();
        let open = tabs(&[1, 2, 3]);
        for id in [3, 2, 1] {
            session.on_tab_opened(id);
        }

        assert_eq!(session.handle_key(&ctrl_tab(), KeyState::Pressed, &open), KeyDisposition::Handled);
        assert_eq!(session.handle_key(&ctrl_tab(), KeyState::Pressed, &open), KeyDisposition::Handled);
        // Releasing Tab does not end the gesture
        assert_eq!(
            session.handle_key(&ctrl_tab(), KeyState::Released, &open),
            KeyDisposition::PassThrough
        );
        assert!(session.cycler().is_active());

        assert_eq!(session.handle_key(&ctrl_up(), KeyState::Released, &open), KeyDisposition::Handled);
        assert_eq!(session.mru().snapshot(), vec![3, 1, 2]);
        assert_eq!(
            session.drain_signals(),
            vec![
                Signal::HighlightTab { tab: 2, cursor: 1 },
                Signal::HighlightTab { tab: 3, cursor: 2 },
                Signal::ActivateTab { tab: 3 },
            ]
        );
    }

    #[test]
    fn test_escape_cancels_cycle() {
        let mut session = session();
        let open = tabs(&[1, 2]);
        session.on_tab_opened(2);
        session.on_tab_opened(1);

        session.handle_key(&ctrl_tab(), KeyState::Pressed, &open);
        assert_eq!(
            session.handle_key(&KeyPress::new("Escape").ctrl(), KeyState::Pressed, &open),
            KeyDisposition::Handled
        );
        assert!(!session.cycler().is_active());
        assert_eq!(session.mru().snapshot(), vec![1, 2]);
        assert_eq!(session.drain_signals().last(), Some(&Signal::CycleCancelled));
    }

    #[test]
    fn test_activation_ignored_while_cycling() {
        let mut session = session();
        let open = tabs(&[1, 2, 3]);
        for id in [3, 2, 1] {
            session.on_tab_opened(id);
        }
        session.handle_key(&ctrl_tab(), KeyState::Pressed, &open);
        session.on_tab_activated(2);
        assert_eq!(session.mru().snapshot(), vec![1, 2, 3]);
        session.handle_key(&ctrl_up(), KeyState::Released, &open);
        assert_eq!(session.mru().snapshot(), vec![2, 1, 3]);

        session.on_tab_activated(3);
        assert_eq!(session.mru().front(), Some(3));
    }

    #[test]
    fn test_pinned_tabs_excluded_when_configured() {
        let mut config = Config::default();
        config.tab_cycle.include_pinned = false;
        let mut session = InputSession::new(&default_catalog(), &config, None);
        let open = vec![TabInfo::new(1), TabInfo::new(2).pinned(), TabInfo::new(3)];
        for id in [3, 2, 1] {
            session.on_tab_opened(id);
        }

        session.handle_key(&ctrl_tab(), KeyState::Pressed, &open);
        assert_eq!(session.cycler().snapshot(), Some(&[1, 3][..]));
    }

    #[test]
    fn test_cycle_from_pinned_tab_activates_most_recent() {
        let mut config = Config::default();
        config.tab_cycle.include_pinned = false;
        let mut session = InputSession::new(&default_catalog(), &config, None);
        let open = vec![TabInfo::new(1).pinned(), TabInfo::new(2), TabInfo::new(3)];
        for id in [3, 2, 1] {
            session.on_tab_opened(id);
        }

        session.handle_key(&ctrl_tab(), KeyState::Pressed, &open);
        assert_eq!(session.cycler().snapshot(), Some(&[1, 2, 3][..]));
        assert_eq!(session.cycler().highlighted(), Some(2));

        session.handle_key(&ctrl_up(), KeyState::Released, &open);
        assert_eq!(session.mru().snapshot(), vec![2, 1, 3]);
    }

    #[test]
    fn test_cycle_from_pinned_tab_with_one_other_tab() {
        let mut config = Config::default();
        config.tab_cycle.include_pinned = false;
        let mut session = InputSession::new(&default_catalog(), &config, None);
        let open = vec![TabInfo::new(1).pinned(), TabInfo::new(2)];
        session.on_tab_opened(2);
        session.on_tab_opened(1);

        session.handle_key(&ctrl_tab(), KeyState::Pressed, &open);
        assert!(session.cycler().is_active());
        session.handle_key(&ctrl_up(), KeyState::Released, &open);
        assert_eq!(session.mru().front(), Some(2));
    }

    #[test]
    fn test_unmodified_cycle_chord_commits_immediately() {
        let mut session = session();
        session
            .set_override("tab.cycle_recent", parse_display("F6").unwrap())
            .unwrap();
        let open = tabs(&[1, 2]);
        session.on_tab_opened(2);
        session.on_tab_opened(1);

        session.handle_key(&KeyPress::new("F6"), KeyState::Pressed, &open);
        assert!(!session.cycler().is_active());
        assert_eq!(session.mru().snapshot(), vec![2, 1]);
    }

    #[test]
    fn test_palette_builtin_toggles() {
        let mut session = session();
        let open = tabs(&[]);
        let chord = session.registry().effective_chord("view.command_palette").cloned().unwrap();
        let press = press_for(&chord);

        session.handle_key(&press, KeyState::Pressed, &open);
        assert!(session.palette().visible);
        session.handle_key(&press, KeyState::Pressed, &open);
        assert!(!session.palette().visible);
        assert_eq!(session.drain_signals(), vec![Signal::OpenPalette, Signal::ClosePalette]);
    }

    #[test]
    fn test_set_override_refreshes_palette() {
        let mut session = session();
        session
            .set_override("transform.uppercase", parse_display("Alt+U").unwrap())
            .unwrap();
        let chord = session
            .palette()
            .filter("uppercase")
            .first()
            .map(|e| e.chord.clone());
        assert_eq!(chord.as_deref(), Some("Alt+U"));

        assert_eq!(session.clear_override("transform.uppercase"), Ok(true));
        assert_eq!(
            session.palette().filter("uppercase").first().map(|e| e.chord.as_str()),
            Some("")
        );
    }

    /// A key press that normalizes to `chord`.
    fn press_for(chord: &Chord) -> KeyPress {
        let mut press = KeyPress::new(chord.key());
        for modifier in chord.modifiers() {
            press = match modifier {
                Modifier::Ctrl => press.ctrl(),
                Modifier::Alt => press.alt(),
                Modifier::Shift => press.shift(),
                Modifier::Meta => press.meta(),
            };
        }
        press
    }
}
