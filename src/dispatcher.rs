//! Command dispatch.
//!
//! The dispatcher owns the global key listener and the action table. A chord
//! resolves through the registry to a command id; the id is looked up in the
//! table built at startup and its handler runs once. Handlers queue follow-up
//! commands through [`ActionContext`], and those run after the handler
//! returns, one at a time, never re-entering dispatch.

use crate::catalog::CommandKind;
use quill_config::CommandDefinition;
use quill_keybindings::{Chord, ListenerGuard, ListenerKind, ListenerStats, ShortcutRegistry};
use std::collections::{HashMap, HashSet, VecDeque};

/// Most follow-up commands one key event may run.
pub const MAX_FOLLOW_UPS: usize = 64;

/// Handler for a command
pub type Action = Box<dyn FnMut(&mut ActionContext)>;

/// Passed to a running action.
#[derive(Debug)]
pub struct ActionContext {
    command: String,
    queued: Vec<String>,
}

impl ActionContext {
    fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            queued: Vec::new(),
        }
    }

    /// Id of the command being run.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run `command` after this action returns.
    pub fn trigger(&mut self, command: impl Into<String>) {
        self.queued.push(command.into());
    }
}

/// Outcome of dispatching one key chord or command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// No command is bound to the chord; the key passes through.
    Unbound,
    /// The command's action ran, followed by `follow_ups` queued commands.
    Invoked { command: String, follow_ups: usize },
    /// The command is handled by the input session.
    Builtin(CommandKind),
    /// The command is bound but has no registered action.
    NoAction(String),
}

impl DispatchResult {
    /// Whether the key event was consumed.
    pub fn is_handled(&self) -> bool {
        !matches!(self, DispatchResult::Unbound)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("command '{0}' is handled by the input session")]
    Builtin(String),
}

pub struct Dispatcher {
    actions: HashMap<String, Action>,
    commands: HashSet<String>,
    builtins: HashMap<String, CommandKind>,
    /// Built-in commands queued as follow-ups, for the session to run
    pending_builtins: Vec<CommandKind>,
    _listener: ListenerGuard,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut actions: Vec<&String> = self.actions.keys().collect();
        actions.sort();
        f.debug_struct("Dispatcher")
            .field("actions", &actions)
            .field("commands", &self.commands.len())
            .field("pending_builtins", &self.pending_builtins)
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher for `catalog`, attaching its key listener.
    pub fn new(catalog: &[CommandDefinition], listeners: &ListenerStats) -> Self {
        let commands: HashSet<String> = catalog.iter().map(|def| def.command.clone()).collect();
        let builtins = catalog
            .iter()
            .filter_map(|def| CommandKind::from_id(&def.command))
            .filter(|kind| kind.is_builtin())
            .map(|kind| (kind.id().to_string(), kind))
            .collect();

        Self {
            actions: HashMap::new(),
            commands,
            builtins,
            pending_builtins: Vec::new(),
            _listener: listeners.attach(ListenerKind::Dispatcher),
        }
    }

    /// Register the handler for `command`, replacing any previous one.
    pub fn register_action(
        &mut self,
        command: &str,
        action: impl FnMut(&mut ActionContext) + 'static,
    ) -> Result<(), DispatchError> {
        if !self.commands.contains(command) {
            return Err(DispatchError::UnknownCommand(command.to_string()));
        }
        if self.builtins.contains_key(command) {
            return Err(DispatchError::Builtin(command.to_string()));
        }
        if self
            .actions
            .insert(command.to_string(), Box::new(action))
            .is_some()
        {
            log::debug!("Replaced action for '{}'", command);
        }
        Ok(())
    }

    pub fn has_action(&self, command: &str) -> bool {
        self.actions.contains_key(command)
    }

    /// Resolve `chord` and run the bound command.
    pub fn dispatch(&mut self, chord: &Chord, registry: &ShortcutRegistry) -> DispatchResult {
        let Some(def) = registry.resolve(chord) else {
            return DispatchResult::Unbound;
        };
        let command = def.command.clone();
        log::debug!("Dispatching {} -> {}", chord, command);
        self.invoke(&command)
    }

    /// Run `command` and any follow-ups it queues.
    pub fn invoke(&mut self, command: &str) -> DispatchResult {
        if let Some(&kind) = self.builtins.get(command) {
            return DispatchResult::Builtin(kind);
        }
        if !self.actions.contains_key(command) {
            log::debug!("No action registered for '{}'", command);
            return DispatchResult::NoAction(command.to_string());
        }

        let mut queue = VecDeque::from([command.to_string()]);
        let mut ran = 0usize;
        while let Some(next) = queue.pop_front() {
            if ran > MAX_FOLLOW_UPS {
                log::warn!(
                    "Follow-up limit reached while running '{}', dropping {} queued command(s)",
                    command,
                    queue.len() + 1
                );
                break;
            }
            if let Some(&kind) = self.builtins.get(&next) {
                self.pending_builtins.push(kind);
                continue;
            }
            let Some(action) = self.actions.get_mut(&next) else {
                log::warn!("Follow-up '{}' has no registered action", next);
                continue;
            };
            let mut ctx = ActionContext::new(&next);
            action(&mut ctx);
            ran += 1;
            queue.extend(ctx.queued);
        }

        DispatchResult::Invoked {
            command: command.to_string(),
            follow_ups: ran.saturating_sub(1),
        }
    }

    /// Built-in commands queued by actions since the last call.
    pub fn take_builtins(&mut self) -> Vec<CommandKind> {
        std::mem::take(&mut self.pending_builtins)
    }
}
