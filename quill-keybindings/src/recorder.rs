//! Live re-binding.
//!
//! [`BindingRecorder`] is `Idle` or recording a chord for one target command.
//! While recording it owns a recorder key listener that shadows dispatch: the
//! host routes every key press here first and treats it as captured.

use crate::chord::{Chord, KeyPress, normalize};
use crate::listener::{ListenerGuard, ListenerKind, ListenerStats};
use crate::platform;
use crate::registry::{RegistryError, ShortcutRegistry};

/// Result of feeding a key press to the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Not recording; the press belongs to the dispatcher.
    Inactive,
    /// The press had no bindable key (e.g. a lone modifier); still recording.
    Waiting,
    /// A chord was bound to the target command.
    Committed {
        command: String,
        chord: Chord,
        /// Other commands whose effective chord is now the same
        conflicts: Vec<String>,
    },
    /// Escape ended the session without binding anything.
    Cancelled { command: String },
    /// The registry refused the binding; the session ended.
    Rejected {
        command: String,
        error: RegistryError,
    },
}

impl RecordOutcome {
    /// Whether the press was consumed by the recorder.
    pub fn is_captured(&self) -> bool {
        !matches!(self, RecordOutcome::Inactive)
    }

    /// Whether the recording session ended with this press.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            RecordOutcome::Committed { .. }
                | RecordOutcome::Cancelled { .. }
                | RecordOutcome::Rejected { .. }
        )
    }
}

#[derive(Debug)]
struct RecordingSession {
    command: String,
    _listener: ListenerGuard,
}

/// Recording state machine. At most one session exists at a time.
#[derive(Debug)]
pub struct BindingRecorder {
    listeners: ListenerStats,
    session: Option<RecordingSession>,
}

impl BindingRecorder {
    pub fn new(listeners: ListenerStats) -> Self {
        Self {
            listeners,
            session: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Command currently being re-bound.
    pub fn target(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.command.as_str())
    }

    /// Begin recording a chord for `command`.
    ///
    /// A session already in progress is cancelled first and its command is
    /// returned. Unknown commands are rejected and leave the recorder as it was.
    pub fn start(
        &mut self,
        command: &str,
        registry: &ShortcutRegistry,
    ) -> Result<Option<String>, RegistryError> {
        if !registry.contains(command) {
            log::warn!("Cannot record binding for unknown command '{}'", command);
            return Err(RegistryError::UnknownCommand(command.to_string()));
        }

        let previous = self.cancel();
        let listener = self.listeners.attach(ListenerKind::Recorder);
        self.session = Some(RecordingSession {
            command: command.to_string(),
            _listener: listener,
        });
        log::info!("Recording keybinding for '{}'", command);
        Ok(previous)
    }

    /// End the current session without binding. Returns its command.
    pub fn cancel(&mut self) -> Option<String> {
        let session = self.session.take()?;
        log::info!("Keybinding recording cancelled for '{}'", session.command);
        Some(session.command)
    }

    /// Feed a key press to the recorder.
    ///
    /// Escape (with any modifiers) cancels. A press with a bindable key is
    /// written as an override for the target command, which also persists it.
    pub fn handle(&mut self, press: &KeyPress, registry: &mut ShortcutRegistry) -> RecordOutcome {
        let Some(target) = self.target().map(str::to_string) else {
            return RecordOutcome::Inactive;
        };

        if platform::canonical_key(&press.key).as_deref() == Some("escape") {
            self.cancel();
            return RecordOutcome::Cancelled { command: target };
        }

        let chord = normalize(press);
        if !chord.is_bindable() {
            log::trace!("Recorder ignoring press without a bindable key: {:?}", press);
            return RecordOutcome::Waiting;
        }

        // Drops the recorder listener before the registry mutation persists.
        self.session = None;
        match registry.set_override(&target, chord.clone()) {
            Ok(()) => {
                let conflicts: Vec<String> = registry
                    .conflicts_for(&target)
                    .into_iter()
                    .map(|def| def.command.clone())
                    .collect();
                if !conflicts.is_empty() {
                    log::warn!(
                        "Chord {} for '{}' is shared with: {}",
                        chord,
                        target,
                        conflicts.join(", ")
                    );
                }
                RecordOutcome::Committed {
                    command: target,
                    chord,
                    conflicts,
                }
            }
            Err(error) => {
                log::error!("Failed to bind {} to '{}': {}", chord, target, error);
                RecordOutcome::Rejected {
                    command: target,
                    error,
                }
            }
        }
    }
}
