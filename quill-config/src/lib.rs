//! Configuration system for the quill editor.
//!
//! This crate provides configuration loading, saving, and default values
//! for the editor's input layer. It includes:
//!
//! - Editor configuration (`config.yaml`) with log level, tab cycling
//!   and command palette settings
//! - The `CommandDefinition` record that makes up the command catalog
//! - Persistence of user keybinding overrides (`keybindings.yaml`)

pub mod config;
pub mod error;
pub mod overrides;
mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::ConfigError;
pub use overrides::{MemoryOverrideStore, OverrideMap, OverrideStore, YamlOverrideStore};
pub use types::{CommandDefinition, LogLevel, PaletteConfig, TabCycleConfig};
