//! Command-line interface for quill.
//!
//! Inspects and edits keybindings without starting the editor. Every
//! subcommand works on the built-in catalog merged with the user's
//! overrides file.

use crate::catalog::default_catalog;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quill_config::YamlOverrideStore;
use quill_keybindings::{Chord, ShortcutRegistry, display_string, parse_display};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// quill - keybindings and command dispatch for the quill editor
#[derive(Parser)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Use this config file instead of ~/.config/quill/config.yaml
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List commands with their effective chords
    Bindings {
        /// Only show commands in this category
        #[arg(long)]
        category: Option<String>,

        /// Print as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Bind a command to a chord, e.g. `quill bind edit.find Ctrl+Shift+F`
    Bind { command: String, chord: String },

    /// Remove a command's override, restoring its default chord
    Unbind { command: String },

    /// Show which command a chord runs
    Resolve { chord: String },

    /// List chords shared by more than one command
    Conflicts,
}

/// One row of `quill bindings`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingRow {
    pub command: String,
    pub category: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chord: Option<String>,
    pub overridden: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shared_with: Vec<String>,
}

/// Build a registry over the built-in catalog, saving to `overrides_path`.
pub fn open_registry(overrides_path: &Path) -> ShortcutRegistry {
    let mut registry = ShortcutRegistry::with_store(YamlOverrideStore::blocking(overrides_path));
    registry.register(&default_catalog());
    registry.load_overrides();
    registry
}

/// Rows for `quill bindings`, optionally limited to one category.
pub fn binding_rows(registry: &ShortcutRegistry, category: Option<&str>) -> Vec<BindingRow> {
    registry
        .commands()
        .iter()
        .filter(|def| category.is_none_or(|c| def.category.eq_ignore_ascii_case(c)))
        .map(|def| BindingRow {
            command: def.command.clone(),
            category: def.category.clone(),
            description: def.description.clone(),
            chord: registry.effective_chord(&def.command).map(display_string),
            overridden: registry.is_overridden(&def.command),
            shared_with: registry
                .conflicts_for(&def.command)
                .into_iter()
                .map(|other| other.command.clone())
                .collect(),
        })
        .collect()
}

fn format_row(row: &BindingRow) -> String {
    let mut line = format!(
        "{:<28} {:<18} {}",
        row.command,
        row.chord.as_deref().unwrap_or("-"),
        row.description
    );
    if row.overridden {
        line.push_str(" (custom)");
    }
    if !row.shared_with.is_empty() {
        line.push_str(&format!(" [shared with {}]", row.shared_with.join(", ")));
    }
    line
}

fn parse_chord(text: &str) -> Result<Chord> {
    parse_display(text).with_context(|| format!("Invalid chord '{text}'"))
}

/// Run a subcommand, writing human-readable output to `out`.
pub fn run(command: Commands, overrides_path: &Path, out: &mut impl Write) -> Result<()> {
    let mut registry = open_registry(overrides_path);

    match command {
        Commands::Bindings { category, yaml } => {
            let rows = binding_rows(&registry, category.as_deref());
            if yaml {
                write!(out, "{}", serde_yaml_ng::to_string(&rows)?)?;
            } else {
                for row in &rows {
                    writeln!(out, "{}", format_row(row))?;
                }
            }
        }
        Commands::Bind { command, chord } => {
            let chord = parse_chord(&chord)?;
            registry.set_override(&command, chord.clone())?;
            writeln!(out, "Bound {} to {}", command, display_string(&chord))?;
            let shared: Vec<String> = registry
                .conflicts_for(&command)
                .into_iter()
                .map(|def| def.command.clone())
                .collect();
            if !shared.is_empty() {
                writeln!(out, "Warning: {} is also bound to {}", display_string(&chord), shared.join(", "))?;
            }
        }
        Commands::Unbind { command } => {
            if registry.clear_override(&command)? {
                let restored = registry.display_string(&command);
                if restored.is_empty() {
                    writeln!(out, "Removed override for {}; it is now unbound", command)?;
                } else {
                    writeln!(out, "Restored {} to {}", command, restored)?;
                }
            } else {
                writeln!(out, "{} has no override", command)?;
            }
        }
        Commands::Resolve { chord } => {
            let chord = parse_chord(&chord)?;
            let commands = registry.commands_for(&chord);
            match commands.split_first() {
                Some((winner, shadowed)) => {
                    writeln!(out, "{} -> {}", display_string(&chord), winner.command)?;
                    for def in shadowed {
                        writeln!(out, "  (also bound: {})", def.command)?;
                    }
                }
                None => writeln!(out, "{} is not bound", display_string(&chord))?,
            }
        }
        Commands::Conflicts => {
            let collisions = registry.collisions();
            if collisions.is_empty() {
                writeln!(out, "No conflicts")?;
            }
            for (chord, defs) in collisions {
                let names: Vec<&str> = defs.iter().map(|def| def.command.as_str()).collect();
                writeln!(out, "{}: {}", display_string(&chord), names.join(", "))?;
            }
        }
    }
    Ok(())
}
