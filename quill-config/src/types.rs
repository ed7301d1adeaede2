//! Plain data types shared by the quill crates.

use serde::{Deserialize, Serialize};

/// A command known to the editor, as declared in the static catalog.
///
/// Definitions are built once at startup and never mutated. The default
/// chord is kept as text (`"Ctrl+S"` or `"ctrl+s"`); the keybinding registry
/// parses it when the catalog is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Unique command id, e.g. "file.save"
    pub command: String,
    /// Human-readable description, e.g. "Save"
    pub description: String,
    /// Category shown as the palette label prefix, e.g. "File"
    pub category: String,
    /// Default key chord, if the command ships with one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_chord: Option<String>,
}

impl CommandDefinition {
    /// Create a new definition.
    pub fn new(
        command: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        default_chord: Option<&str>,
    ) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
            category: category.into(),
            default_chord: default_chord.map(str::to_string),
        }
    }

    /// Palette label, e.g. "File: Save".
    pub fn label(&self) -> String {
        if self.category.is_empty() {
            self.description.clone()
        } else {
            format!("{}: {}", self.category, self.description)
        }
    }
}

/// Log level for the debug log file.
///
/// Controls the verbosity of log output written to the debug log file.
/// `RUST_LOG` and the `--log-level` CLI flag take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging (log file not created)
    #[default]
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            LogLevel::Off => "Off",
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to the `log` crate's filter.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// Parse a level name as accepted by `--log-level` and `RUST_LOG`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Settings for MRU tab cycling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabCycleConfig {
    /// Whether pinned tabs take part in MRU cycling
    #[serde(default = "default_true")]
    pub include_pinned: bool,
    /// Number of entries returned for "recent tabs" listings
    #[serde(default = "default_recent_tabs_limit")]
    pub recent_tabs_limit: usize,
}

impl Default for TabCycleConfig {
    fn default() -> Self {
        Self {
            include_pinned: true,
            recent_tabs_limit: default_recent_tabs_limit(),
        }
    }
}

/// Settings for the command palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// List commands that have no key chord
    #[serde(default = "default_true")]
    pub include_unbound: bool,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            include_unbound: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_recent_tabs_limit() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_with_category() {
        let def = CommandDefinition::new("file.save", "Save", "File", Some("Ctrl+S"));
        assert_eq!(def.label(), "File: Save");
        assert_eq!(def.default_chord.as_deref(), Some("Ctrl+S"));
    }

    #[test]
    fn test_label_without_category() {
        let def = CommandDefinition::new("misc", "Do Thing", "", None);
        assert_eq!(def.label(), "Do Thing");
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse(" warning "), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
        assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
    }

    #[test]
    fn test_definition_yaml_omits_missing_chord() {
        let def = CommandDefinition::new("transform.upper", "Uppercase", "Transform", None);
        let yaml = serde_yaml_ng::to_string(&def).unwrap();
        assert!(!yaml.contains("default_chord"));
        let back: CommandDefinition = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, def);
    }
}
