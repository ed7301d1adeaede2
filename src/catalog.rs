//! Built-in command catalog.
//!
//! Every command the editor ships with is a [`CommandKind`] variant. The
//! catalog handed to the registry is generated from this closed set, so ids,
//! descriptions and default chords live in one place.

use quill_config::CommandDefinition;

/// Primary shortcut modifier: Cmd on macOS, Ctrl elsewhere.
#[cfg(target_os = "macos")]
pub const PRIMARY_MODIFIER: &str = "Cmd";
#[cfg(not(target_os = "macos"))]
pub const PRIMARY_MODIFIER: &str = "Ctrl";

/// Display form of `key` under the primary modifier, e.g. `Ctrl+S`.
pub fn primary(key: &str) -> String {
    format!("{PRIMARY_MODIFIER}+{key}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    NewFile,
    OpenFile,
    Save,
    SaveAs,
    CloseTab,
    CommandPalette,
    ToggleTheme,
    NextTab,
    PreviousTab,
    CycleRecentTabs,
    CycleRecentTabsBack,
    Find,
    Replace,
    GotoLine,
    TransformUppercase,
    TransformLowercase,
    TransformTitleCase,
    TransformSortLines,
    TransformTrimWhitespace,
}

impl CommandKind {
    /// Every command, in catalog declaration order.
    pub const ALL: [CommandKind; 19] = [
        CommandKind::NewFile,
        CommandKind::OpenFile,
        CommandKind::Save,
        CommandKind::SaveAs,
        CommandKind::CloseTab,
        CommandKind::CommandPalette,
        CommandKind::ToggleTheme,
        CommandKind::NextTab,
        CommandKind::PreviousTab,
        CommandKind::CycleRecentTabs,
        CommandKind::CycleRecentTabsBack,
        CommandKind::Find,
        CommandKind::Replace,
        CommandKind::GotoLine,
        CommandKind::TransformUppercase,
        CommandKind::TransformLowercase,
        CommandKind::TransformTitleCase,
        CommandKind::TransformSortLines,
        CommandKind::TransformTrimWhitespace,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CommandKind::NewFile => "file.new",
            CommandKind::OpenFile => "file.open",
            CommandKind::Save => "file.save",
            CommandKind::SaveAs => "file.save_as",
            CommandKind::CloseTab => "file.close_tab",
            CommandKind::CommandPalette => "view.command_palette",
            CommandKind::ToggleTheme => "view.toggle_theme",
            CommandKind::NextTab => "tab.next",
            CommandKind::PreviousTab => "tab.previous",
            CommandKind::CycleRecentTabs => "tab.cycle_recent",
            CommandKind::CycleRecentTabsBack => "tab.cycle_recent_back",
            CommandKind::Find => "edit.find",
            CommandKind::Replace => "edit.replace",
            CommandKind::GotoLine => "edit.goto_line",
            CommandKind::TransformUppercase => "transform.uppercase",
            CommandKind::TransformLowercase => "transform.lowercase",
            CommandKind::TransformTitleCase => "transform.title_case",
            CommandKind::TransformSortLines => "transform.sort_lines",
            CommandKind::TransformTrimWhitespace => "transform.trim_whitespace",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CommandKind::NewFile => "New File",
            CommandKind::OpenFile => "Open File...",
            CommandKind::Save => "Save",
            CommandKind::SaveAs => "Save As...",
            CommandKind::CloseTab => "Close Tab",
            CommandKind::CommandPalette => "Show Command Palette",
            CommandKind::ToggleTheme => "Toggle Light/Dark Theme",
            CommandKind::NextTab => "Next Tab",
            CommandKind::PreviousTab => "Previous Tab",
            CommandKind::CycleRecentTabs => "Cycle Recent Tabs",
            CommandKind::CycleRecentTabsBack => "Cycle Recent Tabs Backward",
            CommandKind::Find => "Find",
            CommandKind::Replace => "Replace",
            CommandKind::GotoLine => "Go to Line...",
            CommandKind::TransformUppercase => "Uppercase",
            CommandKind::TransformLowercase => "Lowercase",
            CommandKind::TransformTitleCase => "Title Case",
            CommandKind::TransformSortLines => "Sort Lines",
            CommandKind::TransformTrimWhitespace => "Trim Trailing Whitespace",
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            CommandKind::NewFile
            | CommandKind::OpenFile
            | CommandKind::Save
            | CommandKind::SaveAs
            | CommandKind::CloseTab => "File",
            CommandKind::CommandPalette | CommandKind::ToggleTheme => "View",
            CommandKind::NextTab
            | CommandKind::PreviousTab
            | CommandKind::CycleRecentTabs
            | CommandKind::CycleRecentTabsBack => "Tabs",
            CommandKind::Find | CommandKind::Replace | CommandKind::GotoLine => "Edit",
            CommandKind::TransformUppercase
            | CommandKind::TransformLowercase
            | CommandKind::TransformTitleCase
            | CommandKind::TransformSortLines
            | CommandKind::TransformTrimWhitespace => "Transform",
        }
    }

    /// Default chord in display form. Text transforms ship unbound.
    pub fn default_chord(self) -> Option<String> {
        let chord = match self {
            CommandKind::NewFile => primary("N"),
            CommandKind::OpenFile => primary("O"),
            CommandKind::Save => primary("S"),
            CommandKind::SaveAs => primary("Shift+S"),
            CommandKind::CloseTab => primary("W"),
            CommandKind::CommandPalette => primary("Shift+P"),
            CommandKind::NextTab => primary("PageDown"),
            CommandKind::PreviousTab => primary("PageUp"),
            // Ctrl on every platform, matching other editors on macOS
            CommandKind::CycleRecentTabs => "Ctrl+Tab".to_string(),
            CommandKind::CycleRecentTabsBack => "Ctrl+Shift+Tab".to_string(),
            CommandKind::Find => primary("F"),
            #[cfg(target_os = "macos")]
            CommandKind::Replace => "Cmd+Alt+F".to_string(),
            #[cfg(not(target_os = "macos"))]
            CommandKind::Replace => "Ctrl+H".to_string(),
            CommandKind::GotoLine => "Ctrl+G".to_string(),
            CommandKind::ToggleTheme
            | CommandKind::TransformUppercase
            | CommandKind::TransformLowercase
            | CommandKind::TransformTitleCase
            | CommandKind::TransformSortLines
            | CommandKind::TransformTrimWhitespace => return None,
        };
        Some(chord)
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Commands run by the input session itself rather than an action handler.
    pub fn is_builtin(self) -> bool {
        matches!(
            self,
            CommandKind::CommandPalette
                | CommandKind::CycleRecentTabs
                | CommandKind::CycleRecentTabsBack
        )
    }

    pub fn definition(self) -> CommandDefinition {
        CommandDefinition::new(
            self.id(),
            self.description(),
            self.category(),
            self.default_chord().as_deref(),
        )
    }
}

/// The built-in catalog, in declaration order.
pub fn default_catalog() -> Vec<CommandDefinition> {
    CommandKind::ALL.into_iter().map(CommandKind::definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_keybindings::parse_display;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<&str> = CommandKind::ALL.iter().map(|k| k.id()).collect();
        assert_eq!(ids.len(), CommandKind::ALL.len());
    }

    #[test]
    fn test_from_id_round_trips() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(CommandKind::from_id("file.nope"), None);
    }

    #[test]
    fn test_default_chords_parse() {
        for kind in CommandKind::ALL {
            if let Some(chord) = kind.default_chord() {
                assert!(parse_display(&chord).is_ok(), "{} has bad chord {}", kind.id(), chord);
            }
        }
    }

    #[test]
    fn test_default_chords_do_not_collide() {
        let mut seen = HashSet::new();
        for kind in CommandKind::ALL {
            if let Some(chord) = kind.default_chord() {
                assert!(seen.insert(parse_display(&chord).unwrap()), "duplicate default {}", chord);
            }
        }
    }

    #[test]
    fn test_builtins() {
        assert!(CommandKind::CycleRecentTabs.is_builtin());
        assert!(CommandKind::CommandPalette.is_builtin());
        assert!(!CommandKind::Save.is_builtin());
    }

    #[test]
    fn test_catalog_order() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), CommandKind::ALL.len());
        assert_eq!(catalog[0].command, "file.new");
        assert_eq!(catalog[2].label(), "File: Save");
        assert!(catalog.iter().any(|def| def.category == "Transform" && def.default_chord.is_none()));
    }
}
