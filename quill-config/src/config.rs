//! The editor configuration file.
//!
//! Covers loading, saving and path resolution for `config.yaml`, plus the
//! location of the keybinding overrides file next to it.

use crate::error::ConfigError;
use crate::types::{LogLevel, PaletteConfig, TabCycleConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Input-layer configuration loaded from `~/.config/quill/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Verbosity of the debug log file
    #[serde(default)]
    pub log_level: LogLevel,

    /// Keybinding overrides file, relative to the config directory
    #[serde(default = "default_keybindings_file")]
    pub keybindings_file: String,

    /// MRU tab cycling settings
    #[serde(default)]
    pub tab_cycle: TabCycleConfig,

    /// Command palette settings
    #[serde(default)]
    pub palette: PaletteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            keybindings_file: default_keybindings_file(),
            tab_cycle: TabCycleConfig::default(),
            palette: PaletteConfig::default(),
        }
    }
}

fn default_keybindings_file() -> String {
    "keybindings.yaml".to_string()
}

impl Config {
    /// Load configuration from the default path, creating it if missing.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            log::info!("Loading config from {:?}", config_path);
            Ok(Self::load_from(&config_path)?)
        } else {
            log::info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            if let Err(e) = config.save() {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            Ok(config)
        }
    }

    /// Load and validate configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml_ng::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())?;
        Ok(())
    }

    /// Save configuration to a specific file.
    ///
    /// Atomic save: write to a temp file then rename to prevent corruption on crash.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml_ng::to_string(self)?;
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Check field values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_cycle.recent_tabs_limit == 0 {
            return Err(ConfigError::Validation(
                "tab_cycle.recent_tabs_limit must be at least 1".to_string(),
            ));
        }
        if self.keybindings_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "keybindings_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the configuration directory (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("quill")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // Use XDG convention on all platforms: ~/.config/quill
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("quill")
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Resolve the keybinding overrides file inside `base`.
    ///
    /// The configured name must be relative and must not climb out of the
    /// config directory through `..` components.
    pub fn overrides_path_in(&self, base: &Path) -> Result<PathBuf, ConfigError> {
        let name = Path::new(&self.keybindings_file);
        let escapes = name.is_absolute()
            || name
                .components()
                .any(|c| {
                    matches!(
                        c,
                        Component::ParentDir | Component::RootDir | Component::Prefix(_)
                    )
                });
        if escapes {
            return Err(ConfigError::PathTraversal {
                file: self.keybindings_file.clone(),
                base: base.to_path_buf(),
            });
        }
        Ok(base.join(name))
    }

    /// Resolve the keybinding overrides file in the default config directory.
    pub fn overrides_path(&self) -> Result<PathBuf, ConfigError> {
        self.overrides_path_in(&Self::config_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, LogLevel::Off);
        assert_eq!(config.keybindings_file, "keybindings.yaml");
        assert!(config.tab_cycle.include_pinned);
        assert_eq!(config.tab_cycle.recent_tabs_limit, 10);
        assert!(config.palette.include_unbound);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "log_level: debug\ntab_cycle:\n  include_pinned: false\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.tab_cycle.include_pinned);
        assert_eq!(config.tab_cycle.recent_tabs_limit, 10);
        assert_eq!(config.keybindings_file, "keybindings.yaml");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.log_level = LogLevel::Info;
        config.tab_cycle.recent_tabs_limit = 4;
        config.save_to(&path).unwrap();

        assert!(!path.with_extension("yaml.tmp").exists());
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_zero_recent_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "tab_cycle:\n  recent_tabs_limit: 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "log_level: [unterminated").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_overrides_path_stays_in_base() {
        let base = Path::new("/home/user/.config/quill");
        let config = Config::default();
        assert_eq!(
            config.overrides_path_in(base).unwrap(),
            base.join("keybindings.yaml")
        );

        let config = Config {
            keybindings_file: "../../etc/passwd".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.overrides_path_in(base),
            Err(ConfigError::PathTraversal { .. })
        ));

        let config = Config {
            keybindings_file: "/tmp/keys.yaml".to_string(),
            ..Config::default()
        };
        assert!(config.overrides_path_in(base).is_err());
    }
}
