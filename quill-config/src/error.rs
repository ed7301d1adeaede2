//! Errors from reading and writing `config.yaml` and the keybinding overrides file.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed YAML: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A value serde accepted but quill cannot use
    #[error("invalid setting: {0}")]
    Validation(String),

    #[error("keybindings_file '{file}' points outside {}", base.display())]
    PathTraversal { file: String, base: PathBuf },
}
