//! Unified logging for quill
//!
//! Every crate logs through the `log` facade. The bridge installed here
//! writes those records to /tmp/quill_debug.log on Unix/macOS, or
//! %TEMP%\quill_debug.log on Windows, so diagnostic output never mixes with
//! CLI output on stdout.
//!
//! Level precedence: `--log-level` flag, then `RUST_LOG`, then the config
//! file's `log_level`. When `RUST_LOG` is set records are mirrored to stderr.

use parking_lot::Mutex;
use quill_config::LogLevel;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Where the level in effect came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSource {
    Cli,
    Env,
    Config,
}

struct LogBridge {
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
    source: Mutex<LevelSource>,
}

impl LogBridge {
    fn write_line(&self, line: &str) {
        let mut file = self.file.lock();
        if file.is_none() {
            *file = open_log_file();
        }
        if let Some(f) = file.as_mut() {
            let _ = f.write_all(line.as_bytes());
            let _ = f.flush();
        }
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        self.write_line(&line);
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(f) = self.file.lock().as_mut() {
            let _ = f.flush();
        }
    }
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

/// Path of the debug log file
pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    let log_path = PathBuf::from("/tmp/quill_debug.log");
    #[cfg(not(unix))]
    let log_path = std::env::temp_dir().join("quill_debug.log");
    log_path
}

fn open_log_file() -> Option<File> {
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(log_path())
        // Silently fail if the log file can't be opened
        .ok()?;
    let _ = file.write_all(
        format!(
            "\n{}\nquill debug session started at {}\n{}\n",
            "=".repeat(80),
            get_timestamp(),
            "=".repeat(80)
        )
        .as_bytes(),
    );
    Some(file)
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Parse a `RUST_LOG` value into a single level.
///
/// Accepts a bare level (`debug`) or a directive list (`quill=debug,winit=warn`),
/// in which case the most verbose level wins. Anything unparsable means `info`.
pub fn parse_env_level(value: &str) -> log::LevelFilter {
    let levels: Vec<log::LevelFilter> = value
        .split(',')
        .filter_map(|directive| {
            let level = directive.rsplit('=').next()?.trim();
            log::LevelFilter::from_str(level).ok()
        })
        .collect();
    levels.into_iter().max().unwrap_or(log::LevelFilter::Info)
}

/// Pick the level in effect.
pub fn resolve_level(
    cli: Option<log::LevelFilter>,
    env: Option<&str>,
    config: LogLevel,
) -> (log::LevelFilter, LevelSource) {
    if let Some(level) = cli {
        return (level, LevelSource::Cli);
    }
    if let Some(value) = env.filter(|v| !v.trim().is_empty()) {
        return (parse_env_level(value), LevelSource::Env);
    }
    (config.to_level_filter(), LevelSource::Config)
}

/// Install the log bridge. Call once, before anything logs.
///
/// Until the config is loaded the level comes from the CLI flag or
/// `RUST_LOG`; otherwise logging stays off.
pub fn init_log_bridge(cli_level: Option<log::LevelFilter>) {
    let env = std::env::var("RUST_LOG").ok();
    let (level, source) = resolve_level(cli_level, env.as_deref(), LogLevel::Off);

    let bridge = BRIDGE.get_or_init(|| LogBridge {
        file: Mutex::new(None),
        mirror_stderr: env.is_some(),
        source: Mutex::new(source),
    });
    *bridge.source.lock() = source;

    if log::set_logger(bridge).is_ok() {
        log::set_max_level(level);
    }
}

/// Apply the config file's level, unless the CLI flag or `RUST_LOG` already set one.
pub fn apply_config_level(level: LogLevel) {
    let Some(bridge) = BRIDGE.get() else {
        return;
    };
    if *bridge.source.lock() != LevelSource::Config {
        return;
    }
    log::set_max_level(level.to_level_filter());
    log::debug!("Log level set from config: {}", level.display_name());
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn test_cli_wins() {
        let (level, source) = resolve_level(Some(LevelFilter::Warn), Some("trace"), LogLevel::Debug);
        assert_eq!(level, LevelFilter::Warn);
        assert_eq!(source, LevelSource::Cli);
    }

    #[test]
    fn test_env_beats_config() {
        let (level, source) = resolve_level(None, Some("debug"), LogLevel::Error);
        assert_eq!(level, LevelFilter::Debug);
        assert_eq!(source, LevelSource::Env);
    }

    #[test]
    fn test_config_fallback() {
        assert_eq!(
            resolve_level(None, None, LogLevel::Info),
            (LevelFilter::Info, LevelSource::Config)
        );
        assert_eq!(
            resolve_level(None, Some("  "), LogLevel::Off),
            (LevelFilter::Off, LevelSource::Config)
        );
    }

    #[test]
    fn test_parse_env_level() {
        assert_eq!(parse_env_level("TRACE"), LevelFilter::Trace);
        assert_eq!(parse_env_level("quill=debug,winit=warn"), LevelFilter::Debug);
        assert_eq!(parse_env_level("quill_keybindings"), LevelFilter::Info);
        assert_eq!(parse_env_level("garbage=???"), LevelFilter::Info);
    }
}
