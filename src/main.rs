use anyhow::Result;
use clap::Parser;
use quill::cli::{self, Cli, Commands};
use quill::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI --log-level flag takes highest precedence, then RUST_LOG, then config (applied below).
    quill::debug::init_log_bridge(cli.log_level.map(|l| l.to_level_filter()));
    log::info!("Starting quill {}", quill::VERSION);

    let (config, config_path) = match &cli.config {
        Some(path) => (Config::load_from(path)?, path.clone()),
        None => (Config::load()?, Config::config_path()),
    };
    quill::debug::apply_config_level(config.log_level);

    let config_dir = config_path
        .parent()
        .map(|dir| dir.to_path_buf())
        .unwrap_or_else(Config::config_dir);
    let overrides_path = config.overrides_path_in(&config_dir)?;
    log::debug!("Keybinding overrides file: {}", overrides_path.display());

    let command = cli.command.unwrap_or(Commands::Bindings {
        category: None,
        yaml: false,
    });
    let mut stdout = std::io::stdout().lock();
    let result = cli::run(command, &overrides_path, &mut stdout);

    if let Err(ref e) = result {
        log::error!("{e:#}");
        eprintln!("quill: error: {e:#}");
    }
    result
}
