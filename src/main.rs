//! Paper trading CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{commands, Cli, Commands};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use trading_config::{load_config_or_default, AppConfig};
use trading_monitor::{setup_file_logging, setup_logging};

const DEFAULT_LOG_FILE: &str = "logs/paper-trader.log";

fn init_logging(cli: &Cli, config: &AppConfig, dashboard: bool) -> Result<Option<WorkerGuard>> {
    let level = cli
        .log_level
        .map(|level| level.as_str())
        .unwrap_or(config.logging.level.as_str());
    let file = config.logging.file.as_deref();

    if dashboard {
        let path = file.map(PathBuf::from).unwrap_or_else(|| DEFAULT_LOG_FILE.into());
        let guard = setup_file_logging(level, &path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        return Ok(Some(guard));
    }

    setup_logging(level, cli.json_logs || config.logging.is_json(), file)
        .context("Failed to open log file")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::InitConfig => return commands::init::run(),
        Commands::ValidateConfig => return commands::validate::run(&cli.config),
        _ => {}
    }

    let config = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    config.validate().context("Invalid configuration")?;

    let dashboard = matches!(&cli.command, Commands::Run(args) if args.dashboard);
    let _guard = init_logging(&cli, &config, dashboard)?;

    match cli.command {
        Commands::Run(args) => commands::run::run(args, &config).await,
        Commands::Analyze(args) => commands::analyze::run(args, &config).await,
        Commands::Order(args) => commands::order::run(args, &config).await,
        Commands::Strategies => commands::strategies::run(&config),
        // Handled before configuration is loaded.
        Commands::InitConfig | Commands::ValidateConfig => Ok(()),
    }
}
