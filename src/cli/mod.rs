//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use trading_core::types::Side;

#[derive(Parser)]
#[command(name = "trading")]
#[command(author, version, about = "Paper-trading simulator driven by fundamental and technical screens")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "TRADING_CONFIG")]
    pub config: PathBuf,

    /// Log level (overrides the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run automated paper trading until Ctrl+C
    Run(RunArgs),
    /// Score one symbol with every strategy
    Analyze(AnalyzeArgs),
    /// Place a manual order against a fresh paper account
    Order(OrderArgs),
    /// List available strategies
    Strategies,
    /// Validate configuration
    ValidateConfig,
    /// Print the default configuration as TOML
    InitConfig,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Run a single cycle and exit
    #[arg(long, conflicts_with = "dashboard")]
    pub once: bool,

    /// Show the TUI dashboard (logs go to the configured file)
    #[arg(long)]
    pub dashboard: bool,

    /// Initial watchlist shown before the first cycle (comma-separated)
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub watchlist: Vec<String>,
}

#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Symbol to analyze
    pub symbol: String,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,
}

#[derive(clap::Args)]
pub struct OrderArgs {
    /// Symbol to trade
    pub symbol: String,

    /// buy or sell
    pub side: Side,

    /// Number of shares
    pub quantity: Decimal,

    /// Execution price (defaults to the current market price)
    pub price: Option<Decimal>,
}
