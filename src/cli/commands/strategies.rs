//! List strategies command.

use anyhow::{Context, Result};
use trading_config::AppConfig;

use super::configured_strategies;

pub fn run(config: &AppConfig) -> Result<()> {
    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for strategy in configured_strategies(config)? {
        let info = strategy.info().context("Failed to describe strategy")?;
        println!("  {} ", info.name);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  Signals: {}", info.signals.join(", "));
        println!("  Config:  {}", info.default_config);
        println!();
    }

    println!("A symbol's confidence is the mean of the three strategy confidences.");

    Ok(())
}
