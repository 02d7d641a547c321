//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use trading_config::load_config;

pub fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Initial balance: ${}", config.ledger.initial_balance);
    println!(
        "Thresholds: buy >= {}, sell < {}",
        config.risk.buy_threshold, config.risk.sell_threshold
    );
    println!(
        "Sizing: kelly x{}, max {}% per position",
        config.risk.sizing.kelly_multiplier,
        config.risk.sizing.max_position_fraction * 100.0
    );
    println!(
        "Cycle: every {}s, backoff {}s, watchlist {}",
        config.automation.cycle_interval_secs,
        config.automation.error_backoff_secs,
        config.automation.max_watchlist
    );
    println!("Universe: {} symbols", config.screen.universe.len());

    Ok(())
}
