//! Print default configuration.

use anyhow::{Context, Result};
use trading_config::default_config_toml;

pub fn run() -> Result<()> {
    let text = default_config_toml().context("Failed to render default configuration")?;
    print!("{text}");
    Ok(())
}
