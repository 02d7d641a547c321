//! Quantitative edge strategy.
//!
//! Technical screen: oversold RSI, unusual volume, and moving averages
//! available across short, medium and long horizons.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trading_core::{
    error::StrategyError,
    traits::{Strategy, StrategyConfig},
    types::Quote,
};

use crate::metric::{above, below, finite};

/// Configuration for the quant strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantConfig {
    /// Fires when RSI is below this
    pub oversold_rsi: f64,
    /// Fires when relative volume exceeds this
    pub min_relative_volume: f64,
}

impl Default for QuantConfig {
    fn default() -> Self {
        Self {
            oversold_rsi: 30.0,
            min_relative_volume: 2.0,
        }
    }
}

impl StrategyConfig for QuantConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if !(0.0..=100.0).contains(&self.oversold_rsi) {
            return Err(StrategyError::InvalidConfig(
                "RSI threshold must be between 0 and 100".into(),
            ));
        }
        if !self.min_relative_volume.is_finite() || self.min_relative_volume <= 0.0 {
            return Err(StrategyError::InvalidConfig(
                "Relative volume threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Quantitative edge strategy.
#[derive(Debug, Clone, Default)]
pub struct QuantStrategy {
    config: QuantConfig,
}

impl QuantStrategy {
    pub fn new(config: QuantConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QuantConfig {
        &self.config
    }
}

impl Strategy for QuantStrategy {
    fn name(&self) -> &str {
        "quantitative_edge"
    }

    fn description(&self) -> &str {
        "Oversold RSI on heavy volume with trend data present"
    }

    fn signals(&self, quote: &Quote) -> Result<BTreeMap<String, bool>, StrategyError> {
        let averages = [
            finite("sma20", quote.sma20)?,
            finite("sma50", quote.sma50)?,
            finite("sma200", quote.sma200)?,
        ];
        let trend = averages.iter().all(|sma| sma.is_some_and(|v| v > 0.0));

        Ok(BTreeMap::from([
            (
                "rsi_oversold".to_string(),
                below("rsi", quote.rsi, self.config.oversold_rsi)?,
            ),
            (
                "volume_surge".to_string(),
                above(
                    "relative_volume",
                    quote.relative_volume,
                    self.config.min_relative_volume,
                )?,
            ),
            ("trend_following".to_string(), trend),
        ]))
    }
}
