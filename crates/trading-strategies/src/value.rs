//! Value investing strategy.
//!
//! Graham-style screen for cheap, lightly levered companies:
//! low price/earnings, low price/book and low debt/equity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trading_core::{
    error::StrategyError,
    traits::{Strategy, StrategyConfig},
    types::Quote,
};

use crate::metric::below;

/// Configuration for the value strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueConfig {
    /// Fires when P/E is below this
    pub max_pe: f64,
    /// Fires when P/B is below this
    pub max_pb: f64,
    /// Fires when debt/equity is below this
    pub max_debt_to_equity: f64,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            max_pe: 15.0,
            max_pb: 1.5,
            max_debt_to_equity: 0.3,
        }
    }
}

impl StrategyConfig for ValueConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        let thresholds = [self.max_pe, self.max_pb, self.max_debt_to_equity];
        if thresholds.iter().any(|t| !t.is_finite() || *t <= 0.0) {
            return Err(StrategyError::InvalidConfig(
                "Value thresholds must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Value investing strategy.
#[derive(Debug, Clone, Default)]
pub struct ValueStrategy {
    config: ValueConfig,
}

impl ValueStrategy {
    pub fn new(config: ValueConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValueConfig {
        &self.config
    }
}

impl Strategy for ValueStrategy {
    fn name(&self) -> &str {
        "value_investing"
    }

    fn description(&self) -> &str {
        "Cheap on earnings and book value with little debt"
    }

    fn signals(&self, quote: &Quote) -> Result<BTreeMap<String, bool>, StrategyError> {
        Ok(BTreeMap::from([
            ("pe_ratio".to_string(), below("pe", quote.pe, self.config.max_pe)?),
            ("pb_ratio".to_string(), below("pb", quote.pb, self.config.max_pb)?),
            (
                "de_ratio".to_string(),
                below(
                    "debt_to_equity",
                    quote.debt_to_equity,
                    self.config.max_debt_to_equity,
                )?,
            ),
        ]))
    }
}
