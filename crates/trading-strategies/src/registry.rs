//! The closed set of analysis strategies.

use crate::{GrowthConfig, GrowthStrategy, QuantConfig, QuantStrategy, ValueConfig, ValueStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trading_core::{
    error::StrategyError,
    traits::{Strategy, StrategyConfig},
    types::Quote,
};

/// Information about a built-in strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Strategy name, as it appears in analyses
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Signals the strategy emits
    pub signals: Vec<String>,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// One of the built-in strategies.
#[derive(Debug, Clone)]
pub enum StrategyKind {
    Value(ValueStrategy),
    Growth(GrowthStrategy),
    Quant(QuantStrategy),
}

impl StrategyKind {
    /// All built-in strategies with default thresholds.
    pub fn defaults() -> Vec<StrategyKind> {
        vec![
            StrategyKind::Value(ValueStrategy::default()),
            StrategyKind::Growth(GrowthStrategy::default()),
            StrategyKind::Quant(QuantStrategy::default()),
        ]
    }

    /// Build all strategies from validated configs.
    pub fn from_configs(
        value: ValueConfig,
        growth: GrowthConfig,
        quant: QuantConfig,
    ) -> Result<Vec<StrategyKind>, StrategyError> {
        value.validate()?;
        growth.validate()?;
        quant.validate()?;
        Ok(vec![
            StrategyKind::Value(ValueStrategy::new(value)),
            StrategyKind::Growth(GrowthStrategy::new(growth)),
            StrategyKind::Quant(QuantStrategy::new(quant)),
        ])
    }

    /// Describe every built-in strategy.
    pub fn catalog() -> Result<Vec<StrategyInfo>, StrategyError> {
        Self::defaults().iter().map(StrategyKind::info).collect()
    }

    /// Describe this strategy.
    pub fn info(&self) -> Result<StrategyInfo, StrategyError> {
        let default_config = match self {
            StrategyKind::Value(s) => serde_json::to_value(s.config()),
            StrategyKind::Growth(s) => serde_json::to_value(s.config()),
            StrategyKind::Quant(s) => serde_json::to_value(s.config()),
        }
        .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;

        // Signal names are fixed, so an empty quote lists them.
        let signals = self
            .signals(&Quote::default())
            .map(|signals| signals.into_keys().collect())
            .unwrap_or_default();

        Ok(StrategyInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
            signals,
            default_config,
        })
    }

    fn inner(&self) -> &dyn Strategy {
        match self {
            StrategyKind::Value(s) => s,
            StrategyKind::Growth(s) => s,
            StrategyKind::Quant(s) => s,
        }
    }
}

impl Strategy for StrategyKind {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn signals(&self, quote: &Quote) -> Result<BTreeMap<String, bool>, StrategyError> {
        self.inner().signals(quote)
    }

    fn description(&self) -> &str {
        self.inner().description()
    }
}
