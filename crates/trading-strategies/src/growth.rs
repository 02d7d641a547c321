//! Growth hunting strategy.
//!
//! Lynch-style screen for fast, accelerating earnings growth in consumer and
//! technology sectors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trading_core::{
    error::StrategyError,
    traits::{Strategy, StrategyConfig},
    types::Quote,
};

use crate::metric::{above, finite};

/// Configuration for the growth strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Fires when expected five-year EPS growth (percent) exceeds this
    pub min_eps_growth_next5y: f64,
    /// Sectors considered growth sectors
    pub sectors: Vec<String>,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            min_eps_growth_next5y: 25.0,
            sectors: vec![
                "Technology".to_string(),
                "Consumer Cyclical".to_string(),
                "Consumer Defensive".to_string(),
            ],
        }
    }
}

impl StrategyConfig for GrowthConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if !self.min_eps_growth_next5y.is_finite() {
            return Err(StrategyError::InvalidConfig(
                "EPS growth threshold must be finite".into(),
            ));
        }
        if self.sectors.is_empty() {
            return Err(StrategyError::InvalidConfig(
                "At least one growth sector required".into(),
            ));
        }
        Ok(())
    }
}

/// Growth hunting strategy.
#[derive(Debug, Clone, Default)]
pub struct GrowthStrategy {
    config: GrowthConfig,
}

impl GrowthStrategy {
    pub fn new(config: GrowthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    fn in_growth_sector(&self, sector: Option<&str>) -> bool {
        sector.is_some_and(|sector| self.config.sectors.iter().any(|s| s == sector))
    }
}

impl Strategy for GrowthStrategy {
    fn name(&self) -> &str {
        "growth_hunting"
    }

    fn description(&self) -> &str {
        "Strong and accelerating earnings growth in growth sectors"
    }

    fn signals(&self, quote: &Quote) -> Result<BTreeMap<String, bool>, StrategyError> {
        let next1y = finite("eps_growth_next1y", quote.eps_growth_next1y)?;
        let past5y = finite("eps_growth_past5y", quote.eps_growth_past5y)?;
        let accelerating = matches!((next1y, past5y), (Some(next), Some(past)) if next > past);

        Ok(BTreeMap::from([
            (
                "eps_growth".to_string(),
                above(
                    "eps_growth_next5y",
                    quote.eps_growth_next5y,
                    self.config.min_eps_growth_next5y,
                )?,
            ),
            (
                "sector_match".to_string(),
                self.in_growth_sector(quote.sector.as_deref()),
            ),
            ("high_growth".to_string(), accelerating),
        ]))
    }
}
