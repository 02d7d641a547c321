//! Position sizing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Half-Kelly sizing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Fraction of the Kelly bet to take (0.5 = half-Kelly)
    pub kelly_multiplier: f64,
    /// Hard cap on a single position as a fraction of portfolio value
    pub max_position_fraction: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            kelly_multiplier: 0.5,
            max_position_fraction: 0.20,
        }
    }
}

/// Converts a confidence into a whole number of shares.
#[derive(Debug, Clone, Default)]
pub struct PositionSizer {
    config: SizingConfig,
}

impl PositionSizer {
    pub fn new(config: SizingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    /// Shares to buy.
    ///
    /// `floor(portfolio_value * confidence * kelly_multiplier / price)`, capped
    /// at `floor(portfolio_value * max_position_fraction / price)`. Returns 0
    /// for a non-positive price or portfolio value, or a non-finite
    /// confidence.
    pub fn calculate(&self, portfolio_value: Decimal, confidence: f64, price: Decimal) -> Decimal {
        if price <= Decimal::ZERO || portfolio_value <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let (Some(kelly_fraction), Some(cap_fraction)) = (
            to_decimal(confidence.clamp(0.0, 1.0) * self.config.kelly_multiplier),
            to_decimal(self.config.max_position_fraction),
        ) else {
            warn!(confidence, "Cannot size position from non-finite inputs");
            return Decimal::ZERO;
        };

        let shares = (portfolio_value * kelly_fraction / price).floor();
        let max_shares = (portfolio_value * cap_fraction / price).floor();
        shares.min(max_shares).max(Decimal::ZERO)
    }
}

fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::try_from(value).ok()
}
