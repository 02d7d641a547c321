//! Buy/sell/hold decision policy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trading_core::TradingError;

use crate::{PositionSizer, SizingConfig};

/// Risk management configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Open a position when aggregate confidence reaches this
    pub buy_threshold: f64,
    /// Exit a position when aggregate confidence falls below this
    pub sell_threshold: f64,
    /// Position sizing
    #[serde(flatten)]
    pub sizing: SizingConfig,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            buy_threshold: 0.7,
            sell_threshold: 0.3,
            sizing: SizingConfig::default(),
        }
    }
}

impl RiskConfig {
    /// Check thresholds are ordered fractions.
    pub fn validate(&self) -> Result<(), TradingError> {
        let fractions = [
            ("buy_threshold", self.buy_threshold),
            ("sell_threshold", self.sell_threshold),
            ("kelly_multiplier", self.sizing.kelly_multiplier),
            ("max_position_fraction", self.sizing.max_position_fraction),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(TradingError::Config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        if self.sell_threshold >= self.buy_threshold {
            return Err(TradingError::Config(
                "sell_threshold must be below buy_threshold".into(),
            ));
        }
        Ok(())
    }
}

/// What to do with one symbol this cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskDecision {
    /// No position and high confidence: size and buy
    Enter,
    /// Held position and low confidence: sell everything
    Exit { quantity: Decimal },
    /// No action
    Hold { reason: String },
}

/// Decision policy plus position sizing.
#[derive(Debug, Clone, Default)]
pub struct RiskManager {
    config: RiskConfig,
    sizer: PositionSizer,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Self {
        let sizer = PositionSizer::new(config.sizing.clone());
        Self { config, sizer }
    }

    /// Decide for a symbol given its aggregate confidence and held quantity.
    ///
    /// Rules are checked in order: enter when flat and confident, exit fully
    /// when held and unconfident, otherwise hold.
    pub fn evaluate(&self, confidence: f64, held: Option<Decimal>) -> RiskDecision {
        let held = held.filter(|quantity| *quantity > Decimal::ZERO);
        match held {
            None if confidence >= self.config.buy_threshold => RiskDecision::Enter,
            Some(quantity) if confidence < self.config.sell_threshold => {
                RiskDecision::Exit { quantity }
            }
            None => RiskDecision::Hold {
                reason: format!(
                    "confidence {confidence:.3} below buy threshold {}",
                    self.config.buy_threshold
                ),
            },
            Some(_) => RiskDecision::Hold {
                reason: format!(
                    "confidence {confidence:.3} above sell threshold {}",
                    self.config.sell_threshold
                ),
            },
        }
    }

    /// Shares to buy for an `Enter` decision.
    pub fn position_size(&self, portfolio_value: Decimal, confidence: f64, price: Decimal) -> Decimal {
        self.sizer.calculate(portfolio_value, confidence, price)
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }
}
