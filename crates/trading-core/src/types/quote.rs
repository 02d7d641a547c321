//! Per-symbol quote and indicator bag.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Current price plus a flat bag of fundamental and technical indicators.
///
/// Every field is optional. Consumers treat an absent value as "no signal".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Option<Decimal>,
    /// Percent change over the last session
    pub percent_change: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    /// Price / earnings
    pub pe: Option<f64>,
    /// Price / book
    pub pb: Option<f64>,
    pub debt_to_equity: Option<f64>,
    /// Expected EPS growth over the next five years, in percent
    pub eps_growth_next5y: Option<f64>,
    /// Expected EPS growth over the next year, in percent
    pub eps_growth_next1y: Option<f64>,
    /// EPS growth over the past five years, in percent
    pub eps_growth_past5y: Option<f64>,
    pub rsi: Option<f64>,
    pub relative_volume: Option<f64>,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
}

impl Quote {
    /// Create an empty quote for a symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Set the price.
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the percent change.
    pub fn with_percent_change(mut self, percent_change: f64) -> Self {
        self.percent_change = Some(percent_change);
        self
    }

    /// Get a usable (strictly positive) price.
    pub fn last_price(&self) -> Result<Decimal, DataError> {
        self.price
            .filter(|price| *price > Decimal::ZERO)
            .ok_or_else(|| DataError::MissingField {
                symbol: self.symbol.clone(),
                field: "price",
            })
    }
}
