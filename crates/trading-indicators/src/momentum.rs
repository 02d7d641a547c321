//! Momentum indicators.

use trading_core::error::IndicatorError;
use trading_core::traits::Indicator;

/// Relative Strength Index (RSI) with Wilder smoothing.
///
/// Bounded in [0, 100]; readings below 30 are conventionally oversold.
#[derive(Debug, Clone, Copy)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator. The conventional period is 14.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "RSI period must be greater than 0".into(),
            ));
        }
        Ok(Self { period })
    }

    fn rsi(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period() {
            return vec![];
        }

        let changes: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
        let period = self.period as f64;

        let (seed_gain, seed_loss) = changes[..self.period]
            .iter()
            .fold((0.0, 0.0), |(gain, loss), &change| {
                (gain + change.max(0.0), loss + (-change).max(0.0))
            });
        let mut avg_gain = seed_gain / period;
        let mut avg_loss = seed_loss / period;

        let mut result = Vec::with_capacity(changes.len() - self.period + 1);
        result.push(Self::rsi(avg_gain, avg_loss));

        for &change in &changes[self.period..] {
            avg_gain = (avg_gain * (period - 1.0) + change.max(0.0)) / period;
            avg_loss = (avg_loss * (period - 1.0) + (-change).max(0.0)) / period;
            result.push(Self::rsi(avg_gain, avg_loss));
        }

        result
    }

    fn period(&self) -> usize {
        // One extra point to form `period` price changes
        self.period + 1
    }

    fn name(&self) -> &str {
        "RSI"
    }
}
