//! Moving average indicators.

use trading_core::error::IndicatorError;
use trading_core::traits::Indicator;

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N values.
#[derive(Debug, Clone, Copy)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "SMA period must be greater than 0".into(),
            ));
        }
        Ok(Self { period })
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }

        let period = self.period as f64;
        let mut sum: f64 = data[..self.period].iter().sum();
        let mut result = Vec::with_capacity(data.len() - self.period + 1);
        result.push(sum / period);

        for (leaving, entering) in data.iter().zip(&data[self.period..]) {
            sum += entering - leaving;
            result.push(sum / period);
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}
