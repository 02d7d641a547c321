//! Volume indicators.

use trading_core::error::IndicatorError;
use trading_core::traits::Indicator;

/// Relative volume: each volume divided by the mean of the preceding
/// `period` volumes.
///
/// A reading of 2.0 means the bar traded twice its recent average.
#[derive(Debug, Clone, Copy)]
pub struct RelativeVolume {
    period: usize,
}

impl RelativeVolume {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "Relative volume period must be greater than 0".into(),
            ));
        }
        Ok(Self { period })
    }
}

impl Default for RelativeVolume {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl Indicator for RelativeVolume {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period() {
            return vec![];
        }

        data.windows(self.period + 1)
            .map(|window| {
                let (history, current) = window.split_at(self.period);
                let average = history.iter().sum::<f64>() / self.period as f64;
                if average > 0.0 {
                    current[0] / average
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "RVOL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_volume_surge() {
        let rvol = RelativeVolume::new(3).unwrap();
        let result = rvol.calculate(&[100.0, 100.0, 100.0, 300.0]);
        assert_eq!(result, vec![3.0]);
    }

    #[test]
    fn test_relative_volume_rolling() {
        let rvol = RelativeVolume::new(2).unwrap();
        let result = rvol.calculate(&[100.0, 100.0, 50.0, 150.0]);
        assert_eq!(result.len(), 2);
        assert!((result[0] - 0.5).abs() < 1e-10);
        assert!((result[1] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_relative_volume_zero_history() {
        let rvol = RelativeVolume::new(2).unwrap();
        assert_eq!(rvol.latest(&[0.0, 0.0, 10.0]), Some(0.0));
    }

    #[test]
    fn test_relative_volume_insufficient_data() {
        let rvol = RelativeVolume::default();
        assert!(rvol.calculate(&[1.0; 20]).is_empty());
    }
}
