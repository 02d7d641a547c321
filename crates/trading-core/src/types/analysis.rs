//! Strategy scoring results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum confidence for a strategy to recommend buying.
pub const BUY_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Recommendation emitted by a single strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Hold,
}

impl Recommendation {
    /// BUY iff confidence reaches the buy threshold.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= BUY_CONFIDENCE_THRESHOLD {
            Recommendation::Buy
        } else {
            Recommendation::Hold
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Hold => write!(f, "HOLD"),
        }
    }
}

/// Outcome of scoring one symbol with one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy_name: String,
    /// Named boolean signals
    pub signals: BTreeMap<String, bool>,
    /// Fraction of signals that fired, in [0, 1]
    pub confidence: f64,
    pub recommendation: Recommendation,
}

impl StrategyResult {
    /// Build a result from evaluated signals.
    pub fn from_signals(strategy_name: impl Into<String>, signals: BTreeMap<String, bool>) -> Self {
        let confidence = if signals.is_empty() {
            0.0
        } else {
            signals.values().filter(|fired| **fired).count() as f64 / signals.len() as f64
        };

        Self {
            strategy_name: strategy_name.into(),
            signals,
            confidence,
            recommendation: Recommendation::from_confidence(confidence),
        }
    }

    /// Result for a strategy that could not be evaluated.
    pub fn unavailable(strategy_name: impl Into<String>) -> Self {
        Self::from_signals(strategy_name, BTreeMap::new())
    }
}

/// All strategy results for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateAnalysis {
    pub symbol: String,
    /// Results keyed by strategy name
    pub strategies: BTreeMap<String, StrategyResult>,
    /// Mean confidence over every strategy that was run
    pub aggregate_confidence: f64,
    pub analyzed_at: DateTime<Utc>,
}

impl AggregateAnalysis {
    /// Aggregate strategy results.
    ///
    /// Every result counts toward the mean, including ones that could not be
    /// evaluated; non-finite confidences count as 0.
    pub fn new(symbol: impl Into<String>, results: Vec<StrategyResult>) -> Self {
        let aggregate_confidence = if results.is_empty() {
            0.0
        } else {
            let total: f64 = results
                .iter()
                .map(|result| {
                    if result.confidence.is_finite() {
                        result.confidence.clamp(0.0, 1.0)
                    } else {
                        0.0
                    }
                })
                .sum();
            total / results.len() as f64
        };

        Self {
            symbol: symbol.into(),
            strategies: results
                .into_iter()
                .map(|result| (result.strategy_name.clone(), result))
                .collect(),
            aggregate_confidence,
            analyzed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(values: &[(&str, bool)]) -> BTreeMap<String, bool> {
        values
            .iter()
            .map(|(name, fired)| (name.to_string(), *fired))
            .collect()
    }

    #[test]
    fn test_two_of_three_is_hold() {
        let result = StrategyResult::from_signals(
            "value_investing",
            signals(&[("a", true), ("b", true), ("c", false)]),
        );
        assert!((result.confidence - 0.667).abs() < 0.001);
        assert_eq!(result.recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_all_signals_is_buy() {
        let result =
            StrategyResult::from_signals("quant", signals(&[("a", true), ("b", true), ("c", true)]));
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.recommendation, Recommendation::Buy);
    }

    #[test]
    fn test_unavailable_result() {
        let result = StrategyResult::unavailable("growth_hunting");
        assert!(result.signals.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_aggregate_counts_unavailable_as_zero() {
        let analysis = AggregateAnalysis::new(
            "AAPL",
            vec![
                StrategyResult::from_signals("a", signals(&[("x", true)])),
                StrategyResult::from_signals("b", signals(&[("x", true), ("y", false)])),
                StrategyResult::unavailable("c"),
            ],
        );
        assert!((analysis.aggregate_confidence - 0.5).abs() < 1e-9);
        assert_eq!(analysis.strategies.len(), 3);
    }

    #[test]
    fn test_aggregate_ignores_non_finite_confidence() {
        let mut broken = StrategyResult::unavailable("broken");
        broken.confidence = f64::NAN;
        let analysis = AggregateAnalysis::new(
            "AAPL",
            vec![broken, StrategyResult::from_signals("ok", signals(&[("x", true)]))],
        );
        assert!((analysis.aggregate_confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_aggregate() {
        let analysis = AggregateAnalysis::new("AAPL", vec![]);
        assert_eq!(analysis.aggregate_confidence, 0.0);
    }
}
