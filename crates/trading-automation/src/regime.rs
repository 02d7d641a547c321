//! Market regime classification from headline index moves.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use trading_core::error::DataError;
use trading_core::traits::MarketDataProvider;

use crate::ScreenKind;

/// Index move below which a session counts as a sell-off, in percent.
const BEARISH_CHANGE_PERCENT: f64 = -1.0;

/// Overall market direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketRegime {
    /// Every index is up
    Bullish,
    /// Every index is down more than 1%
    Bearish,
    Mixed,
}

impl MarketRegime {
    /// Classify from index percent changes.
    ///
    /// An empty slice or any non-finite change is mixed.
    pub fn classify(changes: &[f64]) -> Self {
        if changes.is_empty() || changes.iter().any(|c| !c.is_finite()) {
            return MarketRegime::Mixed;
        }
        if changes.iter().all(|c| *c > 0.0) {
            MarketRegime::Bullish
        } else if changes.iter().all(|c| *c < BEARISH_CHANGE_PERCENT) {
            MarketRegime::Bearish
        } else {
            MarketRegime::Mixed
        }
    }

    /// Candidate screen suited to this regime.
    pub fn screen(&self) -> ScreenKind {
        match self {
            MarketRegime::Bullish => ScreenKind::Growth,
            MarketRegime::Bearish => ScreenKind::Value,
            MarketRegime::Mixed => ScreenKind::Technical,
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketRegime::Bullish => write!(f, "bullish"),
            MarketRegime::Bearish => write!(f, "bearish"),
            MarketRegime::Mixed => write!(f, "mixed"),
        }
    }
}

/// Default headline indices: S&P 500, Dow Jones, Nasdaq Composite.
pub fn default_indices() -> Vec<String> {
    vec!["^GSPC".to_string(), "^DJI".to_string(), "^IXIC".to_string()]
}

/// Fetches index quotes and classifies the regime.
#[derive(Debug, Clone)]
pub struct RegimeDetector {
    indices: Vec<String>,
}

impl Default for RegimeDetector {
    fn default() -> Self {
        Self::new(default_indices())
    }
}

impl RegimeDetector {
    pub fn new(indices: Vec<String>) -> Self {
        Self { indices }
    }

    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    /// Classify the current regime.
    ///
    /// A failed index fetch is an error. An index quote without a percent
    /// change counts as flat.
    pub async fn detect(&self, market_data: &dyn MarketDataProvider) -> Result<MarketRegime, DataError> {
        let mut changes = Vec::with_capacity(self.indices.len());
        for index in &self.indices {
            let quote = market_data.get_quote(index).await?;
            changes.push(quote.percent_change.unwrap_or(0.0));
        }

        let regime = MarketRegime::classify(&changes);
        debug!(?changes, %regime, "Classified market regime");
        Ok(regime)
    }
}
