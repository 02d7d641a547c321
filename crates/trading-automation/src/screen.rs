//! Candidate screens that fill the watchlist.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use trading_core::error::DataError;
use trading_core::traits::MarketDataProvider;
use trading_core::types::{normalize_symbol, Quote};

/// Which kind of candidates to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenKind {
    Growth,
    Value,
    Technical,
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenKind::Growth => write!(f, "growth"),
            ScreenKind::Value => write!(f, "value"),
            ScreenKind::Technical => write!(f, "technical"),
        }
    }
}

/// Source of watchlist candidates.
#[async_trait]
pub trait CandidateScreen: Send + Sync {
    /// Up to `limit` symbols, best first. An empty list is a valid result.
    async fn candidates(&self, kind: ScreenKind, limit: usize) -> Result<Vec<String>, DataError>;

    fn name(&self) -> &str;
}

/// Ranks a fixed universe of symbols by one indicator per screen kind.
///
/// - growth: expected five-year EPS growth, highest first
/// - value: positive P/E, lowest first
/// - technical: relative volume, highest first
///
/// Symbols lacking the indicator are not candidates. Ties break by symbol.
pub struct UniverseScreen {
    universe: Vec<String>,
    market_data: Arc<dyn MarketDataProvider>,
}

impl UniverseScreen {
    pub fn new(universe: Vec<String>, market_data: Arc<dyn MarketDataProvider>) -> Self {
        let mut universe: Vec<String> = universe.iter().map(|s| normalize_symbol(s)).collect();
        universe.sort();
        universe.dedup();
        Self {
            universe,
            market_data,
        }
    }

    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    /// Ranking key; `None` excludes the symbol. Lower keys rank first.
    fn rank_key(kind: ScreenKind, quote: &Quote) -> Option<f64> {
        let finite = |value: Option<f64>| value.filter(|v| v.is_finite());
        match kind {
            ScreenKind::Growth => finite(quote.eps_growth_next5y).map(|g| -g),
            ScreenKind::Value => finite(quote.pe).filter(|pe| *pe > 0.0),
            ScreenKind::Technical => finite(quote.relative_volume).map(|rv| -rv),
        }
    }
}

#[async_trait]
impl CandidateScreen for UniverseScreen {
    async fn candidates(&self, kind: ScreenKind, limit: usize) -> Result<Vec<String>, DataError> {
        let mut ranked = Vec::new();
        let mut failures = 0;

        for symbol in &self.universe {
            match self.market_data.get_quote(symbol).await {
                Ok(quote) => {
                    if let Some(key) = Self::rank_key(kind, &quote) {
                        ranked.push((key, symbol.clone()));
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(symbol = %symbol, error = %e, "Skipping symbol in screen");
                }
            }
        }

        if failures > 0 && failures == self.universe.len() {
            return Err(DataError::NoDataAvailable(format!(
                "no quotes for any of {} screened symbols",
                failures
            )));
        }

        ranked.sort_by(|(a_key, a_symbol), (b_key, b_symbol)| {
            a_key
                .partial_cmp(b_key)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a_symbol.cmp(b_symbol))
        });
        let candidates: Vec<String> = ranked
            .into_iter()
            .take(limit)
            .map(|(_, symbol)| symbol)
            .collect();

        debug!(%kind, count = candidates.len(), "Screen complete");
        Ok(candidates)
    }

    fn name(&self) -> &str {
        "universe"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trading_data::InMemoryQuoteSource;

    fn setup_screen(universe: &[&str]) -> UniverseScreen {
        let source = InMemoryQuoteSource::with_quotes([
            Quote {
                eps_growth_next5y: Some(30.0),
                pe: Some(40.0),
                relative_volume: Some(1.2),
                ..Quote::new("NVDA")
            },
            Quote {
                eps_growth_next5y: Some(12.0),
                pe: Some(9.0),
                relative_volume: Some(3.5),
                ..Quote::new("F")
            },
            Quote {
                eps_growth_next5y: Some(30.0),
                pe: Some(-5.0),
                ..Quote::new("AMD")
            },
            Quote {
                pe: Some(12.0),
                relative_volume: Some(f64::NAN),
                ..Quote::new("KO")
            },
        ]);
        UniverseScreen::new(
            universe.iter().map(|s| s.to_string()).collect(),
            Arc::new(source),
        )
    }

    #[tokio::test]
    async fn test_growth_ranking_breaks_ties_by_symbol() {
        let screen = setup_screen(&["NVDA", "F", "AMD", "KO"]);
        let candidates = screen.candidates(ScreenKind::Growth, 10).await.unwrap();
        assert_eq!(candidates, ["AMD", "NVDA", "F"]);
    }

    #[tokio::test]
    async fn test_value_requires_positive_pe() {
        let screen = setup_screen(&["NVDA", "F", "AMD", "KO"]);
        let candidates = screen.candidates(ScreenKind::Value, 10).await.unwrap();
        assert_eq!(candidates, ["F", "KO", "NVDA"]);
    }

    #[tokio::test]
    async fn test_technical_limit() {
        let screen = setup_screen(&["NVDA", "F", "AMD", "KO"]);
        let candidates = screen.candidates(ScreenKind::Technical, 1).await.unwrap();
        assert_eq!(candidates, ["F"]);
    }

    #[tokio::test]
    async fn test_unknown_symbols_skipped() {
        let screen = setup_screen(&["nvda", "MISSING"]);
        let candidates = screen.candidates(ScreenKind::Growth, 10).await.unwrap();
        assert_eq!(candidates, ["NVDA"]);
    }

    #[tokio::test]
    async fn test_all_quotes_failing_is_error() {
        let screen = setup_screen(&["MISSING", "GONE"]);
        assert!(screen.candidates(ScreenKind::Value, 10).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_universe_is_empty() {
        let screen = setup_screen(&[]);
        assert!(screen.candidates(ScreenKind::Growth, 10).await.unwrap().is_empty());
    }
}
