//! Configuration structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use trading_automation::ControllerConfig;
use trading_core::traits::StrategyConfig;
use trading_core::TradingError;
use trading_data::RetryPolicy;
use trading_risk::RiskConfig;
use trading_strategies::{GrowthConfig, QuantConfig, ValueConfig};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub strategies: StrategySettings,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub automation: ControllerConfig,
    #[serde(default)]
    pub screen: ScreenSettings,
    #[serde(default)]
    pub data: DataSettings,
}

impl AppConfig {
    /// Check every section for out-of-range values.
    pub fn validate(&self) -> Result<(), TradingError> {
        self.logging.validate()?;
        self.ledger.validate()?;
        self.strategies.validate()?;
        self.risk.validate()?;

        let automation = &self.automation;
        if automation.cycle_interval_secs == 0 {
            return Err(TradingError::Config(
                "automation.cycle_interval_secs must be positive".into(),
            ));
        }
        if automation.max_watchlist == 0 {
            return Err(TradingError::Config(
                "automation.max_watchlist must be positive".into(),
            ));
        }
        if automation.indices.is_empty() {
            return Err(TradingError::Config(
                "automation.indices must name at least one index".into(),
            ));
        }

        self.data.validate()
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "paper-trader".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Also write logs to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    fn validate(&self) -> Result<(), TradingError> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(TradingError::Config(format!(
                "logging.level must be one of {LEVELS:?}, got '{}'",
                self.level
            )));
        }
        if !matches!(self.format.to_ascii_lowercase().as_str(), "pretty" | "json") {
            return Err(TradingError::Config(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.format
            )));
        }
        Ok(())
    }
}

/// Paper account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    pub initial_balance: Decimal,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::from(100_000),
        }
    }
}

impl LedgerSettings {
    fn validate(&self) -> Result<(), TradingError> {
        if self.initial_balance <= Decimal::ZERO {
            return Err(TradingError::Config(
                "ledger.initial_balance must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Per-strategy thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StrategySettings {
    #[serde(default)]
    pub value: ValueConfig,
    #[serde(default)]
    pub growth: GrowthConfig,
    #[serde(default)]
    pub quant: QuantConfig,
}

impl StrategySettings {
    fn validate(&self) -> Result<(), TradingError> {
        self.value.validate()?;
        self.growth.validate()?;
        self.quant.validate()?;
        Ok(())
    }
}

/// Symbols the candidate screen ranks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenSettings {
    pub universe: Vec<String>,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        let universe = [
            "AAPL", "MSFT", "NVDA", "AMZN", "GOOGL", "META", "TSLA", "JPM", "XOM", "KO", "PFE",
            "F", "INTC", "T", "WMT",
        ];
        Self {
            universe: universe.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Market data files and call policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    /// Quote snapshot CSV
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotes_path: Option<PathBuf>,
    /// Directory of `<SYMBOL>.csv` daily bars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bars_dir: Option<PathBuf>,
    #[serde(flatten)]
    pub retry: RetryPolicy,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            quotes_path: Some(PathBuf::from("data/quotes.csv")),
            bars_dir: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl DataSettings {
    fn validate(&self) -> Result<(), TradingError> {
        if self.quotes_path.is_none() && self.bars_dir.is_none() {
            return Err(TradingError::Config(
                "data.quotes_path or data.bars_dir must be set".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(TradingError::Config(
                "data.max_attempts must be at least 1".into(),
            ));
        }
        if self.retry.timeout_ms == 0 {
            return Err(TradingError::Config("data.timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_sections_rejected() {
        let mut config = AppConfig::default();
        config.ledger.initial_balance = Decimal::ZERO;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.level = "verbose".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.strategies.value.max_pe = -1.0;
        assert!(matches!(config.validate(), Err(TradingError::Strategy(_))));

        let mut config = AppConfig::default();
        config.automation.indices.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.data.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed.risk, RiskConfig::default());
        assert_eq!(parsed.automation, ControllerConfig::default());
        assert_eq!(parsed.data.retry, RetryPolicy::default());
        assert_eq!(parsed.ledger.initial_balance, Decimal::from(100_000));
    }
}
