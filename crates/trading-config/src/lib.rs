//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, DataSettings, LedgerSettings, LoggingConfig, ScreenSettings,
    StrategySettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// Environment variables use the `TRADING__` prefix with `__` between
/// sections, e.g. `TRADING__RISK__BUY_THRESHOLD=0.8`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    build(path, true)
}

/// Like [`load_config`], but falls back to defaults when the file is absent.
pub fn load_config_or_default(path: &Path) -> Result<AppConfig, ConfigError> {
    build(path, false)
}

fn build(path: &Path, required: bool) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(required))
        .add_source(
            Environment::with_prefix("TRADING")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// Default configuration rendered as TOML.
pub fn default_config_toml() -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&AppConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_partial_file() {
        let path = std::env::temp_dir().join(format!("trading-config-{}.toml", std::process::id()));
        fs::write(
            &path,
            "[risk]\nbuy_threshold = 0.8\n\n[automation]\ncycle_interval_secs = 120\n\n\
             [strategies.value]\nmax_pe = 12.0\nmax_pb = 1.5\nmax_debt_to_equity = 0.3\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.risk.buy_threshold, 0.8);
        assert_eq!(config.risk.sell_threshold, 0.3);
        assert_eq!(config.automation.cycle_interval_secs, 120);
        assert_eq!(config.automation.error_backoff_secs, 60);
        assert_eq!(config.strategies.value.max_pe, 12.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/trading.toml");
        assert!(load_config(path).is_err());
        assert!(load_config_or_default(path).is_ok());
    }

    #[test]
    fn test_default_toml_renders() {
        let text = default_config_toml().unwrap();
        assert!(text.contains("[risk]"));
        assert!(text.contains("cycle_interval_secs = 300"));
    }
}
