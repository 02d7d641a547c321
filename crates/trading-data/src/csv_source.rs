//! CSV quote source.
//!
//! Reads a snapshot file with one row per symbol, and optionally a directory
//! of daily OHLCV files (`<SYMBOL>.csv`) from which missing technicals are
//! derived.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use trading_core::error::{DataError, IndicatorError};
use trading_core::traits::{Indicator, MarketDataProvider};
use trading_core::types::{normalize_symbol, Bar, BarSeries, Quote};
use trading_indicators::{RelativeVolume, Rsi, Sma};

/// Snapshot row. Column names follow either snake_case or the camelCase
/// names used by common market data exports.
#[derive(Debug, Deserialize)]
struct SnapshotRecord {
    #[serde(alias = "Symbol", alias = "ticker", alias = "Ticker")]
    symbol: String,
    #[serde(default, alias = "currentPrice", alias = "regularMarketPrice", alias = "Price",
        deserialize_with = "csv::invalid_option")]
    price: Option<f64>,
    #[serde(default, alias = "percentChange", alias = "change", alias = "Change",
        deserialize_with = "percent")]
    percent_change: Option<f64>,
    #[serde(default, alias = "Sector")]
    sector: Option<String>,
    #[serde(default, alias = "Industry")]
    industry: Option<String>,
    #[serde(default, alias = "PE", alias = "trailingPE", deserialize_with = "csv::invalid_option")]
    pe: Option<f64>,
    #[serde(default, alias = "PB", alias = "priceToBook", deserialize_with = "csv::invalid_option")]
    pb: Option<f64>,
    #[serde(default, alias = "debtEq", alias = "debtToEquity", deserialize_with = "csv::invalid_option")]
    debt_to_equity: Option<f64>,
    #[serde(default, alias = "epsNext5Y", alias = "next5Y", deserialize_with = "percent")]
    eps_growth_next5y: Option<f64>,
    #[serde(default, alias = "epsNextY", alias = "nextY", deserialize_with = "percent")]
    eps_growth_next1y: Option<f64>,
    #[serde(default, alias = "epsPast5Y", alias = "past5Y", deserialize_with = "percent")]
    eps_growth_past5y: Option<f64>,
    #[serde(default, alias = "RSI", deserialize_with = "csv::invalid_option")]
    rsi: Option<f64>,
    #[serde(default, alias = "relVolume", alias = "relativeVolume",
        deserialize_with = "csv::invalid_option")]
    relative_volume: Option<f64>,
    #[serde(default, alias = "SMA20", deserialize_with = "csv::invalid_option")]
    sma20: Option<f64>,
    #[serde(default, alias = "SMA50", deserialize_with = "csv::invalid_option")]
    sma50: Option<f64>,
    #[serde(default, alias = "SMA200", deserialize_with = "csv::invalid_option")]
    sma200: Option<f64>,
}

impl SnapshotRecord {
    fn into_quote(self) -> Quote {
        Quote {
            symbol: normalize_symbol(&self.symbol),
            price: self.price.and_then(to_price),
            percent_change: self.percent_change,
            sector: self.sector.filter(|s| !s.trim().is_empty()),
            industry: self.industry.filter(|s| !s.trim().is_empty()),
            pe: self.pe,
            pb: self.pb,
            debt_to_equity: self.debt_to_equity,
            eps_growth_next5y: self.eps_growth_next5y,
            eps_growth_next1y: self.eps_growth_next1y,
            eps_growth_past5y: self.eps_growth_past5y,
            rsi: self.rsi,
            relative_volume: self.relative_volume,
            sma20: self.sma20,
            sma50: self.sma50,
            sma200: self.sma200,
        }
    }
}

/// Percentage cell such as `25.3%` or `25.3`. Anything else reads as absent.
fn percent<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer).unwrap_or(None);
    Ok(raw.and_then(|cell| cell.trim().trim_end_matches('%').trim().parse::<f64>().ok()))
}

fn to_price(value: f64) -> Option<Decimal> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Decimal::try_from(value).ok()
}

/// OHLCV row.
#[derive(Debug, Deserialize)]
struct BarRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Quote provider backed by CSV files loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct CsvQuoteSource {
    quotes: HashMap<String, Quote>,
}

impl CsvQuoteSource {
    /// Load a snapshot file and/or a directory of bar files.
    ///
    /// Snapshot values take precedence; bars only fill fields the snapshot
    /// left empty. Symbols with bars but no snapshot row are still quoted.
    pub fn load(quotes_path: Option<&Path>, bars_dir: Option<&Path>) -> Result<Self, DataError> {
        if quotes_path.is_none() && bars_dir.is_none() {
            return Err(DataError::NoDataAvailable(
                "no quotes file or bars directory configured".into(),
            ));
        }

        let mut quotes = match quotes_path {
            Some(path) => load_snapshot(path)?,
            None => HashMap::new(),
        };

        if let Some(dir) = bars_dir {
            for (symbol, series) in load_bar_dir(dir)? {
                let quote = quotes
                    .entry(symbol.clone())
                    .or_insert_with(|| Quote::new(symbol.clone()));
                fill_from_bars(quote, &series)?;
            }
        }

        info!(symbols = quotes.len(), "Loaded CSV quotes");
        Ok(Self { quotes })
    }

    /// Build a source from quotes already in memory.
    pub fn from_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        Self {
            quotes: quotes
                .into_iter()
                .map(|quote| (normalize_symbol(&quote.symbol), quote))
                .collect(),
        }
    }

    /// All quoted symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<_> = self.quotes.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[async_trait]
impl MarketDataProvider for CsvQuoteSource {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        let symbol = normalize_symbol(symbol);
        self.quotes
            .get(&symbol)
            .cloned()
            .ok_or(DataError::SymbolNotFound(symbol))
    }

    fn name(&self) -> &str {
        "csv"
    }
}

fn load_snapshot(path: &Path) -> Result<HashMap<String, Quote>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::ParseError(format!("{}: {e}", path.display())))?;

    let mut quotes = HashMap::new();
    for (row, result) in reader.deserialize::<SnapshotRecord>().enumerate() {
        match result {
            Ok(record) if !record.symbol.trim().is_empty() => {
                let quote = record.into_quote();
                quotes.insert(quote.symbol.clone(), quote);
            }
            Ok(_) => warn!(row, "Skipping snapshot row without a symbol"),
            Err(e) => warn!(row, error = %e, "Skipping unreadable snapshot row"),
        }
    }
    debug!(path = %path.display(), symbols = quotes.len(), "Read quote snapshot");
    Ok(quotes)
}

fn load_bar_dir(dir: &Path) -> Result<Vec<(String, BarSeries)>, DataError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| DataError::NoDataAvailable(format!("{}: {e}", dir.display())))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
        .collect();
    paths.sort();

    let mut series = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let symbol = normalize_symbol(stem);
        match load_bars(&path) {
            Ok(bars) => series.push((symbol.clone(), BarSeries::new(symbol, bars))),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable bar file"),
        }
    }
    Ok(series)
}

fn load_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::ParseError(e.to_string()))?;

    reader
        .deserialize::<BarRecord>()
        .map(|result| {
            let record = result.map_err(|e| DataError::ParseError(e.to_string()))?;
            Ok(Bar::new(
                parse_timestamp(&record.date)?,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ))
        })
        .collect()
}

/// Fill absent quote fields from a bar history.
fn fill_from_bars(quote: &mut Quote, series: &BarSeries) -> Result<(), DataError> {
    let closes = series.closes();
    let volumes = series.volumes();
    let indicator_error = |e: IndicatorError| DataError::Internal(format!("indicator setup: {e}"));

    if quote.price.is_none() {
        quote.price = series.last().and_then(|bar| to_price(bar.close));
    }
    if quote.percent_change.is_none() {
        quote.percent_change = series.percent_change();
    }
    if quote.rsi.is_none() {
        quote.rsi = Rsi::default().latest(&closes);
    }
    if quote.relative_volume.is_none() {
        quote.relative_volume = RelativeVolume::default().latest(&volumes);
    }
    for (slot, period) in [
        (&mut quote.sma20, 20),
        (&mut quote.sma50, 50),
        (&mut quote.sma200, 200),
    ] {
        if slot.is_none() {
            *slot = Sma::new(period).map_err(indicator_error)?.latest(&closes);
        }
    }
    Ok(())
}

/// Parse the date formats found in common OHLCV exports, or Unix time.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    let date_str = date_str.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"] {
        if let Some(dt) = NaiveDate::parse_from_str(date_str, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    // Treat 11+ digit values as milliseconds
    if let Ok(ts) = date_str.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!("Could not parse date: {date_str}")))
}
