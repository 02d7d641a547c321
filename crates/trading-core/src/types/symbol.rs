//! Ticker symbol normalization.

/// Exchange prefixes mapped to the suffix convention used by quote vendors.
const EXCHANGE_SUFFIXES: [(&str, &str); 5] = [
    ("TSE:", ".T"),
    ("TSEC:", ".TW"),
    ("LSE:", ".L"),
    ("FRA:", ".F"),
    ("HKG:", ".HK"),
];

/// Normalize a user-supplied symbol: trim, upper-case, and rewrite
/// `EXCHANGE:TICKER` into `TICKER.SUFFIX`.
pub fn normalize_symbol(symbol: &str) -> String {
    let symbol = symbol.trim().to_uppercase();

    for (prefix, suffix) in EXCHANGE_SUFFIXES {
        if let Some(ticker) = symbol.strip_prefix(prefix) {
            return format!("{ticker}{suffix}");
        }
    }

    symbol
}
