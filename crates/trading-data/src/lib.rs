//! Market data providers.
//!
//! - [`CsvQuoteSource`]: snapshot and OHLCV files loaded at startup
//! - [`InMemoryQuoteSource`]: mutable quote table
//! - [`ResilientProvider`]: timeout and retry around another provider

mod csv_source;
mod memory;
mod resilient;

pub use csv_source::CsvQuoteSource;
pub use memory::InMemoryQuoteSource;
pub use resilient::{ResilientProvider, RetryPolicy};
