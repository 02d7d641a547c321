//! Core types and traits for the paper trading system.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Quote, Bar)
//! - Order, position and portfolio types
//! - Strategy results and aggregate analyses
//! - Core traits for strategies, indicators, brokers, and market data providers

pub mod types;
pub mod traits;
pub mod error;

pub use error::{TradingError, TradingResult};
pub use types::*;
pub use traits::*;
