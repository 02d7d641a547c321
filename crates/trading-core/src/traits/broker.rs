//! Broker trait definition.

use crate::error::BrokerError;
use crate::types::{Order, OrderRequest, Position, PortfolioSummary, PositionView};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Trait for order executors backed by a portfolio ledger.
///
/// Valuation methods degrade rather than fail: a position whose price cannot
/// be fetched is left out of the figures.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Validate and execute an order.
    ///
    /// # Returns
    /// The executed order, or the validation error that rejected it. A
    /// rejected order leaves no trace in the ledger or the trade history.
    async fn place_order(&self, request: OrderRequest) -> Result<Order, BrokerError>;

    /// Get the position for a symbol, if one is held.
    async fn position(&self, symbol: &str) -> Option<Position>;

    /// Cash plus the market value of every priceable position.
    async fn portfolio_value(&self) -> Decimal;

    /// Get the portfolio summary.
    async fn portfolio_summary(&self) -> PortfolioSummary;

    /// Get open positions valued at current prices.
    async fn active_positions(&self) -> BTreeMap<String, PositionView>;

    /// Get executed orders, oldest first.
    async fn trade_history(&self) -> Vec<Order>;

    /// Get the broker name.
    fn name(&self) -> &str;
}
