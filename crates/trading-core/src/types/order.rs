//! Order types and structures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(format!("unknown order side '{other}'")),
        }
    }
}

/// Order status.
///
/// `Pending` only exists while an order is being executed; `Executed` and
/// `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Executed,
    Failed,
}

/// Order request for submitting new orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Symbol to trade
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Number of shares
    pub quantity: Decimal,
    /// Execution price per share
    pub price: Decimal,
}

impl OrderRequest {
    /// Create an order request.
    pub fn new(symbol: impl Into<String>, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price,
        }
    }

    /// Create a buy order request.
    pub fn buy(symbol: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self::new(symbol, Side::Buy, quantity, price)
    }

    /// Create a sell order request.
    pub fn sell(symbol: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self::new(symbol, Side::Sell, quantity, price)
    }

    /// Notional value of the request, `None` if it is out of range.
    pub fn value(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.price)
    }
}

/// An order and its execution state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID
    pub id: Uuid,
    /// Symbol traded
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Number of shares
    pub quantity: Decimal,
    /// Execution price per share
    pub price: Decimal,
    /// Current status
    pub status: OrderStatus,
    /// When the order was created
    pub created_at: DateTime<Utc>,
    /// When the order was executed
    pub executed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Create a pending order from a request.
    pub fn from_request(request: &OrderRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: request.symbol.clone(),
            side: request.side,
            quantity: request.quantity,
            price: request.price,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            executed_at: None,
        }
    }

    /// Transition a pending order to executed.
    pub fn mark_executed(&mut self) {
        self.status = OrderStatus::Executed;
        self.executed_at = Some(Utc::now());
    }

    /// Transition a pending order to failed after the ledger rejected it.
    pub fn mark_failed(&mut self) {
        self.status = OrderStatus::Failed;
    }
}
