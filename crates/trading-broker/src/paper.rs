//! Paper trading broker.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use trading_core::error::BrokerError;
use trading_core::traits::{Broker, MarketDataProvider};
use trading_core::types::{
    normalize_symbol, Order, OrderRequest, PortfolioSummary, Position, PositionView, Side,
};

use crate::PortfolioLedger;

/// Ledger plus the executed-order log, guarded together.
#[derive(Debug)]
struct BrokerState {
    ledger: PortfolioLedger,
    trade_history: Vec<Order>,
}

/// Simulated broker that fills every valid order in full at its limit price.
///
/// Execution holds the state lock for the whole validate-apply-record step
/// and never across an `.await`, so concurrent callers are serialized.
pub struct PaperBroker {
    state: Mutex<BrokerState>,
    market_data: Arc<dyn MarketDataProvider>,
}

impl PaperBroker {
    /// Create a broker with initial cash, valuing positions via `market_data`.
    pub fn new(initial_balance: Decimal, market_data: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            state: Mutex::new(BrokerState {
                ledger: PortfolioLedger::new(initial_balance),
                trade_history: Vec::new(),
            }),
            market_data,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and execute an order synchronously.
    pub fn execute(&self, request: OrderRequest) -> Result<Order, BrokerError> {
        if request.quantity <= Decimal::ZERO {
            return Err(BrokerError::InvalidOrder(format!(
                "quantity must be positive, got {}",
                request.quantity
            )));
        }
        if request.price <= Decimal::ZERO {
            return Err(BrokerError::InvalidOrder(format!(
                "price must be positive, got {}",
                request.price
            )));
        }
        if request.value().is_none() {
            return Err(BrokerError::InvalidOrder(format!(
                "order value {} x {} is out of range",
                request.quantity, request.price
            )));
        }
        let symbol = normalize_symbol(&request.symbol);
        if symbol.is_empty() {
            return Err(BrokerError::InvalidOrder("symbol is empty".into()));
        }

        let mut order = Order::from_request(&OrderRequest { symbol, ..request });

        let mut state = self.lock();
        let applied = match order.side {
            Side::Buy => state.ledger.apply_buy(&order.symbol, order.quantity, order.price),
            Side::Sell => state.ledger.apply_sell(&order.symbol, order.quantity, order.price),
        };
        if let Err(e) = applied {
            drop(state);
            order.mark_failed();
            warn!(
                order_id = %order.id,
                symbol = %order.symbol,
                side = %order.side,
                status = ?order.status,
                error = %e,
                "Order rejected"
            );
            return Err(e);
        }

        order.mark_executed();
        state.trade_history.push(order.clone());
        let cash = state.ledger.cash_balance();
        drop(state);

        info!(
            order_id = %order.id,
            symbol = %order.symbol,
            side = %order.side,
            quantity = %order.quantity,
            price = %order.price,
            cash = %cash,
            "Order executed"
        );
        Ok(order)
    }

    /// Snapshot of cash and positions.
    pub fn ledger(&self) -> PortfolioLedger {
        self.lock().ledger.clone()
    }

    /// Current prices for every held symbol. Unpriceable symbols are skipped.
    async fn held_prices(&self) -> HashMap<String, Decimal> {
        let symbols = self.lock().ledger.portfolio().symbols();

        let mut prices = HashMap::with_capacity(symbols.len());
        for symbol in symbols {
            match self.market_data.current_price(&symbol).await {
                Ok(price) => {
                    prices.insert(symbol, price);
                }
                Err(e) => warn!(symbol = %symbol, error = %e, "No price, excluding from valuation"),
            }
        }
        prices
    }
}

#[async_trait]
impl Broker for PaperBroker {
    async fn place_order(&self, request: OrderRequest) -> Result<Order, BrokerError> {
        self.execute(request)
    }

    async fn position(&self, symbol: &str) -> Option<Position> {
        self.lock()
            .ledger
            .position(&normalize_symbol(symbol))
            .cloned()
    }

    async fn portfolio_value(&self) -> Decimal {
        let prices = self.held_prices().await;
        self.lock().ledger.portfolio_value(&prices)
    }

    async fn portfolio_summary(&self) -> PortfolioSummary {
        let prices = self.held_prices().await;
        self.lock().ledger.summary(&prices)
    }

    async fn active_positions(&self) -> BTreeMap<String, PositionView> {
        let prices = self.held_prices().await;
        self.lock().ledger.active_positions(&prices)
    }

    async fn trade_history(&self) -> Vec<Order> {
        self.lock().trade_history.clone()
    }

    fn name(&self) -> &str {
        "paper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trading_core::error::DataError;
    use trading_core::types::{OrderStatus, Quote};

    struct FixedPrices(HashMap<String, Decimal>);

    #[async_trait]
    impl MarketDataProvider for FixedPrices {
        async fn get_quote(&self, symbol: &str) -> Result<Quote, DataError> {
            self.0
                .get(symbol)
                .map(|price| Quote::new(symbol).with_price(*price))
                .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn setup_broker(prices: &[(&str, Decimal)]) -> PaperBroker {
        let prices = prices
            .iter()
            .map(|(symbol, price)| (symbol.to_string(), *price))
            .collect();
        PaperBroker::new(dec!(100000), Arc::new(FixedPrices(prices)))
    }

    #[tokio::test]
    async fn test_buy_sell_scenario() {
        let broker = setup_broker(&[("AAPL", dec!(180))]);

        let order = broker
            .place_order(OrderRequest::buy("AAPL", dec!(10), dec!(150)))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Executed);
        assert!(order.executed_at.is_some());
        assert_eq!(broker.ledger().cash_balance(), dec!(98500));

        broker
            .place_order(OrderRequest::buy("AAPL", dec!(10), dec!(170)))
            .await
            .unwrap();
        let position = broker.position("AAPL").await.unwrap();
        assert_eq!(position.quantity, dec!(20));
        assert_eq!(position.average_price, dec!(160));
        assert_eq!(broker.ledger().cash_balance(), dec!(96800));

        let err = broker
            .place_order(OrderRequest::sell("AAPL", dec!(25), dec!(180)))
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::InsufficientShares { .. }));
        let position = broker.position("AAPL").await.unwrap();
        assert_eq!(position.quantity, dec!(20));
        assert_eq!(position.average_price, dec!(160));
        assert_eq!(broker.ledger().cash_balance(), dec!(96800));
        assert_eq!(broker.trade_history().await.len(), 2);

        broker
            .place_order(OrderRequest::sell("AAPL", dec!(20), dec!(180)))
            .await
            .unwrap();
        assert!(broker.position("AAPL").await.is_none());
        assert_eq!(broker.ledger().cash_balance(), dec!(100400));

        let history = broker.trade_history().await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].side, Side::Sell);
    }

    #[tokio::test]
    async fn test_invalid_orders_rejected() {
        let broker = setup_broker(&[]);

        for request in [
            OrderRequest::buy("AAPL", Decimal::ZERO, dec!(150)),
            OrderRequest::buy("AAPL", dec!(1), dec!(-1)),
            OrderRequest::sell("  ", dec!(1), dec!(1)),
        ] {
            assert!(matches!(
                broker.place_order(request).await,
                Err(BrokerError::InvalidOrder(_))
            ));
        }
        assert!(broker.trade_history().await.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_order_rejected() {
        let broker = setup_broker(&[]);
        let huge = dec!(1000000000000000);

        let err = broker
            .place_order(OrderRequest::buy("AAPL", huge, huge))
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::InvalidOrder(_)));
        assert_eq!(broker.ledger().cash_balance(), dec!(100000));
        assert!(broker.trade_history().await.is_empty());

        // The broker stays usable afterwards
        broker
            .place_order(OrderRequest::buy("AAPL", dec!(1), dec!(150)))
            .await
            .unwrap();
        assert_eq!(broker.trade_history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_symbol_normalized() {
        let broker = setup_broker(&[]);
        let order = broker
            .place_order(OrderRequest::buy("tse:7203", dec!(1), dec!(2500)))
            .await
            .unwrap();
        assert_eq!(order.symbol, "7203.T");
        assert!(broker.position("TSE:7203").await.is_some());
    }

    #[tokio::test]
    async fn test_valuation() {
        let broker = setup_broker(&[("AAPL", dec!(160))]);
        broker
            .place_order(OrderRequest::buy("AAPL", dec!(100), dec!(150)))
            .await
            .unwrap();
        broker
            .place_order(OrderRequest::buy("DELISTED", dec!(10), dec!(10)))
            .await
            .unwrap();

        // 100000 - 15000 - 100 + 16000; DELISTED has no price
        assert_eq!(broker.portfolio_value().await, dec!(100900));

        let summary = broker.portfolio_summary().await;
        assert_eq!(summary.cash_balance, dec!(84900));
        assert_eq!(summary.position_count, 2);
        assert_eq!(summary.total_return_percent, dec!(0.9));

        let positions = broker.active_positions().await;
        assert_eq!(positions.len(), 1);
        assert_eq!(positions["AAPL"].market_value, dec!(16000));
    }

    #[tokio::test]
    async fn test_concurrent_orders_serialize() {
        let broker = Arc::new(PaperBroker::new(
            dec!(1000),
            Arc::new(FixedPrices(HashMap::new())),
        ));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let broker = Arc::clone(&broker);
            handles.push(tokio::spawn(async move {
                broker.execute(OrderRequest::buy("AAPL", dec!(1), dec!(100)))
            }));
        }

        let mut filled = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                filled += 1;
            }
        }

        assert_eq!(filled, 10);
        assert_eq!(broker.ledger().cash_balance(), Decimal::ZERO);
        assert_eq!(broker.trade_history().await.len(), 10);
    }
}
