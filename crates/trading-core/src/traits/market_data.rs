//! Market data provider trait.

use crate::error::DataError;
use crate::types::Quote;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Source of current prices and indicator bags.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the latest quote for a symbol.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, DataError>;

    /// Fetch a strictly positive current price.
    async fn current_price(&self, symbol: &str) -> Result<Decimal, DataError> {
        self.get_quote(symbol).await?.last_price()
    }

    /// Get the provider name.
    fn name(&self) -> &str;
}

#[async_trait]
impl<P> MarketDataProvider for Arc<P>
where
    P: MarketDataProvider + ?Sized,
{
    async fn get_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        (**self).get_quote(symbol).await
    }

    async fn current_price(&self, symbol: &str) -> Result<Decimal, DataError> {
        (**self).current_price(symbol).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
