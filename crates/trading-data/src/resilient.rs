//! Timeout and retry around any market data provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use trading_core::error::DataError;
use trading_core::traits::MarketDataProvider;
use trading_core::types::Quote;

/// Retry policy for market data calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Per-attempt timeout
    pub timeout_ms: u64,
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay between attempts
    pub retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_attempts: 3,
            retry_delay_ms: 1_000,
        }
    }
}

/// Bounds each call with a timeout and retries transient failures.
///
/// Only errors where [`DataError::is_retryable`] holds are retried; a
/// missing symbol fails immediately.
pub struct ResilientProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: MarketDataProvider> ResilientProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn attempt(&self, symbol: &str) -> Result<Quote, DataError> {
        let timeout = Duration::from_millis(self.policy.timeout_ms);
        match tokio::time::timeout(timeout, self.inner.get_quote(symbol)).await {
            Ok(result) => result,
            Err(_) => Err(DataError::Timeout {
                symbol: symbol.to_string(),
                after_ms: self.policy.timeout_ms,
            }),
        }
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for ResilientProvider<P> {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.attempt(symbol).await {
                Ok(quote) => {
                    if attempts > 1 {
                        debug!(symbol, attempts, "Quote fetched after retry");
                    }
                    return Ok(quote);
                }
                Err(e) if e.is_retryable() && attempts < max_attempts => {
                    warn!(
                        symbol,
                        attempt = attempts,
                        max_attempts,
                        error = %e,
                        "Quote fetch failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(self.policy.retry_delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with the given error for the first `failures` calls.
    struct Flaky {
        failures: u32,
        error: DataError,
        calls: AtomicU32,
        delay: Duration,
    }

    impl Flaky {
        fn new(failures: u32, error: DataError) -> Self {
            Self {
                failures,
                error,
                calls: AtomicU32::new(0),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for Flaky {
        async fn get_quote(&self, symbol: &str) -> Result<Quote, DataError> {
            tokio::time::sleep(self.delay).await;
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(self.error.clone())
            } else {
                Ok(Quote::new(symbol))
            }
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_errors() {
        let provider = ResilientProvider::new(
            Flaky::new(2, DataError::ConnectionError("reset".into())),
            RetryPolicy::default(),
        );

        assert!(provider.get_quote("AAPL").await.is_ok());
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let provider = ResilientProvider::new(
            Flaky::new(5, DataError::Internal("503".into())),
            RetryPolicy::default(),
        );

        assert_eq!(
            provider.get_quote("AAPL").await,
            Err(DataError::Internal("503".into()))
        );
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_retry_missing_symbol() {
        let provider = ResilientProvider::new(
            Flaky::new(1, DataError::SymbolNotFound("ZZZ".into())),
            RetryPolicy::default(),
        );

        assert!(provider.get_quote("ZZZ").await.is_err());
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let mut slow = Flaky::new(0, DataError::Internal(String::new()));
        slow.delay = Duration::from_secs(30);
        let provider = ResilientProvider::new(
            slow,
            RetryPolicy {
                max_attempts: 2,
                ..Default::default()
            },
        );

        assert_eq!(
            provider.get_quote("AAPL").await,
            Err(DataError::Timeout {
                symbol: "AAPL".into(),
                after_ms: 10_000
            })
        );
    }
}
