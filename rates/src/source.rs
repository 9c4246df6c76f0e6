//! Live rate source trait.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use salarium_common::Currency;

use crate::error::RateResult;

/// A live exchange-rate endpoint.
///
/// Returns, for a given base currency, a mapping of target currency codes
/// to rates (amount per 1 base unit). The resolver bounds each call with a
/// timeout and never retries within a single resolution.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Get the source name, for logging.
    fn name(&self) -> &str;

    /// Fetch the full rate table for the given base currency.
    async fn fetch_table(&self, base: &Currency) -> RateResult<HashMap<String, Decimal>>;
}

/// Mock rate source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateSource {
    name: String,
    table: parking_lot::Mutex<Option<HashMap<String, Decimal>>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateSource {
    /// Create a source with no table; every fetch fails.
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: parking_lot::Mutex::new(None),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Create a source serving the given table.
    pub fn with_table(name: impl Into<String>, table: HashMap<String, Decimal>) -> Self {
        Self {
            name: name.into(),
            table: parking_lot::Mutex::new(Some(table)),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Replace the served table.
    pub fn set_table(&self, table: HashMap<String, Decimal>) {
        *self.table.lock() = Some(table);
    }

    /// Make subsequent fetches fail.
    pub fn set_failing(&self) {
        *self.table.lock() = None;
    }

    /// Number of fetches issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateSource for MockRateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_table(&self, _base: &Currency) -> RateResult<HashMap<String, Decimal>> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.table
            .lock()
            .clone()
            .ok_or_else(|| crate::error::RateError::Source("source unavailable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_source_serves_table() {
        let source = MockRateSource::with_table(
            "test",
            HashMap::from([("EUR".to_string(), dec!(0.9))]),
        );

        let table = source.fetch_table(&Currency::usd()).await.unwrap();
        assert_eq!(table["EUR"], dec!(0.9));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_source_failure() {
        let source = MockRateSource::failing("test");
        assert!(source.fetch_table(&Currency::usd()).await.is_err());
    }
}
