//! Exchange rates with provenance tracking.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::{Currency, CurrencyPair, Money};
use crate::time::{now, Timestamp};

/// Which resolution tier produced an exchange rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    /// Fetched from the live rate source in this resolution.
    Live,
    /// Read from the longer-lived shared snapshot table.
    SharedSnapshot,
    /// Computed from the bundled static fallback table.
    StaticFallback,
    /// Served from the in-memory cache (also used for identity conversions).
    Cached,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Provenance::Live => "live",
            Provenance::SharedSnapshot => "sharedSnapshot",
            Provenance::StaticFallback => "staticFallback",
            Provenance::Cached => "cached",
        };
        write!(f, "{}", s)
    }
}

/// An exchange rate between two currencies.
///
/// Immutable once created; a stale entry is replaced, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// The currency pair.
    pub pair: CurrencyPair,
    /// Conversion rate (amount in `to` per unit of `from`). Always > 0.
    pub rate: Decimal,
    /// When this rate was observed.
    pub observed_at: Timestamp,
    /// Which resolution tier produced it.
    pub provenance: Provenance,
}

impl ExchangeRate {
    /// Create a new rate observed now.
    pub fn new(pair: CurrencyPair, rate: Decimal, provenance: Provenance) -> Self {
        Self {
            pair,
            rate,
            observed_at: now(),
            provenance,
        }
    }

    /// The always-fresh identity rate for a currency.
    ///
    /// Same-currency conversions skip the resolution tiers entirely and
    /// are tagged `cached`.
    pub fn identity(currency: Currency) -> Self {
        Self::new(
            CurrencyPair::new(currency.clone(), currency),
            Decimal::ONE,
            Provenance::Cached,
        )
    }

    /// Age of this rate relative to now.
    pub fn age(&self) -> Duration {
        now().signed_duration_since(self.observed_at)
    }

    /// Whether the rate is younger than the given maximum age.
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.age() < max_age
    }

    /// Convert an amount in the pair's `from` currency.
    pub fn convert(&self, amount: Decimal) -> Money {
        Money::new(amount * self.rate, self.pair.to.clone()).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_identity_rate() {
        let rate = ExchangeRate::identity(Currency::eur());
        assert_eq!(rate.rate, Decimal::ONE);
        assert_eq!(rate.provenance, Provenance::Cached);
        assert!(rate.pair.is_identity());
    }

    #[test]
    fn test_convert_rounds_to_currency() {
        let pair = CurrencyPair::new(Currency::eur(), Currency::usd());
        let rate = ExchangeRate::new(pair, dec!(1.1655), Provenance::StaticFallback);

        let converted = rate.convert(dec!(100));
        assert_eq!(converted.currency, Currency::usd());
        assert_eq!(converted.value, dec!(116.55));
    }

    #[test]
    fn test_freshness() {
        let pair = CurrencyPair::new(Currency::eur(), Currency::usd());
        let mut rate = ExchangeRate::new(pair, dec!(1.1), Provenance::Live);

        assert!(rate.is_fresh(Duration::minutes(15)));

        rate.observed_at = now() - Duration::minutes(16);
        assert!(!rate.is_fresh(Duration::minutes(15)));
    }

    #[test]
    fn test_provenance_display() {
        assert_eq!(Provenance::SharedSnapshot.to_string(), "sharedSnapshot");
        assert_eq!(Provenance::StaticFallback.to_string(), "staticFallback");
    }
}
