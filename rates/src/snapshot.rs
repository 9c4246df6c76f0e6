//! Shared rate snapshot (tier 2).

use std::collections::HashMap;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use salarium_common::{now, Currency, Timestamp};
use salarium_store::DurableStore;

/// Durable key holding the shared snapshot.
pub const SNAPSHOT_KEY: &str = "rate-snapshot/latest";

/// A previously fetched full rate table, longer-lived than the per-pair
/// cache. Rates are denominated in the base currency (amount per 1 base
/// unit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedSnapshot {
    /// Denomination currency of the table (typically USD).
    pub base: Currency,
    /// Currency code -> amount per base unit.
    pub rates: HashMap<String, Decimal>,
    /// When the table was fetched.
    pub fetched_at: Timestamp,
}

impl SharedSnapshot {
    /// Create a snapshot fetched now.
    pub fn new(base: Currency, rates: HashMap<String, Decimal>) -> Self {
        Self {
            base,
            rates,
            fetched_at: now(),
        }
    }

    /// Whether the snapshot is younger than the freshness threshold.
    pub fn is_fresh(&self, threshold: Duration) -> bool {
        now().signed_duration_since(self.fetched_at) < threshold
    }

    /// Cross rate `from -> to` computed through the base denomination.
    /// Both legs must be present (the base itself counts as 1).
    pub fn rate_between(&self, from: &Currency, to: &Currency) -> Option<Decimal> {
        let from_leg = self.leg(from)?;
        let to_leg = self.leg(to)?;
        if from_leg.is_zero() {
            return None;
        }
        Some(to_leg / from_leg)
    }

    fn leg(&self, currency: &Currency) -> Option<Decimal> {
        if *currency == self.base {
            return Some(Decimal::ONE);
        }
        self.rates.get(currency.code()).copied()
    }

    /// Load the stored snapshot, regardless of freshness. The caller
    /// decides whether a stale table is still worth serving.
    pub async fn load(store: &dyn DurableStore) -> Option<SharedSnapshot> {
        match store.get(SNAPSHOT_KEY).await {
            Ok(Some(entry)) => match serde_json::from_value(entry.value) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable shared snapshot");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Shared snapshot read failed");
                None
            }
        }
    }

    /// Persist this snapshot, superseding the previous one.
    pub async fn save(&self, store: &dyn DurableStore) {
        match serde_json::to_value(self) {
            Ok(value) => {
                if let Err(e) = store.put(SNAPSHOT_KEY, value).await {
                    warn!(error = %e, "Shared snapshot write failed");
                }
            }
            Err(e) => warn!(error = %e, "Shared snapshot serialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use salarium_store::MemoryStore;

    fn table() -> HashMap<String, Decimal> {
        HashMap::from([
            ("EUR".to_string(), dec!(0.9)),
            ("GBP".to_string(), dec!(0.8)),
        ])
    }

    #[test]
    fn test_rate_between_cross() {
        let snapshot = SharedSnapshot::new(Currency::usd(), table());

        // EUR -> GBP through USD: 0.8 / 0.9
        let rate = snapshot
            .rate_between(&Currency::eur(), &Currency::gbp())
            .unwrap();
        assert_eq!(rate, dec!(0.8) / dec!(0.9));
    }

    #[test]
    fn test_base_leg_is_unit() {
        let snapshot = SharedSnapshot::new(Currency::usd(), table());

        let rate = snapshot
            .rate_between(&Currency::eur(), &Currency::usd())
            .unwrap();
        assert_eq!(rate, Decimal::ONE / dec!(0.9));
    }

    #[test]
    fn test_missing_leg() {
        let snapshot = SharedSnapshot::new(Currency::usd(), table());
        assert!(snapshot
            .rate_between(&Currency::eur(), &Currency::new("XXX"))
            .is_none());
    }

    #[test]
    fn test_freshness() {
        let mut snapshot = SharedSnapshot::new(Currency::usd(), table());
        assert!(snapshot.is_fresh(Duration::hours(24)));

        snapshot.fetched_at = now() - Duration::hours(25);
        assert!(!snapshot.is_fresh(Duration::hours(24)));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = MemoryStore::new();
        let snapshot = SharedSnapshot::new(Currency::usd(), table());

        snapshot.save(&store).await;

        let loaded = SharedSnapshot::load(&store).await.unwrap();
        assert_eq!(loaded, snapshot);
    }
}
