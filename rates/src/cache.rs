//! Exchange-rate caching (tier 1) with a durable mirror.

use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use tracing::{debug, warn};

use salarium_common::time::constants;
use salarium_common::{CurrencyPair, ExchangeRate, Provenance};
use salarium_store::DurableStore;

/// Durable store of exchange rates keyed by currency pair, fronted by an
/// in-memory map. Exclusively owns the stored `ExchangeRate` entries; a
/// stale entry is replaced, never mutated in place.
pub struct RateCacheStore {
    memory: DashMap<String, ExchangeRate>,
    store: Arc<dyn DurableStore>,
    cache_duration: Duration,
}

impl RateCacheStore {
    /// Create a cache with the default 15-minute freshness window.
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self::with_duration(store, constants::rate_cache_duration())
    }

    /// Create a cache with a custom freshness window.
    pub fn with_duration(store: Arc<dyn DurableStore>, cache_duration: Duration) -> Self {
        Self {
            memory: DashMap::new(),
            store,
            cache_duration,
        }
    }

    /// Get a fresh rate for the pair, if one is cached.
    ///
    /// Hits are re-tagged with `cached` provenance regardless of the tier
    /// that originally produced the entry.
    pub async fn get(&self, pair: &CurrencyPair) -> Option<ExchangeRate> {
        let key = Self::key(pair);

        if let Some(entry) = self.memory.get(&key) {
            if entry.is_fresh(self.cache_duration) {
                debug!(pair = %pair, "Rate cache hit");
                return Some(Self::as_cached(entry.clone()));
            }
            debug!(pair = %pair, "Rate cache entry expired");
            drop(entry);
            self.memory.remove(&key);
        }

        // Durable mirror covers fresh entries written before a restart.
        match self.store.get_fresh(&key, self.cache_duration).await {
            Ok(Some(entry)) => match serde_json::from_value::<ExchangeRate>(entry.value) {
                // Freshness is judged on the rate's own observation time,
                // not the time the mirror entry was written.
                Ok(rate) if rate.is_fresh(self.cache_duration) => {
                    self.memory.insert(key, rate.clone());
                    debug!(pair = %pair, "Rate cache hit from durable mirror");
                    Some(Self::as_cached(rate))
                }
                Ok(_) => {
                    debug!(pair = %pair, "Durable rate entry stale");
                    None
                }
                Err(e) => {
                    warn!(pair = %pair, error = %e, "Discarding unreadable cached rate");
                    None
                }
            },
            Ok(None) => {
                debug!(pair = %pair, "Rate cache miss");
                None
            }
            Err(e) => {
                // A failing mirror degrades to a miss; the resolver falls
                // through to the next tier.
                warn!(pair = %pair, error = %e, "Durable rate read failed");
                None
            }
        }
    }

    /// Insert a rate, writing through to the durable mirror.
    ///
    /// A failed durable write is logged and does not fail the caller; the
    /// in-memory entry still serves until expiry.
    pub async fn put(&self, rate: ExchangeRate) {
        let key = Self::key(&rate.pair);

        match serde_json::to_value(&rate) {
            Ok(value) => {
                if let Err(e) = self.store.put(&key, value).await {
                    warn!(pair = %rate.pair, error = %e, "Durable rate write failed");
                }
            }
            Err(e) => warn!(pair = %rate.pair, error = %e, "Rate serialization failed"),
        }

        self.memory.insert(key, rate);
    }

    /// Number of in-memory entries.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Check if the in-memory cache is empty.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Drop all in-memory entries (the durable mirror is untouched).
    pub fn clear(&self) {
        self.memory.clear();
    }

    fn key(pair: &CurrencyPair) -> String {
        format!("rate/{}/{}", pair.from.code(), pair.to.code())
    }

    fn as_cached(rate: ExchangeRate) -> ExchangeRate {
        ExchangeRate {
            provenance: Provenance::Cached,
            ..rate
        }
    }
}
