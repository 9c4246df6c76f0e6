//! Multi-tier exchange-rate resolution.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Duration;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use salarium_common::time::{constants, DurationExt};
use salarium_common::{now, Currency, CurrencyPair, ExchangeRate, Money, Provenance, Timestamp};
use salarium_store::DurableStore;

use crate::cache::RateCacheStore;
use crate::convert::{ConversionItem, ConversionOutcome};
use crate::error::{RateError, RateResult};
use crate::fallback;
use crate::snapshot::SharedSnapshot;
use crate::source::RateSource;

/// Configuration for the rate resolver.
#[derive(Debug, Clone)]
pub struct RateResolverConfig {
    /// Freshness window for tier-1 cached rates.
    pub cache_duration: Duration,
    /// Freshness threshold for the tier-2 shared snapshot.
    pub snapshot_freshness: Duration,
    /// Bound on a single tier-3 live fetch.
    pub fetch_timeout: Duration,
    /// Denomination currency of fetched rate tables.
    pub base_currency: Currency,
}

impl Default for RateResolverConfig {
    fn default() -> Self {
        Self {
            cache_duration: constants::rate_cache_duration(),
            snapshot_freshness: constants::snapshot_freshness(),
            fetch_timeout: constants::live_fetch_timeout(),
            base_currency: Currency::usd(),
        }
    }
}

/// Whether the resolver has been forced down to the static fallback table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationStatus {
    /// Live or cached data is being served.
    Healthy,
    /// The static fallback produced the most recent result; the UI should
    /// warn that live data is unavailable.
    Degraded {
        /// When degradation began.
        since: Timestamp,
    },
}

impl DegradationStatus {
    /// Whether the resolver is degraded.
    pub fn is_degraded(&self) -> bool {
        matches!(self, DegradationStatus::Degraded { .. })
    }
}

/// A resolved rate together with the resolver's degradation status.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The resolved exchange rate.
    pub rate: ExchangeRate,
    /// Degradation status after this resolution.
    pub degradation: DegradationStatus,
}

/// Resolves exchange rates through four tiers, first success wins:
/// in-memory cache, shared snapshot, live fetch, static fallback table.
///
/// Never suspends longer than the fetch timeout and fails only when every
/// tier is exhausted for a pair.
pub struct RateResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    cache: RateCacheStore,
    source: Arc<dyn RateSource>,
    store: Arc<dyn DurableStore>,
    config: RateResolverConfig,
    last_degraded_at: Mutex<Option<Timestamp>>,
    refreshing: AtomicBool,
}

impl RateResolver {
    /// Create a resolver with default configuration.
    pub fn new(source: Arc<dyn RateSource>, store: Arc<dyn DurableStore>) -> Self {
        Self::with_config(source, store, RateResolverConfig::default())
    }

    /// Create a resolver with custom configuration.
    pub fn with_config(
        source: Arc<dyn RateSource>,
        store: Arc<dyn DurableStore>,
        config: RateResolverConfig,
    ) -> Self {
        let cache = RateCacheStore::with_duration(Arc::clone(&store), config.cache_duration);
        Self {
            inner: Arc::new(ResolverInner {
                cache,
                source,
                store,
                config,
                last_degraded_at: Mutex::new(None),
                refreshing: AtomicBool::new(false),
            }),
        }
    }

    /// Resolve a conversion rate for the pair.
    #[instrument(skip(self), fields(from = %from, to = %to))]
    pub async fn resolve(&self, from: &Currency, to: &Currency) -> RateResult<Resolved> {
        // Identity conversions are treated as always-fresh and tagged
        // `cached`. This short-circuits ahead of the tiers and does not
        // touch the degradation state.
        if from == to {
            return Ok(self.resolved(ExchangeRate::identity(from.clone())));
        }

        let pair = CurrencyPair::new(from.clone(), to.clone());

        // Tier 1: in-memory cache (with durable mirror).
        if let Some(rate) = self.inner.cache.get(&pair).await {
            self.inner.clear_degraded();
            return Ok(self.resolved(rate));
        }

        // Tier 2: shared snapshot. A stale table is still served for this
        // call; revalidation happens in the background.
        if let Some(snapshot) = SharedSnapshot::load(self.inner.store.as_ref()).await {
            if let Some(value) = snapshot.rate_between(from, to) {
                if !snapshot.is_fresh(self.inner.config.snapshot_freshness) {
                    debug!(pair = %pair, "Serving stale snapshot, revalidating in background");
                    self.spawn_revalidation();
                }
                self.inner.clear_degraded();
                let rate = ExchangeRate {
                    pair,
                    rate: value,
                    observed_at: snapshot.fetched_at,
                    provenance: Provenance::SharedSnapshot,
                };
                return Ok(self.resolved(rate));
            }
        }

        // Tier 3: live fetch, no retry within this resolution. The fetched
        // table is persisted whole as the shared snapshot; only the
        // requested pair enters the per-pair cache, so sibling pairs from
        // the same fetch resolve via tier 2 with `sharedSnapshot`
        // provenance.
        match self.inner.fetch_table().await {
            Ok(snapshot) => {
                if let Some(value) = snapshot.rate_between(from, to) {
                    let rate = ExchangeRate::new(pair, value, Provenance::Live);
                    self.inner.cache.put(rate.clone()).await;
                    self.inner.clear_degraded();
                    return Ok(self.resolved(rate));
                }
                debug!(pair = %pair, "Live table lacks a leg, trying static fallback");
            }
            Err(e) => {
                warn!(pair = %pair, error = %e, "Live fetch failed, trying static fallback");
            }
        }

        // Tier 4: bundled static table. Not cached, so later resolutions
        // keep probing the live tiers.
        if let Some(value) = fallback::cross_rate(from.code(), to.code()) {
            self.inner.mark_degraded();
            info!(pair = %pair, "Serving static fallback rate");
            let rate = ExchangeRate::new(pair, value, Provenance::StaticFallback);
            return Ok(self.resolved(rate));
        }

        Err(RateError::Unavailable {
            from: from.clone(),
            to: to.clone(),
        })
    }

    /// Resolve and convert a single amount.
    pub async fn convert(&self, amount: Decimal, from: &Currency, to: &Currency) -> RateResult<Money> {
        let resolved = self.resolve(from, to).await?;
        Ok(resolved.rate.convert(amount))
    }

    /// Convert a batch of amounts, independently per item.
    ///
    /// One item's exhaustion never aborts the others; a failed item is
    /// returned as "no conversion performed".
    pub async fn resolve_many(&self, items: Vec<ConversionItem>) -> Vec<ConversionOutcome> {
        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            match self.resolve(&item.from, &item.to).await {
                Ok(resolved) => {
                    outcomes.push(ConversionOutcome::converted(
                        item,
                        resolved.rate,
                        resolved.degradation,
                    ));
                }
                Err(e) => {
                    debug!(from = %item.from, to = %item.to, error = %e, "Conversion skipped");
                    outcomes.push(ConversionOutcome::unconverted(item, self.degradation()));
                }
            }
        }
        outcomes
    }

    /// Current degradation status.
    pub fn degradation(&self) -> DegradationStatus {
        match *self.inner.last_degraded_at.lock() {
            Some(since) => DegradationStatus::Degraded { since },
            None => DegradationStatus::Healthy,
        }
    }

    /// When the resolver last fell back to the static table, if it has not
    /// recovered since.
    pub fn last_degraded_at(&self) -> Option<Timestamp> {
        *self.inner.last_degraded_at.lock()
    }

    fn resolved(&self, rate: ExchangeRate) -> Resolved {
        Resolved {
            rate,
            degradation: self.degradation(),
        }
    }

    /// Kick off a background tier-3 refresh of the shared snapshot.
    ///
    /// Fire-and-forget: must not block or fail the caller's in-flight
    /// resolution. At most one refresh is in flight at a time.
    fn spawn_revalidation(&self) {
        if self.inner.refreshing.swap(true, Ordering::SeqCst) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match inner.fetch_table().await {
                Ok(_) => inner.clear_degraded(),
                Err(e) => debug!(error = %e, "Background snapshot refresh failed"),
            }
            inner.refreshing.store(false, Ordering::SeqCst);
        });
    }
}

impl ResolverInner {
    /// Fetch the full live table under the configured timeout and persist
    /// it as the new shared snapshot.
    async fn fetch_table(&self) -> RateResult<SharedSnapshot> {
        let bound = self.config.fetch_timeout.as_std();
        let table = tokio::time::timeout(bound, self.source.fetch_table(&self.config.base_currency))
            .await
            .map_err(|_| RateError::Timeout {
                ms: self.config.fetch_timeout.num_milliseconds(),
            })??;

        let snapshot = SharedSnapshot::new(self.config.base_currency.clone(), table);
        snapshot.save(self.store.as_ref()).await;
        Ok(snapshot)
    }

    fn mark_degraded(&self) {
        let mut guard = self.last_degraded_at.lock();
        if guard.is_none() {
            *guard = Some(now());
        }
    }

    fn clear_degraded(&self) {
        *self.last_degraded_at.lock() = None;
    }
}
