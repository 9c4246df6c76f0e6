//! The planner facade.
//!
//! Wires the rate resolver, merge engine, write scheduler and exporter into
//! one entry point the application shell drives. In-memory state is the
//! source of truth; the durable store is a write-behind copy.

use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{info, instrument, warn};

use salarium_common::{Budget, CompensationRecord, Currency, ExchangeRate, Money, ValidationError};
use salarium_merge::{parse_proposals, CompensationMergeEngine, UnmatchedRow};
use salarium_rates::{DegradationStatus, RateResolver, RateResolverConfig, RateSource};
use salarium_store::{
    ChangeTrackingScheduler, DurableStore, ExportDocument, FlushOutcome, SchedulerConfig,
    SnapshotExporter, SqliteStore,
};

use crate::config::PlannerConfig;
use crate::error::{PlannerError, PlannerResult};

/// Outcome of a proposal import.
#[derive(Debug)]
pub struct ImportSummary {
    /// Rows merged into records.
    pub matched: usize,
    /// Rows that parsed but could not be merged.
    pub unmatched: Vec<UnmatchedRow>,
    /// Rows rejected during parsing.
    pub rejected: Vec<ValidationError>,
    /// Sum of raises over merged rows.
    pub total_raise_usd: Decimal,
}

/// A new hire's salary quoted in the budget currency.
#[derive(Debug, Clone)]
pub struct NewHireQuote {
    /// The converted amount.
    pub usd_amount: Money,
    /// The rate the quote used, with provenance.
    pub rate: ExchangeRate,
    /// Resolver health at quote time.
    pub degradation: DegradationStatus,
}

struct PlannerState {
    records: Vec<CompensationRecord>,
    budget: Budget,
}

/// The compensation-planning core.
///
/// All mutation goes through this facade so every accepted change lands in
/// the write scheduler exactly once.
pub struct PlannerCore {
    resolver: RateResolver,
    engine: CompensationMergeEngine,
    scheduler: ChangeTrackingScheduler,
    exporter: SnapshotExporter,
    state: RwLock<PlannerState>,
}

impl PlannerCore {
    /// Create a planner with default configuration over the given source
    /// and store.
    pub fn new(source: Arc<dyn RateSource>, store: Arc<dyn DurableStore>) -> Self {
        Self::with_config(PlannerConfig::default(), source, store)
    }

    /// Create a planner with custom configuration.
    pub fn with_config(
        config: PlannerConfig,
        source: Arc<dyn RateSource>,
        store: Arc<dyn DurableStore>,
    ) -> Self {
        let resolver = RateResolver::with_config(
            source,
            Arc::clone(&store),
            RateResolverConfig {
                cache_duration: config.cache_duration,
                snapshot_freshness: config.snapshot_freshness,
                fetch_timeout: config.fetch_timeout,
                base_currency: Currency::usd(),
            },
        );
        let scheduler = ChangeTrackingScheduler::with_config(
            Arc::clone(&store),
            SchedulerConfig {
                delay: config.debounce_delay,
            },
        );
        let exporter = SnapshotExporter::new(store);

        Self {
            resolver,
            engine: CompensationMergeEngine::new(),
            scheduler,
            exporter,
            state: RwLock::new(PlannerState {
                records: Vec::new(),
                budget: Budget::new(Decimal::ZERO, Currency::usd()),
            }),
        }
    }

    /// Open a planner backed by the SQLite store named in the
    /// configuration.
    pub async fn open(config: PlannerConfig, source: Arc<dyn RateSource>) -> PlannerResult<Self> {
        config.validate().map_err(PlannerError::Config)?;
        let store: Arc<dyn DurableStore> = Arc::new(SqliteStore::open(&config.database_url).await?);
        Ok(Self::with_config(config, source, store))
    }

    /// Replace the working record set and budget without scheduling a
    /// write, e.g. when loading a previously committed snapshot.
    pub fn load(&self, records: Vec<CompensationRecord>, budget: Budget) {
        let mut state = self.state.write();
        state.records = records;
        state.budget = budget;
    }

    /// The current working record set.
    pub fn records(&self) -> Vec<CompensationRecord> {
        self.state.read().records.clone()
    }

    /// The current planning budget.
    pub fn budget(&self) -> Budget {
        self.state.read().budget.clone()
    }

    /// Set the planning budget and schedule a write.
    pub fn set_budget(&self, budget: Budget) {
        let records = {
            let mut state = self.state.write();
            state.budget = budget.clone();
            state.records.clone()
        };
        self.scheduler.schedule(records, budget);
    }

    /// Parse a proposal file and merge it into the working record set.
    ///
    /// File-level problems surface as errors; row-level problems are
    /// reported in the summary and never block the rest of the file. The
    /// merged state is scheduled for a debounced write.
    #[instrument(skip(self, text), fields(bytes = text.len()))]
    pub fn import_proposals(&self, text: &str) -> PlannerResult<ImportSummary> {
        let file = parse_proposals(text)?;

        let (records, budget, result) = {
            let mut state = self.state.write();
            let result = self.engine.merge(&state.records, file.rows);
            state.records = result.updated.clone();
            (state.records.clone(), state.budget.clone(), result)
        };

        self.scheduler.schedule(records, budget);

        if !file.rejected.is_empty() {
            warn!(rejected = file.rejected.len(), "Some proposal rows were rejected");
        }

        Ok(ImportSummary {
            matched: result.matched_count,
            unmatched: result.unmatched,
            rejected: file.rejected,
            total_raise_usd: result.total_raise_usd,
        })
    }

    /// Quote a native-currency salary in USD for initial record creation.
    ///
    /// This is the only operation that resolves a live rate; merges always
    /// reuse the ratio already baked into each record.
    pub async fn convert_new_hire(
        &self,
        amount: Decimal,
        from: &Currency,
    ) -> PlannerResult<NewHireQuote> {
        let resolved = self.resolver.resolve(from, &Currency::usd()).await?;
        Ok(NewHireQuote {
            usd_amount: resolved.rate.convert(amount),
            rate: resolved.rate,
            degradation: resolved.degradation,
        })
    }

    /// Write the current state immediately, bypassing the debounce window.
    pub async fn flush(&self) -> PlannerResult<FlushOutcome> {
        let (records, budget) = {
            let state = self.state.read();
            (state.records.clone(), state.budget.clone())
        };
        Ok(self.scheduler.flush_now(records, budget).await?)
    }

    /// Export the last committed snapshot, or `None` before any commit.
    pub async fn export_snapshot(&self) -> PlannerResult<Option<ExportDocument>> {
        Ok(self.exporter.export().await?)
    }

    /// Validate an export document, adopt its contents as the working
    /// state, and schedule a write.
    pub fn import_snapshot(&self, value: Value) -> PlannerResult<usize> {
        let (records, budget) = SnapshotExporter::import(value)?;
        let count = records.len();

        info!(records = count, "Imported snapshot document");

        self.load(records.clone(), budget.clone());
        self.scheduler.schedule(records, budget);
        Ok(count)
    }

    /// Current rate-resolver health.
    pub fn degradation(&self) -> DegradationStatus {
        self.resolver.degradation()
    }
}
