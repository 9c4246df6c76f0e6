//! Planner configuration.

use chrono::Duration;

/// Main planner configuration.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Freshness window for in-memory cached rates.
    pub cache_duration: Duration,
    /// Freshness threshold for the shared rate snapshot.
    pub snapshot_freshness: Duration,
    /// Bound on a single live rate fetch.
    pub fetch_timeout: Duration,
    /// Quiet period before a scheduled snapshot write fires.
    pub debounce_delay: Duration,
    /// Durable store URL.
    pub database_url: String,
    /// Log level.
    pub log_level: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        use salarium_common::time::constants;
        Self {
            cache_duration: constants::rate_cache_duration(),
            snapshot_freshness: constants::snapshot_freshness(),
            fetch_timeout: constants::live_fetch_timeout(),
            debounce_delay: constants::debounce_delay(),
            database_url: "sqlite://salarium.db".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SALARIUM_DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(level) = std::env::var("SALARIUM_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Ok(ms) = std::env::var("SALARIUM_DEBOUNCE_MS") {
            if let Ok(ms) = ms.parse() {
                config.debounce_delay = Duration::milliseconds(ms);
            }
        }

        if let Ok(ms) = std::env::var("SALARIUM_FETCH_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.fetch_timeout = Duration::milliseconds(ms);
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        if self.fetch_timeout <= Duration::zero() {
            return Err("Fetch timeout must be positive".to_string());
        }

        if self.debounce_delay < Duration::zero() {
            return Err("Debounce delay cannot be negative".to_string());
        }

        if self.cache_duration > self.snapshot_freshness {
            return Err("Cache duration cannot exceed snapshot freshness".to_string());
        }

        Ok(())
    }
}
