//! Time utilities and tuning constants for the Salarium core.

use chrono::{DateTime, Duration, Utc};

/// A timestamp with timezone (always UTC for Salarium).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Check if a timestamp has expired (is in the past).
pub fn is_expired(expiry: Timestamp) -> bool {
    now() > expiry
}

/// Calculate expiry time from now.
pub fn expires_in(duration: Duration) -> Timestamp {
    now() + duration
}

/// Default tuning constants.
pub mod constants {
    use super::Duration;

    /// How long an in-memory cached rate stays fresh (15 minutes).
    pub fn rate_cache_duration() -> Duration {
        Duration::minutes(15)
    }

    /// Freshness threshold for the shared rate snapshot (24 hours).
    pub fn snapshot_freshness() -> Duration {
        Duration::hours(24)
    }

    /// Bound on a single live rate fetch (8 seconds).
    pub fn live_fetch_timeout() -> Duration {
        Duration::seconds(8)
    }

    /// Debounce window for persistence scheduling (3 seconds).
    pub fn debounce_delay() -> Duration {
        Duration::milliseconds(3000)
    }
}

/// Duration extensions for convenient conversion.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_expired() {
        let past = now() - Duration::seconds(10);
        assert!(is_expired(past));

        let future = now() + Duration::seconds(10);
        assert!(!is_expired(future));
    }

    #[test]
    fn test_duration_as_std() {
        assert_eq!(
            Duration::seconds(8).as_std(),
            std::time::Duration::from_secs(8)
        );
        assert_eq!(Duration::seconds(-1).as_std(), std::time::Duration::ZERO);
    }
}
