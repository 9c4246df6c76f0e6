//! Top-level planner errors.

use thiserror::Error;

use salarium_common::ValidationError;
use salarium_rates::RateError;
use salarium_store::StoreError;

/// Any error surfaced by the planner facade.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Malformed input file or document.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rate resolution exhausted every tier.
    #[error(transparent)]
    Rate(#[from] RateError),

    /// Durable store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias for planner operations.
pub type PlannerResult<T> = Result<T, PlannerError>;
