//! Salarium Planner
//!
//! Composition root for the compensation-planning core. Wires the rate
//! resolver, proposal reconciliation engine, change-aware write scheduler
//! and snapshot exporter behind one facade, with configuration and tracing
//! setup for the application shell.

pub mod config;
pub mod core;
pub mod error;
pub mod telemetry;

pub use config::PlannerConfig;
pub use core::{ImportSummary, NewHireQuote, PlannerCore};
pub use error::{PlannerError, PlannerResult};
pub use telemetry::init_tracing;
