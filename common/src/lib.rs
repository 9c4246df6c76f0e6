//! Salarium Common Types
//!
//! This crate contains the shared data model for the Salarium
//! compensation-planning core: currencies and money, exchange rates with
//! provenance, compensation records, proposal rows, and timestamps.

pub mod currency;
pub mod error;
pub mod proposal;
pub mod rate;
pub mod record;
pub mod time;

pub use currency::{Currency, CurrencyMismatchError, CurrencyPair, Money};
pub use error::ValidationError;
pub use proposal::{ProposalRow, RaiseSignal};
pub use rate::{ExchangeRate, Provenance};
pub use record::{Budget, CompensationRecord, EmployeeId};
pub use time::{now, Timestamp};
