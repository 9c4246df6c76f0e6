//! Salarium Proposal Reconciliation
//!
//! Merges manager-submitted raise proposals into existing compensation
//! records, re-deriving every dependent financial field using the exchange
//! ratio each record was originally computed with, so reconciled numbers
//! match what the reviewer saw regardless of live-rate drift.

pub mod engine;
pub mod ingest;

pub use engine::{CompensationMergeEngine, MergeResult, UnmatchedRow};
pub use ingest::{parse_proposals, ProposalFile};
