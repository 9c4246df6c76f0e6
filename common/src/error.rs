//! Shared validation errors for input surfaces.

use thiserror::Error;

/// Malformed input file, row, or document.
///
/// This is the only input-shaped error that surfaces to the user from the
/// top-level import entry points; per-row problems inside an otherwise
/// valid file are collected, not thrown.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The input was empty or had no header row.
    #[error("Input is empty or has no header row")]
    EmptyInput,

    /// No recognizable identity column in the header.
    #[error("No recognizable '{0}' column in header")]
    MissingColumn(String),

    /// A row failed validation.
    #[error("Row {line}: {reason}")]
    BadRow { line: usize, reason: String },

    /// An imported document had an unsupported version.
    #[error("Unsupported document version {0}")]
    UnsupportedVersion(u32),

    /// An imported document failed shape validation.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

impl ValidationError {
    /// Create a row-level validation error.
    pub fn bad_row(line: usize, reason: impl Into<String>) -> Self {
        Self::BadRow {
            line,
            reason: reason.into(),
        }
    }
}
