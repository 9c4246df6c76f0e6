//! Manual snapshot export and validating import.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use salarium_common::{now, Budget, CompensationRecord, Timestamp, ValidationError};

use crate::error::StoreResult;
use crate::kv::DurableStore;
use crate::scheduler::LATEST_SNAPSHOT_KEY;
use crate::snapshot::SnapshotState;

/// Current export document version.
pub const EXPORT_VERSION: u32 = 1;

/// Self-describing export of a committed snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Document format version.
    pub version: u32,
    /// When the export was produced.
    pub exported_at: Timestamp,
    /// Hash of the exported state.
    pub content_hash: String,
    /// The planning budget.
    pub budget: Budget,
    /// Records in employee-id order.
    pub records: Vec<CompensationRecord>,
}

/// Exposes the last committed snapshot for manual, user-initiated export.
///
/// Performs no implicit network or filesystem writes; every output requires
/// explicit user action.
pub struct SnapshotExporter {
    store: Arc<dyn DurableStore>,
}

impl SnapshotExporter {
    /// Create an exporter over the given store.
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Produce an export document from the last committed snapshot, or
    /// `None` if nothing has been committed yet.
    pub async fn export(&self) -> StoreResult<Option<ExportDocument>> {
        let Some(entry) = self.store.get(LATEST_SNAPSHOT_KEY).await? else {
            return Ok(None);
        };
        let snapshot: SnapshotState = serde_json::from_value(entry.value)?;

        info!(snapshot_id = %snapshot.id, "Exporting snapshot");

        Ok(Some(ExportDocument {
            version: EXPORT_VERSION,
            exported_at: now(),
            content_hash: snapshot.content_hash.clone(),
            budget: snapshot.budget.clone(),
            records: snapshot.records_ordered(),
        }))
    }

    /// Validate an incoming document and return its records and budget.
    ///
    /// The structural inverse of [`export`](Self::export): the same shape
    /// is required before the document is accepted. The caller decides
    /// whether to persist the result.
    pub fn import(value: Value) -> Result<(Vec<CompensationRecord>, Budget), ValidationError> {
        let document: ExportDocument = serde_json::from_value(value)
            .map_err(|e| ValidationError::InvalidDocument(e.to_string()))?;

        if document.version != EXPORT_VERSION {
            return Err(ValidationError::UnsupportedVersion(document.version));
        }

        for record in &document.records {
            if record.employee_id.is_empty() {
                return Err(ValidationError::InvalidDocument(
                    "record with empty employee id".to_string(),
                ));
            }
            if !record.invariants_hold() {
                return Err(ValidationError::InvalidDocument(format!(
                    "record {} violates salary invariants",
                    record.employee_id
                )));
            }
        }

        Ok((document.records, document.budget))
    }
}
