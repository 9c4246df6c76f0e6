//! Durable snapshots of the full plan state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use salarium_common::{now, Budget, CompensationRecord, EmployeeId, Timestamp};

/// A committed snapshot of the full record set plus budget.
///
/// Snapshots are superseded, never mutated; prior snapshots are retained
/// only in durable storage history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotState {
    /// Unique snapshot id (time-ordered).
    pub id: Uuid,
    /// All records keyed by employee id.
    pub records: BTreeMap<EmployeeId, CompensationRecord>,
    /// The planning budget at commit time.
    pub budget: Budget,
    /// Content hash of the semantic projection.
    pub content_hash: String,
    /// When the snapshot was taken.
    pub observed_at: Timestamp,
}

impl SnapshotState {
    /// Create a new snapshot from a record set.
    pub fn new(records: Vec<CompensationRecord>, budget: Budget, content_hash: String) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.employee_id.clone(), r))
            .collect();
        Self {
            id: Uuid::now_v7(),
            records,
            budget,
            content_hash,
            observed_at: now(),
        }
    }

    /// Records in employee-id order.
    pub fn records_ordered(&self) -> Vec<CompensationRecord> {
        self.records.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use salarium_common::Currency;

    #[test]
    fn test_snapshot_keyed_by_employee_id() {
        let records = vec![
            CompensationRecord::new(EmployeeId::new("E2"), Currency::usd(), dec!(2), dec!(2)),
            CompensationRecord::new(EmployeeId::new("E1"), Currency::usd(), dec!(1), dec!(1)),
        ];
        let snapshot = SnapshotState::new(
            records,
            Budget::new(dec!(1000), Currency::usd()),
            "hash".to_string(),
        );

        let ordered = snapshot.records_ordered();
        assert_eq!(ordered[0].employee_id, EmployeeId::new("E1"));
        assert_eq!(ordered[1].employee_id, EmployeeId::new("E2"));
    }

    #[test]
    fn test_snapshot_roundtrips_through_json() {
        let snapshot = SnapshotState::new(
            vec![CompensationRecord::new(
                EmployeeId::new("E1"),
                Currency::eur(),
                dec!(70000),
                dec!(76000),
            )],
            Budget::new(dec!(1000), Currency::usd()),
            "hash".to_string(),
        );

        let value = serde_json::to_value(&snapshot).unwrap();
        let back: SnapshotState = serde_json::from_value(value).unwrap();
        assert_eq!(back, snapshot);
    }
}
