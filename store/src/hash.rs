//! Content hashing over the semantic projection of plan state.

use serde::Serialize;
use sha2::{Digest, Sha256};

use rust_decimal::Decimal;
use salarium_common::{Budget, CompensationRecord, EmployeeId};

/// The reduced projection of a record that participates in change
/// detection. Display-only fields are deliberately excluded so cosmetic
/// edits do not trigger durable writes.
#[derive(Serialize)]
struct RecordProjection<'a> {
    employee_id: &'a EmployeeId,
    base_salary_usd: Decimal,
    proposed_raise: Decimal,
}

#[derive(Serialize)]
struct StateProjection<'a> {
    records: Vec<RecordProjection<'a>>,
    budget: &'a Budget,
}

/// Compute the deterministic content hash of a record set plus budget.
///
/// Records are sorted by employee id so the hash is independent of input
/// order.
pub fn content_hash(records: &[CompensationRecord], budget: &Budget) -> String {
    let mut projections: Vec<RecordProjection<'_>> = records
        .iter()
        .map(|r| RecordProjection {
            employee_id: &r.employee_id,
            base_salary_usd: r.base_salary_usd,
            proposed_raise: r.proposed_raise,
        })
        .collect();
    projections.sort_by(|a, b| a.employee_id.cmp(b.employee_id));

    let state = StateProjection {
        records: projections,
        budget,
    };

    // Serialization of the projection cannot fail: no maps with non-string
    // keys, no non-finite numbers.
    let bytes = serde_json::to_vec(&state).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
