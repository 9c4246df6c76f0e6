//! The compensation merge engine.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use salarium_common::{CompensationRecord, ProposalRow, RaiseSignal};

/// A proposal row that could not be applied, with the reason.
#[derive(Debug, Clone)]
pub struct UnmatchedRow {
    /// The offending row.
    pub row: ProposalRow,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Result of merging proposal rows into a record set.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The full record set with merged rows applied. Caller-owned input is
    /// never mutated.
    pub updated: Vec<CompensationRecord>,
    /// Rows that could not be applied.
    pub unmatched: Vec<UnmatchedRow>,
    /// Number of records a proposal was applied to.
    pub matched_count: usize,
    /// Number of failed rows.
    pub failed_count: usize,
    /// Sum of the applied raises. A later row for the same employee
    /// supersedes an earlier one, here and in `updated`.
    pub total_raise_usd: Decimal,
}

/// Merges proposal rows into compensation records, re-deriving every
/// dependent financial field from each record's implicit exchange ratio.
///
/// Merges are all-or-nothing per row: a failed row leaves its record (if
/// any) untouched.
#[derive(Debug, Default)]
pub struct CompensationMergeEngine;

impl CompensationMergeEngine {
    /// Create a merge engine.
    pub fn new() -> Self {
        Self
    }

    /// Merge proposal rows into the existing record set.
    #[instrument(skip(self, existing, rows), fields(records = existing.len(), proposals = rows.len()))]
    pub fn merge(&self, existing: &[CompensationRecord], rows: Vec<ProposalRow>) -> MergeResult {
        // Last-seen record wins on key collision; collisions are not
        // expected in practice.
        let mut index: HashMap<&str, &CompensationRecord> = HashMap::with_capacity(existing.len());
        for record in existing {
            index.insert(record.employee_id.as_str(), record);
        }

        let mut merged: HashMap<String, CompensationRecord> = HashMap::new();
        let mut unmatched = Vec::new();
        let mut total_raise_usd = Decimal::ZERO;

        for row in rows {
            let id = match row.employee_id.clone() {
                Some(id) if !id.is_empty() => id,
                _ => {
                    unmatched.push(UnmatchedRow {
                        reason: "missing employee id".to_string(),
                        row,
                    });
                    continue;
                }
            };

            let Some(record) = index.get(id.as_str()) else {
                unmatched.push(UnmatchedRow {
                    reason: format!("no matching record for employee '{}'", id),
                    row,
                });
                continue;
            };

            match Self::derive_raise(record, &row) {
                Ok(raise_usd) => {
                    let updated = Self::apply_raise(record, raise_usd);
                    // A later row for the same employee supersedes the
                    // earlier one; back its raise out of the total so the
                    // total matches the applied record state.
                    if let Some(previous) = merged.insert(id.as_str().to_string(), updated) {
                        debug!(employee_id = %id, "Later proposal row supersedes an earlier one");
                        total_raise_usd -= previous.proposed_raise;
                    }
                    total_raise_usd += raise_usd;
                }
                Err(reason) => {
                    unmatched.push(UnmatchedRow { reason, row });
                }
            }
        }

        let matched_count = merged.len();
        let failed_count = unmatched.len();

        let updated = existing
            .iter()
            .map(|record| {
                merged
                    .get(record.employee_id.as_str())
                    .cloned()
                    .unwrap_or_else(|| record.clone())
            })
            .collect();

        info!(
            matched = matched_count,
            failed = failed_count,
            total_raise = %total_raise_usd,
            "Merge completed"
        );

        MergeResult {
            updated,
            unmatched,
            matched_count,
            failed_count,
            total_raise_usd,
        }
    }

    /// Derive the single authoritative raise amount in USD for a row.
    fn derive_raise(record: &CompensationRecord, row: &ProposalRow) -> Result<Decimal, String> {
        match row.raise_signal() {
            Some(RaiseSignal::AmountUsd(amount)) => Ok(amount),
            Some(RaiseSignal::Percent(percent)) => {
                Ok(record.base_salary_usd * percent / Decimal::from(100))
            }
            Some(RaiseSignal::SalaryNative(salary)) => {
                // Reconcile through the ratio baked into the record, not a
                // live rate, so the manager's native-currency figure maps
                // to exactly the USD number they reviewed.
                let ratio = record.implicit_ratio();
                Ok((salary - record.base_salary) * ratio)
            }
            None => Err("no raise signal in row".to_string()),
        }
    }

    /// Apply a raise to a record, recomputing every dependent field.
    fn apply_raise(record: &CompensationRecord, raise_usd: Decimal) -> CompensationRecord {
        let mut updated = record.clone();
        updated.proposed_raise = raise_usd;
        updated.new_salary = record.base_salary_usd + raise_usd;

        updated.percent_change = if record.base_salary_usd.is_zero() {
            debug!(employee_id = %record.employee_id, "Zero USD base salary, percent change defaults to 0");
            Decimal::ZERO
        } else {
            raise_usd / record.base_salary_usd * Decimal::from(100)
        };

        if record.salary_grade_mid.is_some() {
            let mut ratio = record.implicit_ratio();
            if ratio.is_zero() {
                debug!(employee_id = %record.employee_id, "Zero implicit ratio, defaulting to 1");
                ratio = Decimal::ONE;
            }
            let projected_native = record.base_salary + raise_usd / ratio;
            updated.comparatio = record.comparatio_for(projected_native);
        }

        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use salarium_common::{Currency, EmployeeId};

    fn usd_record(id: &str, base: Decimal) -> CompensationRecord {
        CompensationRecord::new(EmployeeId::new(id), Currency::usd(), base, base)
    }

    fn row(id: &str) -> ProposalRow {
        ProposalRow {
            line: 2,
            employee_id: Some(EmployeeId::new(id)),
            ..ProposalRow::new(2)
        }
    }

    #[test]
    fn test_merge_from_percent() {
        let existing = vec![usd_record("E1", dec!(85000))];
        let mut proposal = row("E1");
        proposal.proposed_raise_percent = Some(dec!(5.00));

        let result = CompensationMergeEngine::new().merge(&existing, vec![proposal]);

        assert_eq!(result.matched_count, 1);
        let updated = &result.updated[0];
        assert_eq!(updated.proposed_raise, dec!(4250));
        assert_eq!(updated.new_salary, dec!(89250));
        assert_eq!(updated.percent_change, dec!(5));
        assert!(updated.invariants_hold());
    }

    #[test]
    fn test_merge_from_raise_amount() {
        let existing = vec![usd_record("E1", dec!(85000))];
        let mut proposal = row("E1");
        proposal.proposed_raise = Some(dec!(3000));

        let result = CompensationMergeEngine::new().merge(&existing, vec![proposal]);

        assert_eq!(result.updated[0].proposed_raise, dec!(3000));
        assert_eq!(result.total_raise_usd, dec!(3000));
    }

    #[test]
    fn test_proposed_salary_preserves_implicit_ratio() {
        // INR record with ratio 18072 / 1500000 = 0.012048.
        let existing = vec![CompensationRecord::new(
            EmployeeId::new("E1"),
            Currency::inr(),
            dec!(1500000),
            dec!(18072),
        )];
        let mut proposal = row("E1");
        proposal.proposed_salary = Some(dec!(1650000));

        let result = CompensationMergeEngine::new().merge(&existing, vec![proposal]);

        // (1650000 - 1500000) * 0.012048 = 1807.2
        assert_eq!(result.updated[0].proposed_raise, dec!(1807.2));
        assert!(result.updated[0].invariants_hold());
    }

    #[test]
    fn test_unmatched_leaves_records_untouched() {
        let existing = vec![usd_record("E1", dec!(85000))];
        let mut proposal = row("E999");
        proposal.proposed_raise = Some(dec!(1000));

        let result = CompensationMergeEngine::new().merge(&existing, vec![proposal]);

        assert_eq!(result.failed_count, 1);
        assert_eq!(result.matched_count, 0);
        assert_eq!(result.unmatched.len(), 1);
        assert!(result.unmatched[0].reason.contains("E999"));
        assert_eq!(result.updated, existing);
        assert_eq!(result.total_raise_usd, Decimal::ZERO);
    }

    #[test]
    fn test_missing_employee_id_fails_before_lookup() {
        let existing = vec![usd_record("E1", dec!(85000))];
        let mut proposal = ProposalRow::new(3);
        proposal.proposed_raise = Some(dec!(1000));

        let result = CompensationMergeEngine::new().merge(&existing, vec![proposal]);

        assert_eq!(result.failed_count, 1);
        assert_eq!(result.unmatched[0].reason, "missing employee id");
    }

    #[test]
    fn test_row_without_signal_is_unmatched() {
        let existing = vec![usd_record("E1", dec!(85000))];

        let result = CompensationMergeEngine::new().merge(&existing, vec![row("E1")]);

        assert_eq!(result.failed_count, 1);
        assert_eq!(result.updated, existing);
    }

    #[test]
    fn test_comparatio_recomputed_from_native_figures() {
        let existing = vec![CompensationRecord::new(
            EmployeeId::new("E1"),
            Currency::inr(),
            dec!(1500000),
            dec!(18072),
        )
        .with_grade(dec!(1200000), dec!(1600000), dec!(2000000))];

        let mut proposal = row("E1");
        proposal.proposed_salary = Some(dec!(1650000));

        let result = CompensationMergeEngine::new().merge(&existing, vec![proposal]);

        // Projected native salary is 1650000; 1650000/1600000*100 = 103.125.
        assert_eq!(result.updated[0].comparatio, Some(103));
    }

    #[test]
    fn test_zero_base_salary_guards() {
        let mut record = usd_record("E1", dec!(0));
        record.base_salary_usd = Decimal::ZERO;
        record.new_salary = Decimal::ZERO;
        let record = record.with_grade(dec!(40000), dec!(50000), dec!(60000));

        let mut proposal = row("E1");
        proposal.proposed_raise = Some(dec!(1000));

        let result = CompensationMergeEngine::new().merge(&[record], vec![proposal]);

        let updated = &result.updated[0];
        assert_eq!(updated.percent_change, Decimal::ZERO);
        assert_eq!(updated.new_salary, dec!(1000));
        assert!(updated.invariants_hold());
    }

    #[test]
    fn test_key_collision_last_seen_wins() {
        let mut first = usd_record("E1", dec!(50000));
        first.name = Some("first".to_string());
        let mut second = usd_record("E1", dec!(70000));
        second.name = Some("second".to_string());

        let mut proposal = row("E1");
        proposal.proposed_raise_percent = Some(dec!(10));

        let result =
            CompensationMergeEngine::new().merge(&[first, second], vec![proposal]);

        // Both slots carry the merge applied to the last-seen record.
        assert_eq!(result.matched_count, 1);
        assert_eq!(result.updated[1].proposed_raise, dec!(7000));
    }

    #[test]
    fn test_later_row_for_same_employee_supersedes() {
        let existing = vec![usd_record("E1", dec!(85000))];

        let mut first = row("E1");
        first.proposed_raise = Some(dec!(1000));
        let mut second = row("E1");
        second.line = 3;
        second.proposed_raise = Some(dec!(2000));

        let result = CompensationMergeEngine::new().merge(&existing, vec![first, second]);

        // The total reflects the applied state, not the sum of all rows.
        assert_eq!(result.matched_count, 1);
        assert_eq!(result.updated[0].proposed_raise, dec!(2000));
        assert_eq!(result.total_raise_usd, dec!(2000));
    }

    #[test]
    fn test_total_raise_over_successes_only() {
        let existing = vec![usd_record("E1", dec!(80000)), usd_record("E2", dec!(90000))];

        let mut good = row("E1");
        good.proposed_raise = Some(dec!(2000));
        let mut bad = row("E404");
        bad.proposed_raise = Some(dec!(9999));

        let result = CompensationMergeEngine::new().merge(&existing, vec![good, bad]);

        assert_eq!(result.total_raise_usd, dec!(2000));
        assert_eq!(result.matched_count, 1);
        assert_eq!(result.failed_count, 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn merged_records_always_satisfy_invariants(
                base_cents in 0i64..100_000_000,
                raise_cents in -10_000_000i64..10_000_000,
            ) {
                let base = Decimal::new(base_cents, 2);
                let raise = Decimal::new(raise_cents, 2);

                let existing = vec![usd_record("E1", base)];
                let mut proposal = row("E1");
                proposal.proposed_raise = Some(raise);

                let result = CompensationMergeEngine::new().merge(&existing, vec![proposal]);

                prop_assert!(result.updated[0].invariants_hold());
                prop_assert_eq!(result.total_raise_usd, raise);
            }

            #[test]
            fn percent_raises_satisfy_invariants(
                base_cents in 1i64..100_000_000,
                percent_bp in 0i64..5_000,
            ) {
                let base = Decimal::new(base_cents, 2);
                let percent = Decimal::new(percent_bp, 2);

                let existing = vec![usd_record("E1", base)];
                let mut proposal = row("E1");
                proposal.proposed_raise_percent = Some(percent);

                let result = CompensationMergeEngine::new().merge(&existing, vec![proposal]);

                prop_assert!(result.updated[0].invariants_hold());
            }
        }
    }
}
