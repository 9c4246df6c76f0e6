//! Manager-submitted raise proposals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::EmployeeId;

/// A raise proposal row from an external file.
///
/// At most one authoritative raise signal is derived per row; see
/// [`ProposalRow::raise_signal`] for the priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRow {
    /// 1-based line number in the source file, for error reporting.
    pub line: usize,
    /// Identity key; rows without one are rejected before merging.
    pub employee_id: Option<EmployeeId>,
    /// Absolute raise amount in USD.
    pub proposed_raise: Option<Decimal>,
    /// Raise as a percentage of the USD base salary.
    pub proposed_raise_percent: Option<Decimal>,
    /// Proposed new salary in the employee's native currency.
    pub proposed_salary: Option<Decimal>,
}

impl ProposalRow {
    /// Create an empty row for the given source line.
    pub fn new(line: usize) -> Self {
        Self {
            line,
            ..Default::default()
        }
    }

    /// The single authoritative raise signal carried by this row.
    ///
    /// Priority: absolute raise amount, then raise percent, then proposed
    /// native-currency salary.
    pub fn raise_signal(&self) -> Option<RaiseSignal> {
        if let Some(amount) = self.proposed_raise {
            Some(RaiseSignal::AmountUsd(amount))
        } else if let Some(percent) = self.proposed_raise_percent {
            Some(RaiseSignal::Percent(percent))
        } else {
            self.proposed_salary.map(RaiseSignal::SalaryNative)
        }
    }
}

/// The authoritative raise signal derived from a proposal row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaiseSignal {
    /// Absolute raise in USD; used directly.
    AmountUsd(Decimal),
    /// Percentage of the record's USD base salary.
    Percent(Decimal),
    /// Proposed new salary in the native currency; reconciled through the
    /// record's implicit exchange ratio.
    SalaryNative(Decimal),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_raise_amount_wins() {
        let row = ProposalRow {
            line: 1,
            employee_id: Some(EmployeeId::new("E1")),
            proposed_raise: Some(dec!(5000)),
            proposed_raise_percent: Some(dec!(10)),
            proposed_salary: Some(dec!(90000)),
        };
        assert_eq!(row.raise_signal(), Some(RaiseSignal::AmountUsd(dec!(5000))));
    }

    #[test]
    fn test_percent_beats_salary() {
        let row = ProposalRow {
            line: 1,
            proposed_raise_percent: Some(dec!(5)),
            proposed_salary: Some(dec!(90000)),
            ..ProposalRow::new(1)
        };
        assert_eq!(row.raise_signal(), Some(RaiseSignal::Percent(dec!(5))));
    }

    #[test]
    fn test_no_signal() {
        assert_eq!(ProposalRow::new(3).raise_signal(), None);
    }
}
