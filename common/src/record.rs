//! Compensation records and planning budget.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;

/// Stable identity key for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Create a new employee id, trimming surrounding whitespace.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Get the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty (and therefore unusable as a key).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The overall raise budget for a planning cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Budget amount.
    pub amount: Decimal,
    /// Budget currency (typically USD).
    pub currency: Currency,
}

impl Budget {
    /// Create a new budget.
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }
}

/// A single employee's compensation record.
///
/// `base_salary` is in the employee's native currency and `base_salary_usd`
/// is the USD figure computed at the rate used when the record was created
/// or last reconciled. Together they encode the implicit exchange ratio that
/// merges must preserve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationRecord {
    /// Unique, stable identity key.
    pub employee_id: EmployeeId,
    /// Display name. Non-semantic; excluded from change hashing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Native currency of the employee's salary.
    pub currency: Currency,
    /// Base salary in the native currency.
    pub base_salary: Decimal,
    /// Base salary in USD at the record's reconciliation rate.
    pub base_salary_usd: Decimal,
    /// Proposed raise in USD.
    pub proposed_raise: Decimal,
    /// New salary in USD (base_salary_usd + proposed_raise).
    pub new_salary: Decimal,
    /// Raise as a percentage of base_salary_usd.
    pub percent_change: Decimal,
    /// Native-currency new salary as a percentage of the grade midpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparatio: Option<i64>,
    /// Salary grade minimum in the native currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_grade_min: Option<Decimal>,
    /// Salary grade midpoint in the native currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_grade_mid: Option<Decimal>,
    /// Salary grade maximum in the native currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_grade_max: Option<Decimal>,
}

impl CompensationRecord {
    /// Create a record with no raise applied yet.
    pub fn new(
        employee_id: EmployeeId,
        currency: Currency,
        base_salary: Decimal,
        base_salary_usd: Decimal,
    ) -> Self {
        Self {
            employee_id,
            name: None,
            currency,
            base_salary,
            base_salary_usd,
            proposed_raise: Decimal::ZERO,
            new_salary: base_salary_usd,
            percent_change: Decimal::ZERO,
            comparatio: None,
            salary_grade_min: None,
            salary_grade_mid: None,
            salary_grade_max: None,
        }
    }

    /// Set the salary grade band (native currency).
    pub fn with_grade(mut self, min: Decimal, mid: Decimal, max: Decimal) -> Self {
        self.salary_grade_min = Some(min);
        self.salary_grade_mid = Some(mid);
        self.salary_grade_max = Some(max);
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The exchange ratio baked into this record: `base_salary_usd /
    /// base_salary`, defaulting to 1 when base_salary is zero.
    ///
    /// Merges reuse this ratio instead of a live rate so reconciled figures
    /// stay consistent with the numbers a reviewer already saw.
    pub fn implicit_ratio(&self) -> Decimal {
        if self.base_salary.is_zero() {
            Decimal::ONE
        } else {
            self.base_salary_usd / self.base_salary
        }
    }

    /// Compute comparatio from a native-currency projected salary.
    ///
    /// Comparatio is always derived from native-currency figures, never
    /// from USD figures directly.
    pub fn comparatio_for(&self, projected_native: Decimal) -> Option<i64> {
        let mid = self.salary_grade_mid?;
        if mid.is_zero() {
            return None;
        }
        let ratio = (projected_native / mid * Decimal::from(100))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        ratio.to_i64()
    }

    /// Check the record's financial invariants.
    pub fn invariants_hold(&self) -> bool {
        if self.new_salary != self.base_salary_usd + self.proposed_raise {
            return false;
        }
        let expected_percent = if self.base_salary_usd.is_zero() {
            Decimal::ZERO
        } else {
            self.proposed_raise / self.base_salary_usd * Decimal::from(100)
        };
        self.percent_change == expected_percent
    }
}
