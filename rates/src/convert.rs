//! Batch conversion types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use salarium_common::{Currency, ExchangeRate, Money};

use crate::resolver::DegradationStatus;

/// A single amount to convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionItem {
    /// Amount in the `from` currency.
    pub amount: Decimal,
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
}

impl ConversionItem {
    /// Create a new conversion item.
    pub fn new(amount: Decimal, from: Currency, to: Currency) -> Self {
        Self { amount, from, to }
    }
}

/// Per-item result of a batch conversion.
///
/// A failed item degrades to "no conversion performed" rather than failing
/// the batch.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// The requested conversion.
    pub item: ConversionItem,
    /// Converted amount, if a rate was resolved.
    pub converted: Option<Money>,
    /// The rate used, if any.
    pub rate: Option<ExchangeRate>,
    /// Resolver degradation status at the time of this item.
    pub degradation: DegradationStatus,
}

impl ConversionOutcome {
    /// A successful conversion.
    pub fn converted(item: ConversionItem, rate: ExchangeRate, degradation: DegradationStatus) -> Self {
        let converted = rate.convert(item.amount);
        Self {
            item,
            converted: Some(converted),
            rate: Some(rate),
            degradation,
        }
    }

    /// No conversion performed; the original amount stands.
    pub fn unconverted(item: ConversionItem, degradation: DegradationStatus) -> Self {
        Self {
            item,
            converted: None,
            rate: None,
            degradation,
        }
    }

    /// The amount to display: converted if available, otherwise the
    /// original amount in its original currency.
    pub fn display_amount(&self) -> Money {
        self.converted
            .clone()
            .unwrap_or_else(|| Money::new(self.item.amount, self.item.from.clone()))
    }
}
