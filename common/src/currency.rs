//! Currency and monetary types for the Salarium core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Get the standard decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self.0.as_str() {
            "JPY" | "KRW" | "VND" => 0,
            "BHD" | "KWD" | "OMR" => 3,
            _ => 2,
        }
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn inr() -> Self {
        Self::new("INR")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An ordered pair of currencies for a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Currency being converted from.
    pub from: Currency,
    /// Currency being converted to.
    pub to: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(from: Currency, to: Currency) -> Self {
        Self { from, to }
    }

    /// Whether both legs are the same currency.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// A monetary amount with currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount value (high precision decimal).
    pub value: Decimal,
    /// ISO 4217 currency code.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money instance.
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            value: Decimal::ZERO,
            currency,
        }
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Round to the currency's standard decimal places.
    pub fn round(&self) -> Self {
        let places = self.currency.decimal_places();
        Self {
            value: self.value.round_dp(places),
            currency: self.currency.clone(),
        }
    }

    /// Add another amount of the same currency.
    pub fn checked_add(&self, other: &Money) -> Result<Money, CurrencyMismatchError> {
        self.check_currency(other)?;
        Ok(Money::new(self.value + other.value, self.currency.clone()))
    }

    /// Subtract another amount of the same currency.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, CurrencyMismatchError> {
        self.check_currency(other)?;
        Ok(Money::new(self.value - other.value, self.currency.clone()))
    }

    fn check_currency(&self, other: &Money) -> Result<(), CurrencyMismatchError> {
        if self.currency != other.currency {
            return Err(CurrencyMismatchError {
                expected: self.currency.clone(),
                actual: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

/// Error when attempting operations on different currencies.
#[derive(Debug, Clone)]
pub struct CurrencyMismatchError {
    pub expected: Currency,
    pub actual: Currency,
}

impl fmt::Display for CurrencyMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Currency mismatch: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for CurrencyMismatchError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_normalization() {
        assert_eq!(Currency::new(" usd ").code(), "USD");
        assert_eq!(Currency::new("eur"), Currency::eur());
    }

    #[test]
    fn test_currency_decimal_places() {
        assert_eq!(Currency::usd().decimal_places(), 2);
        assert_eq!(Currency::new("JPY").decimal_places(), 0);
        assert_eq!(Currency::new("KWD").decimal_places(), 3);
    }

    #[test]
    fn test_pair_identity() {
        let pair = CurrencyPair::new(Currency::usd(), Currency::usd());
        assert!(pair.is_identity());

        let pair = CurrencyPair::new(Currency::usd(), Currency::eur());
        assert!(!pair.is_identity());
        assert_eq!(pair.inverse().from, Currency::eur());
    }

    #[test]
    fn test_money_checked_arithmetic() {
        let m1 = Money::new(dec!(100.00), Currency::usd());
        let m2 = Money::new(dec!(40.00), Currency::usd());

        assert_eq!(m1.checked_sub(&m2).unwrap().value, dec!(60.00));
        assert_eq!(m1.checked_add(&m2).unwrap().value, dec!(140.00));

        let other = Money::new(dec!(40.00), Currency::eur());
        assert!(m1.checked_add(&other).is_err());
    }

    #[test]
    fn test_money_rounding() {
        let m = Money::new(dec!(116.5489), Currency::usd());
        assert_eq!(m.round().value, dec!(116.55));
    }
}
