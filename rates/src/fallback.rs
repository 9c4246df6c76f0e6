//! Bundled static fallback rate table (tier 4).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Version tag of the bundled table, for diagnostics.
pub const STATIC_TABLE_VERSION: &str = "2024-06";

/// Amount of the given currency per 1 USD, from the bundled table.
///
/// Hand-curated; only consulted when every other tier has failed.
pub fn per_usd(code: &str) -> Option<Decimal> {
    let amount = match code {
        "USD" => dec!(1.0),
        "EUR" => dec!(0.858),
        "GBP" => dec!(0.74),
        "JPY" => dec!(149.5),
        "CHF" => dec!(0.86),
        "CAD" => dec!(1.36),
        "AUD" => dec!(1.52),
        "NZD" => dec!(1.66),
        "CNY" => dec!(7.24),
        "INR" => dec!(83.0),
        "KRW" => dec!(1370.0),
        "SGD" => dec!(1.34),
        "HKD" => dec!(7.81),
        "SEK" => dec!(10.6),
        "NOK" => dec!(10.7),
        "DKK" => dec!(6.4),
        "PLN" => dec!(3.95),
        "BRL" => dec!(5.45),
        "MXN" => dec!(18.2),
        "ZAR" => dec!(18.4),
        _ => return None,
    };
    Some(amount)
}

/// Cross rate `from -> to` computed from the USD-denominated table:
/// `rate = table[to] / table[from]`. Both legs must exist.
pub fn cross_rate(from: &str, to: &str) -> Option<Decimal> {
    let from_leg = per_usd(from)?;
    let to_leg = per_usd(to)?;
    Some(to_leg / from_leg)
}
