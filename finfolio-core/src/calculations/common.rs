//! Rounding helpers shared by calculations and display code.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to cents using half-up rounding.
///
/// Values at exactly half a cent are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use finfolio_core::calculations::common::round_money;
///
/// assert_eq!(round_money(dec!(100.004)), dec!(100.00));
/// assert_eq!(round_money(dec!(100.005)), dec!(100.01));
/// assert_eq!(round_money(dec!(-100.005)), dec!(-100.01));
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a fractional rate (`0.1`) into a percentage with two decimal
/// places (`10.00`).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use finfolio_core::calculations::common::to_percentage;
///
/// assert_eq!(to_percentage(dec!(0.1)), dec!(10.00));
/// assert_eq!(to_percentage(dec!(0.471872985)), dec!(47.19));
/// ```
pub fn to_percentage(rate: Decimal) -> Decimal {
    round_money(rate * Decimal::ONE_HUNDRED)
}
