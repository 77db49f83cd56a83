//! Common helpers shared by the gift-tax calculators.

use rust_decimal::Decimal;

/// Truncates a won amount toward zero, dropping any fractional won.
///
/// Penalties and surcharges are assessed in whole won; the fraction is
/// discarded rather than rounded.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use gift_tax_core::calculations::common::truncate_won;
///
/// assert_eq!(truncate_won(dec!(175000.75)), dec!(175000));
/// assert_eq!(truncate_won(dec!(99.999)), dec!(99));
/// ```
pub fn truncate_won(value: Decimal) -> Decimal {
    value.trunc()
}

/// Returns the larger of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use gift_tax_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100), dec!(200)), dec!(200));
/// assert_eq!(max(dec!(-100), dec!(0)), dec!(0));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Clamps negative amounts to zero.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}
