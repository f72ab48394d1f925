//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary amounts are `rust_decimal::Decimal`, rounded to
//! 2 decimal places (half-up) at calculation boundaries.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places for monetary values.
pub const DECIMAL_PLACES: u32 = 2;

/// Rounds a monetary amount to 2 decimal places, half-up.
#[must_use]
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Coerces an optional amount to a value, treating `None` as zero.
///
/// Document-shaped order payloads carry many optional numeric fields;
/// a missing price or quantity always means zero, never an error.
#[must_use]
pub fn or_zero(amount: Option<Decimal>) -> Decimal {
    amount.unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round(dec!(1.005)), dec!(1.01));
        assert_eq!(round(dec!(1.004)), dec!(1.00));
        assert_eq!(round(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_round_noop_on_two_decimals() {
        assert_eq!(round(dec!(249.99)), dec!(249.99));
        assert_eq!(round(dec!(0)), dec!(0));
    }

    #[test]
    fn test_or_zero() {
        assert_eq!(or_zero(Some(dec!(12.50))), dec!(12.50));
        assert_eq!(or_zero(None), Decimal::ZERO);
    }
}
