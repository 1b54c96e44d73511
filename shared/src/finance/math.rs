//! Guarded arithmetic helpers

use rust_decimal::{Decimal, RoundingStrategy};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// `numerator / denominator`, or zero when the denominator is zero.
///
/// Overflowing quotients also collapse to zero so no ratio in the engine can
/// fail or panic.
pub fn safe_divide(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// `part / whole × 100`, unrounded, zero when `whole` is zero
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    match part.checked_mul(HUNDRED) {
        Some(scaled) => safe_divide(scaled, whole),
        None => safe_divide(part, whole)
            .checked_mul(HUNDRED)
            .unwrap_or(Decimal::ZERO),
    }
}

/// Sum of amounts, or `None` when the total does not fit in a `Decimal`
pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
}

/// Percentage rounded to one decimal place
pub fn round_pct(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount rounded to whole currency units
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Ratio of two unit counts as a rounded percentage
pub fn unit_pct(part: u32, whole: u32) -> Decimal {
    round_pct(percentage(Decimal::from(part), Decimal::from(whole)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_divide_zero_denominator() {
        assert_eq!(safe_divide(Decimal::from(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_divide(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_divide(Decimal::from(-5), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_safe_divide_regular() {
        assert_eq!(safe_divide(Decimal::from(10), Decimal::from(4)), Decimal::new(25, 1));
    }

    #[test]
    fn test_safe_divide_overflow_collapses_to_zero() {
        assert_eq!(safe_divide(Decimal::MAX, Decimal::new(1, 10)), Decimal::ZERO);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(Decimal::from(4200), Decimal::from(15000)), Decimal::from(28));
        assert_eq!(percentage(Decimal::from(1), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_checked_sum() {
        assert_eq!(checked_sum([]), Some(Decimal::ZERO));
        assert_eq!(
            checked_sum([Decimal::from(2), Decimal::from(3)]),
            Some(Decimal::from(5))
        );
        assert_eq!(checked_sum([Decimal::MAX, Decimal::ONE]), None);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_pct(Decimal::new(3333, 2)), Decimal::new(333, 1));
        assert_eq!(round_pct(Decimal::new(125, 2)), Decimal::new(13, 1));
        assert_eq!(round_amount(Decimal::new(25, 1)), Decimal::from(3));
        assert_eq!(round_amount(Decimal::new(-25, 1)), Decimal::from(-3));
    }

    #[test]
    fn test_unit_pct() {
        assert_eq!(unit_pct(1, 3), Decimal::new(333, 1));
        assert_eq!(unit_pct(0, 0), Decimal::ZERO);
        assert_eq!(unit_pct(5, 5), Decimal::from(100));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn decimal_strategy() -> impl Strategy<Value = Decimal> {
            (any::<i64>(), 0u32..=10).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn prop_zero_denominator_is_zero(numerator in decimal_strategy()) {
                prop_assert_eq!(safe_divide(numerator, Decimal::ZERO), Decimal::ZERO);
                prop_assert_eq!(percentage(numerator, Decimal::ZERO), Decimal::ZERO);
            }

            #[test]
            fn prop_unit_pct_within_bounds(whole in 0u32..10_000, part_seed in 0u32..10_000) {
                let part = if whole == 0 { 0 } else { part_seed % (whole + 1) };
                let pct = unit_pct(part, whole);
                prop_assert!(pct >= Decimal::ZERO);
                prop_assert!(pct <= Decimal::ONE_HUNDRED);
            }

            #[test]
            fn prop_division_never_panics(a in decimal_strategy(), b in decimal_strategy()) {
                let _ = safe_divide(a, b);
                let _ = percentage(a, b);
            }
        }
    }
}
