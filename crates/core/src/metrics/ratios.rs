//! Guarded financial ratios.
//!
//! Every ratio checks its denominator and resolves a zero (or negative)
//! denominator to a fixed fallback instead of dividing. Inputs are money in
//! minor units expressed as `Decimal`, so no float ever enters a figure.

use rust_decimal::{Decimal, RoundingStrategy};

/// Lifetime assumed by [`lifetime_value`] when churn is zero, in months.
pub const ASSUMED_LIFETIME_MONTHS: i64 = 36;

/// `numerator / denominator` when the denominator is positive, else `fallback`.
#[must_use]
pub fn guarded_ratio(numerator: Decimal, denominator: Decimal, fallback: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator / denominator
    } else {
        fallback
    }
}

/// Rounds half away from zero to `dp` decimal places.
#[must_use]
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Expresses a ratio as a percentage with two decimals.
#[must_use]
pub fn as_percent(ratio: Decimal) -> Decimal {
    round_half_up(ratio * Decimal::ONE_HUNDRED, 2)
}

/// `part` as a percentage of `whole`, two decimals; zero when `whole` is not positive.
#[must_use]
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    as_percent(guarded_ratio(part, whole, Decimal::ZERO))
}

/// Net lost customers over the previous month's customer count.
#[must_use]
pub fn user_churn(net_lost_customers: i64, previous_customers: i64) -> Decimal {
    guarded_ratio(
        Decimal::from(net_lost_customers),
        Decimal::from(previous_customers),
        Decimal::ZERO,
    )
}

/// Lost MRR (already negative) over the previous month's MRR, sign-flipped.
#[must_use]
pub fn revenue_churn(lost_mrr: Decimal, previous_mrr: Decimal) -> Decimal {
    guarded_ratio(-lost_mrr, previous_mrr, Decimal::ZERO)
}

/// Average revenue per user.
#[must_use]
pub fn arpu(mrr: Decimal, customers: i64) -> Decimal {
    guarded_ratio(mrr, Decimal::from(customers), Decimal::ZERO)
}

/// ARPU over user churn, or ARPU times the assumed lifetime when nobody churned.
#[must_use]
pub fn lifetime_value(arpu: Decimal, user_churn: Decimal) -> Decimal {
    if user_churn > Decimal::ZERO {
        arpu / user_churn
    } else {
        arpu * Decimal::from(ASSUMED_LIFETIME_MONTHS)
    }
}

/// Net revenue retention as a whole percentage.
///
/// `contraction` and `lost` are expected to be negative already.
#[must_use]
pub fn net_revenue_retention(
    previous_mrr: Decimal,
    expansion: Decimal,
    reactivation: Decimal,
    contraction: Decimal,
    lost: Decimal,
) -> Decimal {
    let retained = previous_mrr + expansion + reactivation + contraction + lost;
    let ratio = guarded_ratio(retained, previous_mrr, Decimal::ZERO);
    round_half_up(ratio * Decimal::ONE_HUNDRED, 0)
}

/// Days sales outstanding over a period of `days` days, rounded to whole days.
#[must_use]
pub fn days_sales_outstanding(outstanding: Decimal, invoiced: Decimal, days: i64) -> Decimal {
    if invoiced > Decimal::ZERO {
        round_half_up(outstanding / invoiced * Decimal::from(days), 0)
    } else {
        Decimal::ZERO
    }
}

/// Share of invoiced revenue already collected, as a whole percentage.
#[must_use]
pub fn collections_efficiency(outstanding: Decimal, invoiced: Decimal) -> Decimal {
    if invoiced > Decimal::ZERO {
        round_half_up((Decimal::ONE - outstanding / invoiced) * Decimal::ONE_HUNDRED, 0)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lifetime_value_scenario() {
        // 5 lost, 1 reactivated, 100 customers last month.
        let churn = user_churn(5 - 1, 100);
        assert_eq!(churn, dec!(0.04));

        let arpu = arpu(dec!(12000), 100);
        assert_eq!(arpu, dec!(120));

        assert_eq!(lifetime_value(arpu, churn), dec!(3000));
    }

    #[test]
    fn test_lifetime_value_without_churn_uses_36_months() {
        let churn = user_churn(0, 100);
        assert_eq!(churn, Decimal::ZERO);
        assert_eq!(lifetime_value(dec!(120), churn), dec!(4320));
    }

    #[test]
    fn test_net_revenue_retention_scenario() {
        let nrr = net_revenue_retention(dec!(10000), dec!(500), dec!(200), dec!(-300), dec!(-400));
        assert_eq!(nrr, dec!(100));
    }

    #[test]
    fn test_net_revenue_retention_rounds() {
        // (1000 + 5 - 0) / 1000 = 100.5% -> 101
        let nrr = net_revenue_retention(dec!(1000), dec!(5), dec!(0), dec!(0), dec!(0));
        assert_eq!(nrr, dec!(101));
    }

    #[test]
    fn test_revenue_churn() {
        assert_eq!(revenue_churn(dec!(-250), dec!(10000)), dec!(0.025));
    }

    #[test]
    fn test_dso_and_collections_efficiency() {
        // 2500 outstanding of 10000 invoiced over 30 days
        assert_eq!(days_sales_outstanding(dec!(2500), dec!(10000), 30), dec!(8));
        assert_eq!(collections_efficiency(dec!(2500), dec!(10000)), dec!(75));
    }

    #[test]
    fn test_zero_denominators_use_fallbacks() {
        assert_eq!(user_churn(4, 0), Decimal::ZERO);
        assert_eq!(revenue_churn(dec!(-100), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(arpu(dec!(12000), 0), Decimal::ZERO);
        assert_eq!(
            net_revenue_retention(Decimal::ZERO, dec!(5), dec!(5), dec!(-1), dec!(-1)),
            Decimal::ZERO
        );
        assert_eq!(days_sales_outstanding(dec!(100), Decimal::ZERO, 30), Decimal::ZERO);
        assert_eq!(collections_efficiency(dec!(100), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_as_percent() {
        assert_eq!(as_percent(dec!(0.04)), dec!(4.00));
        assert_eq!(as_percent(dec!(0.123456)), dec!(12.35));
        assert_eq!(percent_of(dec!(25), dec!(200)), dec!(12.50));
        assert_eq!(percent_of(dec!(25), Decimal::ZERO), Decimal::ZERO);
    }

    proptest! {
        /// A zero denominator always yields the documented fallback.
        #[test]
        fn prop_zero_denominator_never_divides(
            numerator in -1_000_000_000i64..1_000_000_000,
            other in -1_000_000i64..1_000_000,
            days in 0i64..400,
        ) {
            let n = Decimal::from(numerator);
            let o = Decimal::from(other);
            prop_assert_eq!(user_churn(numerator, 0), Decimal::ZERO);
            prop_assert_eq!(revenue_churn(n, Decimal::ZERO), Decimal::ZERO);
            prop_assert_eq!(arpu(n, 0), Decimal::ZERO);
            prop_assert_eq!(net_revenue_retention(Decimal::ZERO, n, o, -o, n), Decimal::ZERO);
            prop_assert_eq!(days_sales_outstanding(n, Decimal::ZERO, days), Decimal::ZERO);
            prop_assert_eq!(collections_efficiency(n, Decimal::ZERO), Decimal::ZERO);
            prop_assert_eq!(
                lifetime_value(n, Decimal::ZERO),
                n * Decimal::from(ASSUMED_LIFETIME_MONTHS)
            );
        }
    }
}
