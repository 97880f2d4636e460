use rust_decimal::Decimal;

use crate::domain::bundle::Bundle;

/// Bundles the proration may compare against `selected`: same group and at
/// least one shared covered country.
pub fn comparison_set<'a>(bundles: &'a [Bundle], selected: &Bundle) -> Vec<&'a Bundle> {
    bundles
        .iter()
        .filter(|candidate| candidate.shares_group(selected) && candidate.shares_country(selected))
        .collect()
}

/// Days of the selected bundle the customer will not use.
pub fn unused_days(selected: &Bundle, requested_days: u32) -> u32 {
    selected.validity_in_days.saturating_sub(requested_days)
}

/// Per-day refund for unused days on a retail catalog, derived from the
/// price gap to the longest comparable bundle shorter than the request.
///
/// Zero when no such bundle exists or the catalog prices the shorter bundle
/// at or above the selected one.
pub fn unused_day_discount(bundles: &[Bundle], selected: &Bundle, requested_days: u32) -> Decimal {
    let comparable = comparison_set(bundles, selected);
    let previous = comparable
        .iter()
        .filter(|candidate| candidate.validity_in_days < requested_days)
        .max_by_key(|candidate| candidate.validity_in_days);

    match previous {
        Some(previous) => price_gap_per_day(selected, previous),
        None => Decimal::ZERO,
    }
}

/// Price gap between two ladder rungs spread across their day gap, clamped
/// at zero so a catalog anomaly never raises the quote.
pub fn price_gap_per_day(selected: &Bundle, previous: &Bundle) -> Decimal {
    let day_gap = selected
        .validity_in_days
        .saturating_sub(previous.validity_in_days);
    if day_gap == 0 {
        return Decimal::ZERO;
    }
    let per_day = (selected.base_price - previous.base_price) / Decimal::from(day_gap);
    per_day.max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bundle::BundleId;

    fn bundle(id: &str, days: u32, price: Decimal) -> Bundle {
        Bundle {
            id: BundleId::new(id),
            name: format!("Europe {days} Days"),
            groups: vec!["standard".to_string()],
            countries: vec!["IT".to_string(), "FR".to_string()],
            validity_in_days: days,
            base_price: price,
            currency: "USD".to_string(),
            is_unlimited: false,
            data_amount_mb: Some(1_000),
        }
    }

    fn ladder() -> Vec<Bundle> {
        vec![
            bundle("b-7", 7, Decimal::from(10)),
            bundle("b-14", 14, Decimal::from(18)),
            bundle("b-30", 30, Decimal::from(35)),
        ]
    }

    #[test]
    fn per_day_discount_comes_from_the_next_shorter_rung() {
        let bundles = ladder();
        let per_day = unused_day_discount(&bundles, &bundles[1], 10);

        // (18 - 10) / (14 - 7)
        let expected = Decimal::from(8) / Decimal::from(7);
        assert_eq!(per_day, expected);
        assert_eq!(per_day.round_dp(4), Decimal::new(1_1429, 4));
    }

    #[test]
    fn no_shorter_bundle_means_no_discount() {
        let bundles = ladder();
        let per_day = unused_day_discount(&bundles, &bundles[0], 5);

        assert_eq!(per_day, Decimal::ZERO);
    }

    #[test]
    fn inverted_catalog_prices_clamp_to_zero() {
        let bundles = vec![
            bundle("b-7", 7, Decimal::from(20)),
            bundle("b-14", 14, Decimal::from(18)),
        ];
        let per_day = unused_day_discount(&bundles, &bundles[1], 10);

        assert_eq!(per_day, Decimal::ZERO);
    }

    #[test]
    fn comparison_ignores_other_groups_and_countries() {
        let mut bundles = ladder();
        bundles[0].groups = vec!["unlimited".to_string()];

        let per_day = unused_day_discount(&bundles, &bundles[1], 10);
        assert_eq!(per_day, Decimal::ZERO);

        bundles[0].groups = vec!["standard".to_string()];
        bundles[0].countries = vec!["JP".to_string()];
        let per_day = unused_day_discount(&bundles, &bundles[1], 10);
        assert_eq!(per_day, Decimal::ZERO);
    }

    #[test]
    fn equal_validities_never_divide_by_zero() {
        let per_day = price_gap_per_day(
            &bundle("b-a", 14, Decimal::from(18)),
            &bundle("b-b", 14, Decimal::from(10)),
        );

        assert_eq!(per_day, Decimal::ZERO);
    }

    #[test]
    fn unused_days_saturate_at_zero() {
        let selected = bundle("b-7", 7, Decimal::from(10));

        assert_eq!(unused_days(&selected, 10), 0);
        assert_eq!(unused_days(&selected, 7), 0);
        assert_eq!(unused_days(&selected, 3), 4);
    }
}
