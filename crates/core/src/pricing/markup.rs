use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::breakdown::PricingStep;
use crate::domain::request::PricingRequest;

use super::selector::BundleSelection;
use super::{proration, BaseAssembly};

/// One provider markup entry keyed by plan type and duration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkupRule {
    pub provider_id: String,
    pub plan_type: String,
    pub duration_days: u32,
    pub markup: Decimal,
}

/// In-memory markup lookup, loaded from the markup store per provider.
#[derive(Clone, Debug, Default)]
pub struct MarkupTable {
    rules: Vec<MarkupRule>,
}

impl MarkupTable {
    pub fn new(rules: Vec<MarkupRule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Exact-key markup lookup.
    ///
    /// A missing entry quotes with zero markup instead of failing the whole
    /// request; the gap is logged so the catalog team can backfill it.
    pub fn resolve(&self, provider_id: &str, plan_type: &str, duration_days: u32) -> Decimal {
        let hit = self.rules.iter().find(|rule| {
            rule.provider_id == provider_id
                && rule.plan_type == plan_type
                && rule.duration_days == duration_days
        });

        match hit {
            Some(rule) => rule.markup,
            None => {
                tracing::warn!(
                    event_name = "pricing.markup.missing",
                    provider_id,
                    plan_type,
                    duration_days,
                    "no markup configured, quoting wholesale price without margin"
                );
                Decimal::ZERO
            }
        }
    }
}

/// Markup gap between two ladder rungs spread across their day gap, clamped
/// at zero so a markup inversion never raises the quote.
pub fn markup_day_discount(
    upper_markup: Decimal,
    lower_markup: Decimal,
    upper_days: u32,
    lower_days: u32,
) -> Decimal {
    let day_gap = upper_days.saturating_sub(lower_days);
    if day_gap == 0 {
        return Decimal::ZERO;
    }
    ((upper_markup - lower_markup) / Decimal::from(day_gap)).max(Decimal::ZERO)
}

/// Pre-rule totals for a wholesale catalog, where the sell price is the
/// provider cost plus a configured markup and unused days refund markup
/// rather than catalog price.
pub fn assemble_wholesale(
    selection: &BundleSelection<'_>,
    markups: &MarkupTable,
    provider_id: &str,
    plan_type: &str,
    request: &PricingRequest,
) -> BaseAssembly {
    let selected = selection.selected;
    let quantity = Decimal::from(request.quantity());
    let unused_days = proration::unused_days(selected, request.requested_duration_days);

    let unit_markup = markups.resolve(provider_id, plan_type, selected.validity_in_days);
    let base_cost = selected.base_price * quantity;
    let markup = unit_markup * quantity;
    let total_before_discount = base_cost + markup;

    let mut steps = vec![PricingStep::new(
        "base",
        format!("{} wholesale plus markup", selected.name),
        total_before_discount,
    )];

    let discount_per_day = match selection.previous {
        Some(previous) if unused_days > 0 => markup_day_discount(
            unit_markup,
            markups.resolve(provider_id, plan_type, previous.validity_in_days),
            selected.validity_in_days,
            previous.validity_in_days,
        ),
        _ => Decimal::ZERO,
    };

    let discount_amount =
        (discount_per_day * Decimal::from(unused_days) * quantity).min(total_before_discount);
    if discount_amount > Decimal::ZERO {
        steps.push(PricingStep::new(
            "proration",
            format!("{unused_days} unused days refunded from markup"),
            discount_amount,
        ));
    }

    BaseAssembly {
        base_cost,
        markup,
        total_before_discount,
        unused_days,
        discount_per_day,
        discount_amount,
        total_after_discount: total_before_discount - discount_amount,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bundle::{Bundle, BundleId};
    use crate::pricing::selector;

    fn bundle(id: &str, days: u32, price: Decimal) -> Bundle {
        Bundle {
            id: BundleId::new(id),
            name: format!("Asia {days} Days"),
            groups: vec!["standard".to_string()],
            countries: vec!["JP".to_string()],
            validity_in_days: days,
            base_price: price,
            currency: "USD".to_string(),
            is_unlimited: false,
            data_amount_mb: Some(3_000),
        }
    }

    fn table() -> MarkupTable {
        MarkupTable::new(vec![
            MarkupRule {
                provider_id: "airo".to_string(),
                plan_type: "standard".to_string(),
                duration_days: 7,
                markup: Decimal::from(4),
            },
            MarkupRule {
                provider_id: "airo".to_string(),
                plan_type: "standard".to_string(),
                duration_days: 14,
                markup: Decimal::from(11),
            },
        ])
    }

    #[test]
    fn resolve_matches_on_all_three_keys() {
        let table = table();

        assert_eq!(
            table.resolve("airo", "standard", 14),
            Decimal::from(11)
        );
        assert_eq!(table.resolve("airo", "unlimited", 14), Decimal::ZERO);
        assert_eq!(table.resolve("other", "standard", 14), Decimal::ZERO);
        assert_eq!(table.resolve("airo", "standard", 10), Decimal::ZERO);
    }

    #[test]
    fn markup_day_discount_spreads_the_gap() {
        let per_day =
            markup_day_discount(Decimal::from(11), Decimal::from(4), 14, 7);

        assert_eq!(per_day, Decimal::from(1));
    }

    #[test]
    fn markup_inversion_clamps_to_zero() {
        let per_day =
            markup_day_discount(Decimal::from(3), Decimal::from(9), 14, 7);

        assert_eq!(per_day, Decimal::ZERO);
    }

    #[test]
    fn wholesale_assembly_refunds_unused_markup_days() {
        let bundles = vec![
            bundle("b-7", 7, Decimal::from(6)),
            bundle("b-14", 14, Decimal::from(9)),
        ];
        let selection = selector::select_bundle(&bundles, 10).unwrap();
        let request = PricingRequest::for_days(10);

        let assembly = assemble_wholesale(&selection, &table(), "airo", "standard", &request);

        // cost 9 + markup 11, minus 4 unused days at (11 - 4) / 7 = 1/day
        assert_eq!(assembly.base_cost, Decimal::from(9));
        assert_eq!(assembly.markup, Decimal::from(11));
        assert_eq!(assembly.total_before_discount, Decimal::from(20));
        assert_eq!(assembly.unused_days, 4);
        assert_eq!(assembly.discount_per_day, Decimal::from(1));
        assert_eq!(assembly.discount_amount, Decimal::from(4));
        assert_eq!(assembly.total_after_discount, Decimal::from(16));
    }

    #[test]
    fn exact_match_skips_the_markup_refund() {
        let bundles = vec![
            bundle("b-7", 7, Decimal::from(6)),
            bundle("b-14", 14, Decimal::from(9)),
        ];
        let selection = selector::select_bundle(&bundles, 14).unwrap();
        let request = PricingRequest::for_days(14);

        let assembly = assemble_wholesale(&selection, &table(), "airo", "standard", &request);

        assert_eq!(assembly.unused_days, 0);
        assert_eq!(assembly.discount_amount, Decimal::ZERO);
        assert_eq!(assembly.total_after_discount, Decimal::from(20));
    }

    #[test]
    fn missing_markup_quotes_at_cost() {
        let bundles = vec![bundle("b-7", 7, Decimal::from(6))];
        let selection = selector::select_bundle(&bundles, 7).unwrap();
        let request = PricingRequest::for_days(7);
        let empty = MarkupTable::default();

        let assembly = assemble_wholesale(&selection, &empty, "airo", "standard", &request);

        assert_eq!(assembly.markup, Decimal::ZERO);
        assert_eq!(assembly.total_after_discount, Decimal::from(6));
    }
}
