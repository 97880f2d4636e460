use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::breakdown::{PricingBreakdown, PricingStep};
use crate::domain::rule::{Action, PricingRule};

use super::{conditions, BaseAssembly};

/// Runs the active rules over the assembled base totals and closes out the
/// breakdown.
///
/// Rules are ordered by `(category rank, priority descending)` with a stable
/// sort, so equal-priority rules within a phase keep their stored order.
/// Rounding happens exactly once, after the last rule: the final price is
/// ceiled to a whole currency unit.
pub fn apply_rules(
    rules: &[PricingRule],
    context: &Value,
    assembly: BaseAssembly,
    currency: &str,
) -> PricingBreakdown {
    let mut ordered: Vec<&PricingRule> = rules.iter().filter(|rule| rule.is_active).collect();
    ordered.sort_by_key(|rule| (rule.category.rank(), std::cmp::Reverse(rule.priority)));

    let cost = assembly.base_cost;
    let mut price = assembly.total_after_discount;
    let mut processing_rate = Decimal::ZERO;
    let mut profit_floor: Option<Decimal> = None;
    let mut steps = assembly.steps;

    for rule in ordered {
        if !conditions::evaluate_all(&rule.conditions, context) {
            continue;
        }
        tracing::debug!(
            event_name = "pricing.rule.matched",
            rule = %rule.name,
            category = rule.category.as_str(),
        );

        for action in &rule.actions {
            match *action {
                Action::AddMarkup(amount) => {
                    price += amount;
                    steps.push(PricingStep::new("rule.markup", rule.name.clone(), amount));
                }
                Action::ApplyDiscountPercentage(percent) => {
                    let discount = price * percent / Decimal::ONE_HUNDRED;
                    price -= discount;
                    steps.push(PricingStep::new("rule.discount", rule.name.clone(), discount));
                }
                Action::SetProcessingRate(rate) => {
                    processing_rate = rate;
                    steps.push(PricingStep::new(
                        "rule.processing_rate",
                        rule.name.clone(),
                        rate,
                    ));
                }
                Action::SetMinimumProfit(floor) => {
                    profit_floor =
                        Some(profit_floor.map_or(floor, |current: Decimal| current.max(floor)));
                    // profit = price * (1 - rate/100) - cost, so the floor is
                    // reachable only while the retained share stays positive
                    let retained = Decimal::ONE - processing_rate / Decimal::ONE_HUNDRED;
                    if retained <= Decimal::ZERO {
                        continue;
                    }
                    let needed = (floor + cost) / retained;
                    if price < needed {
                        price = needed;
                        steps.push(PricingStep::new(
                            "rule.profit_floor",
                            rule.name.clone(),
                            needed,
                        ));
                    }
                }
                Action::SetMinimumPrice(floor) => {
                    if price < floor {
                        price = floor;
                        steps.push(PricingStep::new(
                            "rule.price_floor",
                            rule.name.clone(),
                            floor,
                        ));
                    }
                }
            }
        }
    }

    let final_price = price.max(Decimal::ZERO).ceil();
    let processing_cost = final_price * processing_rate / Decimal::ONE_HUNDRED;
    let net_profit = final_price - cost - processing_cost;
    let profit_shortfall = profit_floor.is_some_and(|floor| net_profit < floor);
    steps.push(PricingStep::new(
        "total",
        "rounded up to a whole currency unit",
        final_price,
    ));

    PricingBreakdown {
        base_cost: assembly.base_cost,
        markup: assembly.markup,
        total_before_discount: assembly.total_before_discount,
        unused_days: assembly.unused_days,
        discount_per_day: assembly.discount_per_day,
        discount_amount: assembly.discount_amount,
        total_after_discount: assembly.total_after_discount,
        processing_rate,
        processing_cost,
        final_price,
        net_profit,
        profit_shortfall,
        currency: currency.to_string(),
        steps,
        discount: None,
    }
}
