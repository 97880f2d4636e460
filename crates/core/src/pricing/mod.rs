pub mod conditions;
pub mod markup;
pub mod pipeline;
pub mod proration;
pub mod selector;

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::breakdown::{PricingBreakdown, PricingStep};
use crate::domain::bundle::Bundle;
use crate::domain::request::PricingRequest;
use crate::domain::rule::PricingRule;
use crate::errors::PricingError;

pub use markup::{MarkupRule, MarkupTable};
pub use selector::{select_bundle, BundleSelection};

/// How the synced catalog prices its bundles.
///
/// Retail feeds carry sell prices, so unused days refund along the catalog
/// price ladder. Wholesale feeds carry provider cost and the margin lives in
/// markups, so unused days refund along the markup ladder. A deployment runs
/// exactly one shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogShape {
    Retail,
    Wholesale,
}

impl CatalogShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retail => "retail",
            Self::Wholesale => "wholesale",
        }
    }
}

impl FromStr for CatalogShape {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "retail" => Ok(Self::Retail),
            "wholesale" => Ok(Self::Wholesale),
            other => Err(format!("unsupported catalog shape `{other}`")),
        }
    }
}

/// Everything the engine needs to price one request.
///
/// `bundles` are the candidates for the requested coverage from a single
/// provider feed; selection and proration both run over this set.
#[derive(Clone, Debug)]
pub struct QuoteInput<'a> {
    pub bundles: &'a [Bundle],
    pub rules: &'a [PricingRule],
    pub markups: &'a MarkupTable,
    pub request: &'a PricingRequest,
    pub provider_id: &'a str,
    pub plan_type: &'a str,
    pub shape: CatalogShape,
}

pub trait QuoteEngine: Send + Sync {
    fn quote(&self, input: QuoteInput<'_>) -> Result<PricingBreakdown, PricingError>;
}

/// Pure engine: same input, same breakdown, no side effects beyond logging.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicQuoteEngine;

impl QuoteEngine for DeterministicQuoteEngine {
    fn quote(&self, input: QuoteInput<'_>) -> Result<PricingBreakdown, PricingError> {
        price_request(input)
    }
}

/// Intermediate totals between base assembly and the rule pipeline.
#[derive(Clone, Debug)]
pub struct BaseAssembly {
    pub base_cost: Decimal,
    pub markup: Decimal,
    pub total_before_discount: Decimal,
    pub unused_days: u32,
    pub discount_per_day: Decimal,
    pub discount_amount: Decimal,
    pub total_after_discount: Decimal,
    pub steps: Vec<PricingStep>,
}

/// Prices one request end to end: selection, base assembly for the catalog
/// shape, then the rule pipeline.
pub fn price_request(input: QuoteInput<'_>) -> Result<PricingBreakdown, PricingError> {
    let selection = selector::select_bundle(input.bundles, input.request.requested_duration_days)?;
    tracing::debug!(
        event_name = "pricing.bundle.selected",
        bundle = %selection.selected.id.0,
        validity_in_days = selection.selected.validity_in_days,
        requested_days = input.request.requested_duration_days,
    );

    let assembly = match input.shape {
        CatalogShape::Retail => assemble_retail(input.bundles, &selection, input.request),
        CatalogShape::Wholesale => markup::assemble_wholesale(
            &selection,
            input.markups,
            input.provider_id,
            input.plan_type,
            input.request,
        ),
    };

    let context = pricing_context(selection.selected, input.request);
    Ok(pipeline::apply_rules(
        input.rules,
        &context,
        assembly,
        &selection.selected.currency,
    ))
}

/// Pre-rule totals for a retail catalog, where the base price already is the
/// sell price and unused days refund along the price ladder.
fn assemble_retail(
    bundles: &[Bundle],
    selection: &BundleSelection<'_>,
    request: &PricingRequest,
) -> BaseAssembly {
    let selected = selection.selected;
    let quantity = Decimal::from(request.quantity());
    let unused_days = proration::unused_days(selected, request.requested_duration_days);

    let base_cost = selected.base_price * quantity;
    let mut steps = vec![PricingStep::new(
        "base",
        format!("{} at catalog price", selected.name),
        base_cost,
    )];

    let discount_per_day = if unused_days > 0 {
        proration::unused_day_discount(bundles, selected, request.requested_duration_days)
    } else {
        Decimal::ZERO
    };
    let discount_amount = (discount_per_day * Decimal::from(unused_days) * quantity).min(base_cost);
    if discount_amount > Decimal::ZERO {
        steps.push(PricingStep::new(
            "proration",
            format!("{unused_days} unused days"),
            discount_amount,
        ));
    }

    BaseAssembly {
        base_cost,
        markup: Decimal::ZERO,
        total_before_discount: base_cost,
        unused_days,
        discount_per_day,
        discount_amount,
        total_after_discount: base_cost - discount_amount,
        steps,
    }
}

/// Document rule conditions evaluate against: the selected bundle, the
/// request, and the free-form customer attributes.
pub fn pricing_context(bundle: &Bundle, request: &PricingRequest) -> Value {
    let mut context = serde_json::Map::new();
    context.insert(
        "bundle".to_string(),
        serde_json::to_value(bundle).unwrap_or(Value::Null),
    );
    context.insert(
        "request".to_string(),
        serde_json::to_value(request).unwrap_or(Value::Null),
    );
    context.insert("customer".to_string(), Value::Object(request.customer.clone()));
    Value::Object(context)
}
