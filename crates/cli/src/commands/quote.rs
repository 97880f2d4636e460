use clap::Args;
use serde_json::{Map, Value};

use crate::commands::CommandResult;
use roamly_core::config::{AppConfig, LoadOptions};
use roamly_core::coupons::SessionStore;
use roamly_core::domain::bundle::Bundle;
use roamly_core::domain::request::PricingRequest;
use roamly_core::domain::session::{CheckoutSession, SessionMetadata};
use roamly_core::pricing::{select_bundle, DeterministicQuoteEngine, QuoteEngine, QuoteInput};
use roamly_db::connect_with_settings;
use roamly_db::repositories::{
    CatalogRepository, MarkupRepository, RuleRepository, SqlCatalogRepository, SqlMarkupRepository,
    SqlRuleRepository, SqlSessionStore,
};

#[derive(Args, Clone, Debug)]
pub struct QuoteArgs {
    #[arg(long, value_name = "ISO", help = "Destination country code, e.g. IT")]
    pub country: String,
    #[arg(long, value_name = "DAYS", help = "Trip length in days")]
    pub days: u32,
    #[arg(long, default_value_t = 1, value_name = "N", help = "Number of eSIMs in the order")]
    pub esims: u32,
    #[arg(long, value_name = "METHOD", help = "Payment method attribute seen by fee rules")]
    pub payment_method: Option<String>,
    #[arg(
        long = "customer",
        value_name = "KEY=VALUE",
        help = "Customer attribute for rule conditions, repeatable"
    )]
    pub customer: Vec<String>,
    #[arg(long, value_name = "PROVIDER", help = "Provider feed to quote from (defaults to config)")]
    pub provider: Option<String>,
    #[arg(long, value_name = "PLAN", help = "Plan type for markup lookup (defaults to config)")]
    pub plan_type: Option<String>,
    #[arg(long, help = "Persist the quote as a checkout session and report its id")]
    pub save: bool,
}

pub fn run(args: QuoteArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    if args.days == 0 {
        return CommandResult::failure("quote", "invalid_argument", "--days must be at least 1", 2);
    }
    if args.esims == 0 {
        return CommandResult::failure("quote", "invalid_argument", "--esims must be at least 1", 2);
    }

    let customer = match parse_customer_attributes(&args.customer) {
        Ok(attributes) => attributes,
        Err(message) => {
            return CommandResult::failure("quote", "invalid_argument", message, 2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let provider =
        args.provider.clone().unwrap_or_else(|| config.pricing.default_provider.clone());
    let plan_type =
        args.plan_type.clone().unwrap_or_else(|| config.pricing.default_plan_type.clone());

    let request = PricingRequest {
        country_iso: Some(args.country.trim().to_ascii_uppercase()),
        region: None,
        requested_duration_days: args.days,
        num_of_esims: args.esims,
        payment_method: args.payment_method.clone(),
        customer,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let synced = SqlCatalogRepository::new(pool.clone())
            .list_for_provider(&provider)
            .await
            .map_err(|error| ("catalog_read", error.to_string(), 5u8))?;
        let candidates = coverage_candidates(synced, &request, &plan_type);

        let rules = SqlRuleRepository::new(pool.clone())
            .list()
            .await
            .map_err(|error| ("rule_read", error.to_string(), 5u8))?;
        let markups = SqlMarkupRepository::new(pool.clone())
            .table_for(&provider, &plan_type)
            .await
            .map_err(|error| ("markup_read", error.to_string(), 5u8))?;

        let selected_bundle = select_bundle(&candidates, args.days)
            .map(|selection| selection.selected.name.clone())
            .ok();

        let breakdown = DeterministicQuoteEngine
            .quote(QuoteInput {
                bundles: &candidates,
                rules: &rules,
                markups: &markups,
                request: &request,
                provider_id: &provider,
                plan_type: &plan_type,
                shape: config.pricing.catalog_shape,
            })
            .map_err(|error| (error.error_class(), error.to_string(), 6u8))?;

        let session_id = if args.save {
            let metadata = SessionMetadata {
                country_iso: request.country_iso.clone(),
                requested_duration_days: args.days,
                bundle_name: selected_bundle,
            };
            let session = CheckoutSession::new(breakdown.clone(), metadata);
            SqlSessionStore::new(pool.clone())
                .save(&session)
                .await
                .map_err(|error| ("session_write", error.to_string(), 5u8))?;
            Some(session.id.0)
        } else {
            None
        };

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>((breakdown, session_id))
    });

    let (breakdown, session_id) = match result {
        Ok(outcome) => outcome,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("quote", error_class, message, exit_code);
        }
    };

    let destination = request.country_iso.as_deref().unwrap_or("unknown");
    let message = match &session_id {
        Some(id) => format!(
            "quoted {} {} for {} days in {destination}; saved session {id}",
            breakdown.currency, breakdown.final_price, args.days
        ),
        None => format!(
            "quoted {} {} for {} days in {destination}",
            breakdown.currency, breakdown.final_price, args.days
        ),
    };

    let breakdown_json = match serde_json::to_value(&breakdown) {
        Ok(value) => value,
        Err(error) => {
            return CommandResult::failure("quote", "serialization", error.to_string(), 1);
        }
    };
    let mut data = Map::new();
    data.insert("breakdown".to_string(), breakdown_json);
    if let Some(id) = session_id {
        data.insert("sessionId".to_string(), Value::String(id));
    }

    CommandResult::success_with_data("quote", message, Value::Object(data))
}

/// Narrows a provider feed to bundles that cover the destination and carry
/// the requested plan-type group.
fn coverage_candidates(
    bundles: Vec<Bundle>,
    request: &PricingRequest,
    plan_type: &str,
) -> Vec<Bundle> {
    let destination = request.country_iso.as_deref().unwrap_or("");
    bundles
        .into_iter()
        .filter(|bundle| {
            bundle.countries.iter().any(|iso| iso.eq_ignore_ascii_case(destination))
                && bundle.groups.iter().any(|group| group.eq_ignore_ascii_case(plan_type))
        })
        .collect()
}

/// Parses repeated `KEY=VALUE` flags into the rule-visible attribute bag.
/// Values that parse as JSON keep their type; everything else is a string.
fn parse_customer_attributes(pairs: &[String]) -> Result<Map<String, Value>, String> {
    let mut attributes = Map::new();

    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            return Err(format!("customer attribute `{pair}` is not in KEY=VALUE form"));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("customer attribute `{pair}` has an empty key"));
        }
        let raw = raw.trim();
        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string()));
        attributes.insert(key.to_string(), value);
    }

    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::{coverage_candidates, parse_customer_attributes};
    use roamly_core::domain::bundle::{Bundle, BundleId};
    use roamly_core::domain::request::PricingRequest;
    use rust_decimal::Decimal;
    use serde_json::Value;

    fn bundle(id: &str, groups: &[&str], countries: &[&str]) -> Bundle {
        Bundle {
            id: BundleId::new(id),
            name: id.to_string(),
            groups: groups.iter().map(|value| value.to_string()).collect(),
            countries: countries.iter().map(|value| value.to_string()).collect(),
            validity_in_days: 7,
            base_price: Decimal::TEN,
            currency: "USD".to_string(),
            is_unlimited: false,
            data_amount_mb: Some(5_000),
        }
    }

    #[test]
    fn customer_attributes_keep_json_types_and_fall_back_to_strings() {
        let attributes = parse_customer_attributes(&[
            "tier=gold".to_string(),
            "device_score=42".to_string(),
            "roaming_opt_in=true".to_string(),
        ])
        .unwrap();

        assert_eq!(attributes["tier"], Value::String("gold".to_string()));
        assert_eq!(attributes["device_score"], Value::from(42));
        assert_eq!(attributes["roaming_opt_in"], Value::Bool(true));
    }

    #[test]
    fn customer_attributes_reject_pairs_without_a_key() {
        let error = parse_customer_attributes(&["=gold".to_string()]).unwrap_err();
        assert!(error.contains("empty key"));

        let error = parse_customer_attributes(&["tier".to_string()]).unwrap_err();
        assert!(error.contains("KEY=VALUE"));
    }

    #[test]
    fn coverage_candidates_filter_on_country_and_plan_group() {
        let feed = vec![
            bundle("eu-7", &["standard"], &["IT", "FR"]),
            bundle("asia-7", &["standard"], &["JP"]),
            bundle("eu-unlimited-7", &["unlimited"], &["IT", "FR"]),
        ];
        let mut request = PricingRequest::for_days(7);
        request.country_iso = Some("IT".to_string());

        let candidates = coverage_candidates(feed, &request, "standard");

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, BundleId::new("eu-7"));
    }

    #[test]
    fn coverage_matching_ignores_case() {
        let feed = vec![bundle("eu-7", &["Standard"], &["it"])];
        let mut request = PricingRequest::for_days(7);
        request.country_iso = Some("IT".to_string());

        let candidates = coverage_candidates(feed, &request, "standard");

        assert_eq!(candidates.len(), 1);
    }
}
