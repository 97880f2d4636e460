use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use roamly_core::coupons::{CouponDirectory, SessionStore};
use roamly_core::domain::bundle::{Bundle, BundleId};
use roamly_core::domain::coupon::Coupon;
use roamly_core::domain::request::PricingRequest;
use roamly_core::domain::rule::{Action, Condition, ConditionOperator, PricingRule, RuleCategory};
use roamly_core::domain::session::{CheckoutSession, SessionId, SessionMetadata};
use roamly_core::pricing::{
    CatalogShape, DeterministicQuoteEngine, MarkupRule, MarkupTable, QuoteEngine, QuoteInput,
};

use crate::connection::DbPool;
use crate::repositories::{
    CatalogRepository, MarkupRepository, RepositoryError, RuleRepository, SqlCatalogRepository,
    SqlCouponDirectory, SqlMarkupRepository, SqlRuleRepository, SqlSessionStore,
};

pub const SEED_PROVIDER: &str = "nomado";
pub const SEED_PLAN_TYPE: &str = "standard";
pub const DEMO_SESSION_ID: &str = "cs-demo-0001";

const SEED_BUNDLE_IDS: &[&str] =
    &["eu-7", "eu-14", "eu-30", "asia-7", "asia-30", "eu-unlimited-7"];

const SEED_RULE_NAMES: &[&str] =
    &["stripe-processing-fee", "gold-tier-discount", "long-trip-promo", "quote-price-floor"];

const SEED_COUPON_CODES: &[&str] = &["WELCOME20", "SUMMER5", "RETIRED15"];

/// Deterministic demo dataset: a two-region catalog ladder, wholesale
/// markups, a small rule set, stored coupons, and one already-priced
/// checkout session for coupon flows.
///
/// Loading is idempotent; every write is an upsert keyed on stable ids.
pub struct DemoDataset;

#[derive(Debug)]
pub struct SeedResult {
    pub bundles: usize,
    pub markups: usize,
    pub rules: usize,
    pub coupons: usize,
    pub demo_session_id: String,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl DemoDataset {
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let catalog = SqlCatalogRepository::new(pool.clone());
        let markups = SqlMarkupRepository::new(pool.clone());
        let rules = SqlRuleRepository::new(pool.clone());
        let coupons = SqlCouponDirectory::new(pool.clone());
        let sessions = SqlSessionStore::new(pool.clone());

        let bundles = seed_bundles();
        for bundle in &bundles {
            catalog.save(SEED_PROVIDER, bundle).await?;
        }

        let markup_rules = seed_markups();
        for rule in &markup_rules {
            markups.save(rule).await?;
        }

        let pricing_rules = seed_rules();
        for rule in &pricing_rules {
            rules.save(rule).await?;
        }

        let coupon_rows = seed_coupons();
        for coupon in &coupon_rows {
            coupons.upsert(coupon).await?;
        }

        let session = demo_session(&bundles, &pricing_rules)?;
        sessions.save(&session).await.map_err(|error| {
            RepositoryError::Decode(format!("demo session did not persist: {error}"))
        })?;

        Ok(SeedResult {
            bundles: bundles.len(),
            markups: markup_rules.len(),
            rules: pricing_rules.len(),
            coupons: coupon_rows.len(),
            demo_session_id: DEMO_SESSION_ID.to_string(),
        })
    }

    /// Confirms the seeded rows landed and still decode through the
    /// repositories.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let catalog = SqlCatalogRepository::new(pool.clone());
        let bundles = catalog.list_for_provider(SEED_PROVIDER).await?;
        checks.push(("catalog-bundles", bundles.len() == SEED_BUNDLE_IDS.len()));
        checks.push((
            "catalog-bundle-ids",
            SEED_BUNDLE_IDS
                .iter()
                .all(|id| bundles.iter().any(|bundle| bundle.id.0 == *id)),
        ));

        let markups = SqlMarkupRepository::new(pool.clone());
        let table = markups.table_for(SEED_PROVIDER, SEED_PLAN_TYPE).await?;
        checks.push(("markup-table", !table.is_empty()));

        let rules = SqlRuleRepository::new(pool.clone()).list().await?;
        checks.push((
            "pricing-rules",
            SEED_RULE_NAMES.iter().all(|name| rules.iter().any(|rule| rule.name == *name)),
        ));

        let directory = SqlCouponDirectory::new(pool.clone());
        for code in SEED_COUPON_CODES {
            let found = directory
                .find_by_code(&code.to_ascii_lowercase())
                .await
                .map_err(|error| RepositoryError::Decode(error.to_string()))?;
            checks.push((*code, found.is_some()));
        }

        let sessions = SqlSessionStore::new(pool.clone());
        let session = sessions
            .find(&SessionId::new(DEMO_SESSION_ID))
            .await
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        checks.push(("demo-session", session.is_some()));
        checks.push((
            "demo-session-priced",
            session.is_some_and(|s| s.pricing.final_price > Decimal::ZERO),
        ));

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}

fn bundle(
    id: &str,
    name: &str,
    group: &str,
    countries: &[&str],
    days: u32,
    price: Decimal,
    data_amount_mb: Option<i64>,
) -> Bundle {
    Bundle {
        id: BundleId::new(id),
        name: name.to_string(),
        groups: vec![group.to_string()],
        countries: countries.iter().map(|iso| (*iso).to_string()).collect(),
        validity_in_days: days,
        base_price: price,
        currency: "USD".to_string(),
        is_unlimited: data_amount_mb.is_none(),
        data_amount_mb,
    }
}

fn seed_bundles() -> Vec<Bundle> {
    let europe = &["IT", "FR", "ES", "DE"];
    let asia = &["JP", "TH", "SG"];

    vec![
        bundle("eu-7", "Europe 7 Days", "standard", europe, 7, Decimal::from(10), Some(5_000)),
        bundle("eu-14", "Europe 14 Days", "standard", europe, 14, Decimal::from(18), Some(5_000)),
        bundle("eu-30", "Europe 30 Days", "standard", europe, 30, Decimal::from(35), Some(10_000)),
        bundle("asia-7", "Asia 7 Days", "standard", asia, 7, Decimal::from(8), Some(3_000)),
        bundle("asia-30", "Asia 30 Days", "standard", asia, 30, Decimal::from(26), Some(10_000)),
        bundle(
            "eu-unlimited-7",
            "Europe Unlimited 7 Days",
            "unlimited",
            europe,
            7,
            Decimal::from(14),
            None,
        ),
    ]
}

fn seed_markups() -> Vec<MarkupRule> {
    let entry = |plan_type: &str, days: u32, markup: Decimal| MarkupRule {
        provider_id: SEED_PROVIDER.to_string(),
        plan_type: plan_type.to_string(),
        duration_days: days,
        markup,
    };

    vec![
        entry(SEED_PLAN_TYPE, 7, Decimal::from(4)),
        entry(SEED_PLAN_TYPE, 14, Decimal::new(65, 1)),
        entry(SEED_PLAN_TYPE, 30, Decimal::from(12)),
        entry("unlimited", 7, Decimal::from(6)),
    ]
}

fn seed_rules() -> Vec<PricingRule> {
    vec![
        PricingRule {
            name: "stripe-processing-fee".to_string(),
            category: RuleCategory::Fee,
            conditions: vec![Condition::new(
                "request.paymentMethod",
                ConditionOperator::Equals,
                json!("stripe"),
            )],
            actions: vec![Action::SetProcessingRate(Decimal::new(29, 1))],
            priority: 0,
            is_active: true,
        },
        PricingRule {
            name: "gold-tier-discount".to_string(),
            category: RuleCategory::Discount,
            conditions: vec![Condition::new(
                "customer.tier",
                ConditionOperator::Equals,
                json!("gold"),
            )],
            actions: vec![Action::ApplyDiscountPercentage(Decimal::from(5))],
            priority: 10,
            is_active: true,
        },
        PricingRule {
            name: "long-trip-promo".to_string(),
            category: RuleCategory::Discount,
            conditions: vec![Condition::new(
                "request.requestedDurationDays",
                ConditionOperator::GreaterThanOrEqual,
                json!(30),
            )],
            actions: vec![Action::ApplyDiscountPercentage(Decimal::from(3))],
            priority: 5,
            is_active: true,
        },
        PricingRule {
            name: "quote-price-floor".to_string(),
            category: RuleCategory::Constraint,
            conditions: Vec::new(),
            actions: vec![Action::SetMinimumPrice(Decimal::from(5))],
            priority: 0,
            is_active: true,
        },
    ]
}

fn seed_coupons() -> Vec<Coupon> {
    vec![
        Coupon {
            code: "WELCOME20".to_string(),
            is_active: true,
            coupon_type: "percentage".to_string(),
            value: Decimal::from(20),
            max_discount: Some(Decimal::from(5)),
            valid_until: Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).single(),
        },
        Coupon {
            code: "SUMMER5".to_string(),
            is_active: true,
            coupon_type: "fixed_amount".to_string(),
            value: Decimal::from(5),
            max_discount: None,
            valid_until: None,
        },
        Coupon {
            code: "RETIRED15".to_string(),
            is_active: false,
            coupon_type: "percentage".to_string(),
            value: Decimal::from(15),
            max_discount: None,
            valid_until: None,
        },
    ]
}

/// Prices a ten-day Italy trip against the seeded catalog so the coupon flow
/// has a session to work on out of the box.
fn demo_session(
    bundles: &[Bundle],
    rules: &[PricingRule],
) -> Result<CheckoutSession, RepositoryError> {
    let mut request = PricingRequest::for_days(10);
    request.country_iso = Some("IT".to_string());

    let europe: Vec<Bundle> = bundles
        .iter()
        .filter(|bundle| bundle.groups.iter().any(|group| group == "standard"))
        .filter(|bundle| bundle.countries.iter().any(|iso| iso == "IT"))
        .cloned()
        .collect();

    let markups = MarkupTable::default();
    let pricing = DeterministicQuoteEngine
        .quote(QuoteInput {
            bundles: &europe,
            rules,
            markups: &markups,
            request: &request,
            provider_id: SEED_PROVIDER,
            plan_type: SEED_PLAN_TYPE,
            shape: CatalogShape::Retail,
        })
        .map_err(|error| {
            RepositoryError::Decode(format!("demo session could not be priced: {error}"))
        })?;

    let bundle_name = Some("Europe 14 Days".to_string());
    Ok(CheckoutSession {
        id: SessionId::new(DEMO_SESSION_ID),
        pricing,
        metadata: SessionMetadata {
            country_iso: request.country_iso.clone(),
            requested_duration_days: request.requested_duration_days,
            bundle_name,
        },
        updated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use roamly_core::coupons::SessionStore;
    use roamly_core::domain::session::SessionId;

    use super::{DemoDataset, DEMO_SESSION_ID};
    use crate::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::repositories::SqlSessionStore;

    #[tokio::test]
    async fn load_then_verify_passes_every_check() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let seeded = DemoDataset::load(&pool).await.expect("load fixtures");
        assert_eq!(seeded.bundles, 6);
        assert_eq!(seeded.coupons, 3);

        let verification = DemoDataset::verify(&pool).await.expect("verify fixtures");
        let failed: Vec<&str> = verification
            .checks
            .iter()
            .filter_map(|(name, present)| (!present).then_some(*name))
            .collect();
        assert!(verification.all_present, "failed checks: {failed:?}");
    }

    #[tokio::test]
    async fn load_is_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let first = DemoDataset::load(&pool).await.expect("first load");
        let second = DemoDataset::load(&pool).await.expect("second load");

        assert_eq!(first.bundles, second.bundles);
        assert_eq!(first.rules, second.rules);

        let verification = DemoDataset::verify(&pool).await.expect("verify fixtures");
        assert!(verification.all_present);
    }

    #[tokio::test]
    async fn demo_session_carries_a_prorated_italy_quote() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        DemoDataset::load(&pool).await.expect("load fixtures");

        let store = SqlSessionStore::new(pool);
        let session = store
            .find(&SessionId::new(DEMO_SESSION_ID))
            .await
            .expect("find demo session")
            .expect("demo session seeded");

        // 14-day bundle at 18, minus 4 unused days at (18 - 10) / 7 per day,
        // rounded up to the next whole unit
        assert_eq!(session.pricing.base_cost, Decimal::from(18));
        assert_eq!(session.pricing.unused_days, 4);
        assert_eq!(session.pricing.final_price, Decimal::from(14));
        assert_eq!(session.metadata.country_iso.as_deref(), Some("IT"));
        assert_eq!(session.metadata.requested_duration_days, 10);
    }
}
