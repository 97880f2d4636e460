use serde_json::{Map, Value};

use crate::commands::CommandResult;
use roamly_core::config::{AppConfig, LoadOptions};
use roamly_core::coupons::CouponResolver;
use roamly_core::domain::session::SessionId;
use roamly_core::errors::CouponError;
use roamly_db::connect_with_settings;
use roamly_db::repositories::{SqlCouponDirectory, SqlSessionStore};

pub fn run(session_id: &str, code: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "coupon",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "coupon",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let resolver = CouponResolver::new(
            SqlSessionStore::new(pool.clone()),
            SqlCouponDirectory::new(pool.clone()),
        )
        .with_auto_match_percent(config.pricing.auto_match_discount_percent);

        let outcome = resolver.apply(&SessionId::new(session_id), code).await;
        pool.close().await;

        outcome.map_err(|error| {
            // Backend faults are operational failures; everything else is a
            // rejection of the submitted code.
            let exit_code = match &error {
                CouponError::Store(_) => 5u8,
                _ => 6u8,
            };
            (error.error_class(), error.to_string(), exit_code)
        })
    });

    let session = match result {
        Ok(session) => session,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("coupon", error_class, message, exit_code);
        }
    };

    let applied_code = session
        .pricing
        .discount
        .as_ref()
        .map(|discount| discount.code.clone())
        .unwrap_or_else(|| code.trim().to_ascii_lowercase());
    let message = format!(
        "applied coupon `{applied_code}` to session {}; new total {} {}",
        session.id.0, session.pricing.currency, session.pricing.final_price
    );

    let pricing_json = match serde_json::to_value(&session.pricing) {
        Ok(value) => value,
        Err(error) => {
            return CommandResult::failure("coupon", "serialization", error.to_string(), 1);
        }
    };
    let mut data = Map::new();
    data.insert("sessionId".to_string(), Value::String(session.id.0.clone()));
    data.insert("breakdown".to_string(), pricing_json);

    CommandResult::success_with_data("coupon", message, Value::Object(data))
}
