use crate::commands::CommandResult;
use roamly_core::config::{AppConfig, LoadOptions};
use roamly_db::{connect_with_settings, migrations, DemoDataset, SeedResult};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
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
                "seed",
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

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seed_result = DemoDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = DemoDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result: Result<SeedResult, (&'static str, String, u8)> =
            if verification.all_present {
                Ok(seed_result)
            } else {
                Err(("seed_verification", verification_message(&verification.checks), 6u8))
            };

        pool.close().await;
        run_result
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", seed_message(&seeded)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn seed_message(seeded: &SeedResult) -> String {
    format!(
        "demo dataset loaded: {} bundles, {} markup rungs, {} pricing rules, {} coupons; demo session {}",
        seeded.bundles, seeded.markups, seeded.rules, seeded.coupons, seeded.demo_session_id
    )
}

fn verification_message(checks: &[(&'static str, bool)]) -> String {
    let failed_checks = checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(*check))
        .collect::<Vec<_>>();

    if failed_checks.is_empty() {
        "some seed data failed to load".to_string()
    } else {
        format!("seed verification failed for checks: {}", failed_checks.join(", "))
    }
}
