use crate::commands::CommandResult;
use roamly_core::config::{AppConfig, LoadOptions};
use roamly_db::{connect_with_settings, migrations};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "migrate",
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
                "migrate",
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
        let catalog_rows = migrations::catalog_row_count(&pool).await.ok();
        pool.close().await;
        Ok::<Option<i64>, (&'static str, String, u8)>(catalog_rows)
    });

    match result {
        Ok(catalog_rows) => CommandResult::success("migrate", migrate_message(catalog_rows)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}

/// Success message reflects the catalog state; an empty catalog points the
/// operator at `roamly seed`.
fn migrate_message(catalog_rows: Option<i64>) -> String {
    match catalog_rows {
        Some(0) => "applied pending migrations; catalog is empty, run `roamly seed` for demo data"
            .to_string(),
        Some(count) => format!("applied pending migrations; catalog holds {count} bundles"),
        None => "applied pending migrations".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::migrate_message;

    #[test]
    fn empty_catalog_message_points_at_seeding() {
        let message = migrate_message(Some(0));
        assert!(message.contains("run `roamly seed`"), "unexpected message: {message}");
    }

    #[test]
    fn populated_catalog_message_reports_the_bundle_count() {
        assert_eq!(
            migrate_message(Some(6)),
            "applied pending migrations; catalog holds 6 bundles"
        );
    }

    #[test]
    fn unreadable_catalog_falls_back_to_the_plain_message() {
        assert_eq!(migrate_message(None), "applied pending migrations");
    }
}
