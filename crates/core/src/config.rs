use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::CatalogShape;

#[derive(Clone, Debug, Serialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PricingConfig {
    /// Currency reported when a quote has no bundle currency of its own.
    pub default_currency: String,
    pub catalog_shape: CatalogShape,
    /// Flat percentage granted to auto-matched destination codes.
    pub auto_match_discount_percent: Decimal,
    /// Provider feed quoted when the caller does not name one.
    pub default_provider: String,
    pub default_plan_type: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://roamly.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            pricing: PricingConfig {
                default_currency: "USD".to_string(),
                catalog_shape: CatalogShape::Retail,
                auto_match_discount_percent: Decimal::TEN,
                default_provider: "nomado".to_string(),
                default_plan_type: "standard".to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("roamly.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(default_currency) = pricing.default_currency {
                self.pricing.default_currency = default_currency;
            }
            if let Some(catalog_shape) = pricing.catalog_shape {
                self.pricing.catalog_shape = catalog_shape;
            }
            if let Some(percent) = pricing.auto_match_discount_percent {
                self.pricing.auto_match_discount_percent = percent;
            }
            if let Some(default_provider) = pricing.default_provider {
                self.pricing.default_provider = default_provider;
            }
            if let Some(default_plan_type) = pricing.default_plan_type {
                self.pricing.default_plan_type = default_plan_type;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ROAMLY_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("ROAMLY_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("ROAMLY_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("ROAMLY_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("ROAMLY_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("ROAMLY_PRICING_DEFAULT_CURRENCY") {
            self.pricing.default_currency = value;
        }
        if let Some(value) = read_env("ROAMLY_PRICING_CATALOG_SHAPE") {
            self.pricing.catalog_shape = value.parse().map_err(ConfigError::Validation)?;
        }
        if let Some(value) = read_env("ROAMLY_PRICING_AUTO_MATCH_DISCOUNT_PERCENT") {
            self.pricing.auto_match_discount_percent =
                parse_decimal("ROAMLY_PRICING_AUTO_MATCH_DISCOUNT_PERCENT", &value)?;
        }
        if let Some(value) = read_env("ROAMLY_PRICING_DEFAULT_PROVIDER") {
            self.pricing.default_provider = value;
        }
        if let Some(value) = read_env("ROAMLY_PRICING_DEFAULT_PLAN_TYPE") {
            self.pricing.default_plan_type = value;
        }

        let log_level = read_env("ROAMLY_LOGGING_LEVEL").or_else(|| read_env("ROAMLY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ROAMLY_LOGGING_FORMAT").or_else(|| read_env("ROAMLY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("roamly.toml"), PathBuf::from("config/roamly.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    let currency = pricing.default_currency.trim();
    let well_formed =
        currency.len() == 3 && currency.chars().all(|ch| ch.is_ascii_uppercase());
    if !well_formed {
        return Err(ConfigError::Validation(
            "pricing.default_currency must be a three-letter uppercase code".to_string(),
        ));
    }

    if pricing.auto_match_discount_percent < Decimal::ZERO
        || pricing.auto_match_discount_percent > Decimal::ONE_HUNDRED
    {
        return Err(ConfigError::Validation(
            "pricing.auto_match_discount_percent must be in range 0..=100".to_string(),
        ));
    }

    if pricing.default_provider.trim().is_empty() {
        return Err(ConfigError::Validation(
            "pricing.default_provider must not be empty".to_string(),
        ));
    }
    if pricing.default_plan_type.trim().is_empty() {
        return Err(ConfigError::Validation(
            "pricing.default_plan_type must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    default_currency: Option<String>,
    catalog_shape: Option<CatalogShape>,
    auto_match_discount_percent: Option<Decimal>,
    default_provider: Option<String>,
    default_plan_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::pricing::CatalogShape;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_pass_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.database.url == "sqlite://roamly.db", "default database url")?;
        ensure(
            config.pricing.catalog_shape == CatalogShape::Retail,
            "default catalog shape should be retail",
        )?;
        ensure(
            config.pricing.auto_match_discount_percent == Decimal::TEN,
            "default auto-match percent should be 10",
        )?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_ROAMLY_DB_URL", "sqlite://interpolated.db");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("roamly.toml");
            fs::write(
                &path,
                r#"
[database]
url = "${TEST_ROAMLY_DB_URL}"

[pricing]
catalog_shape = "wholesale"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://interpolated.db",
                "database url should be interpolated from the environment",
            )?;
            ensure(
                config.pricing.catalog_shape == CatalogShape::Wholesale,
                "catalog shape should come from the file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_ROAMLY_DB_URL"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ROAMLY_LOG_LEVEL", "warn");
        env::set_var("ROAMLY_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warn log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["ROAMLY_LOG_LEVEL", "ROAMLY_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ROAMLY_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("ROAMLY_PRICING_DEFAULT_PROVIDER", "env-provider");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("roamly.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[pricing]
default_provider = "file-provider"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.pricing.default_provider == "env-provider",
                "env provider should win over the file",
            )?;
            Ok(())
        })();

        clear_vars(&["ROAMLY_DATABASE_URL", "ROAMLY_PRICING_DEFAULT_PROVIDER"]);
        result
    }

    #[test]
    fn missing_required_file_is_an_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let missing = std::path::PathBuf::from("definitely-not-here/roamly.toml");
        let error = match AppConfig::load(LoadOptions {
            config_path: Some(missing),
            require_file: true,
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected a missing-file error".to_string()),
            Err(error) => error,
        };

        ensure(
            matches!(error, ConfigError::MissingConfigFile(_)),
            "error should identify the missing config file",
        )
    }

    #[test]
    fn validation_rejects_malformed_currency() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ROAMLY_PRICING_DEFAULT_CURRENCY", "us");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("pricing.default_currency")
            );
            ensure(has_message, "validation failure should mention pricing.default_currency")
        })();

        clear_vars(&["ROAMLY_PRICING_DEFAULT_CURRENCY"]);
        result
    }

    #[test]
    fn validation_bounds_the_auto_match_percent() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ROAMLY_PRICING_AUTO_MATCH_DISCOUNT_PERCENT", "150");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message)
                    if message.contains("auto_match_discount_percent")
            );
            ensure(has_message, "validation failure should mention the percent bound")
        })();

        clear_vars(&["ROAMLY_PRICING_AUTO_MATCH_DISCOUNT_PERCENT"]);
        result
    }

    #[test]
    fn malformed_numeric_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ROAMLY_DATABASE_MAX_CONNECTIONS", "lots");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected an env override failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "ROAMLY_DATABASE_MAX_CONNECTIONS"
                ),
                "error should name the offending env var",
            )
        })();

        clear_vars(&["ROAMLY_DATABASE_MAX_CONNECTIONS"]);
        result
    }
}
