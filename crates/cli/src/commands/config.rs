use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use roamly_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "database.url",
        &config.database.url,
        field_source(
            "database.url",
            &["ROAMLY_DATABASE_URL"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "database.max_connections",
        &config.database.max_connections.to_string(),
        field_source(
            "database.max_connections",
            &["ROAMLY_DATABASE_MAX_CONNECTIONS"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "database.timeout_secs",
        &config.database.timeout_secs.to_string(),
        field_source(
            "database.timeout_secs",
            &["ROAMLY_DATABASE_TIMEOUT_SECS"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "pricing.default_currency",
        &config.pricing.default_currency,
        field_source(
            "pricing.default_currency",
            &["ROAMLY_PRICING_DEFAULT_CURRENCY"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "pricing.catalog_shape",
        config.pricing.catalog_shape.as_str(),
        field_source(
            "pricing.catalog_shape",
            &["ROAMLY_PRICING_CATALOG_SHAPE"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "pricing.auto_match_discount_percent",
        &config.pricing.auto_match_discount_percent.to_string(),
        field_source(
            "pricing.auto_match_discount_percent",
            &["ROAMLY_PRICING_AUTO_MATCH_DISCOUNT_PERCENT"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "pricing.default_provider",
        &config.pricing.default_provider,
        field_source(
            "pricing.default_provider",
            &["ROAMLY_PRICING_DEFAULT_PROVIDER"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "pricing.default_plan_type",
        &config.pricing.default_plan_type,
        field_source(
            "pricing.default_plan_type",
            &["ROAMLY_PRICING_DEFAULT_PLAN_TYPE"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        field_source(
            "logging.level",
            &["ROAMLY_LOGGING_LEVEL", "ROAMLY_LOG_LEVEL"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        field_source(
            "logging.format",
            &["ROAMLY_LOGGING_FORMAT", "ROAMLY_LOG_FORMAT"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("roamly.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/roamly.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    for env_key in env_keys {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
