use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a usable config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("SECTORNEWS_ENV", "development"))?;
    let log_level = or_default("SECTORNEWS_LOG_LEVEL", "info");

    let catalog_path = PathBuf::from(or_default(
        "SECTORNEWS_CATALOG_PATH",
        "./config/keywords.json",
    ));
    let bucket_dir = PathBuf::from(or_default("SECTORNEWS_BUCKET_DIR", "./data/news"));
    let summary_dir = PathBuf::from(or_default("SECTORNEWS_SUMMARY_DIR", "./data/summary"));

    let feed_base_url = or_default(
        "SECTORNEWS_FEED_BASE_URL",
        "https://news.google.com/rss/search",
    );
    let feed_language = or_default("SECTORNEWS_FEED_LANGUAGE", "ko");
    let feed_region = or_default("SECTORNEWS_FEED_REGION", "KR");

    let lookback_days = parse_u32("SECTORNEWS_LOOKBACK_DAYS", "365")?;
    let max_concurrent_fetches = parse_usize("SECTORNEWS_MAX_CONCURRENT_FETCHES", "5")?.max(1);
    let similarity_threshold = parse_threshold(&or_default(
        "SECTORNEWS_SIMILARITY_THRESHOLD",
        "0.85",
    ))?;

    let request_timeout_secs = parse_u64("SECTORNEWS_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default(
        "SECTORNEWS_USER_AGENT",
        "Mozilla/5.0 (compatible; sectornews/0.1)",
    );
    let max_retries = parse_u32("SECTORNEWS_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("SECTORNEWS_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        env,
        log_level,
        catalog_path,
        bucket_dir,
        summary_dir,
        feed_base_url,
        feed_language,
        feed_region,
        lookback_days,
        max_concurrent_fetches,
        similarity_threshold,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SECTORNEWS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Parse the near-duplicate threshold; it is a cosine similarity, so only
/// values in `[0, 1]` are meaningful.
fn parse_threshold(raw: &str) -> Result<f64, ConfigError> {
    let var = "SECTORNEWS_SIMILARITY_THRESHOLD";
    let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("{value} is outside [0, 1]"),
        });
    }
    Ok(value)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
