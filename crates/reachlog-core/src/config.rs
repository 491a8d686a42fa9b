use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
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

    // Only `update` talks to the Graph API; the offline commands run without these.
    let optional = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());
    let access_token = optional("REACHLOG_ACCESS_TOKEN");
    let account_id = optional("REACHLOG_ACCOUNT_ID");

    let dataset_path = PathBuf::from(or_default("REACHLOG_DATASET_PATH", "./insights.csv"));

    let window_days = parse_u32("REACHLOG_WINDOW_DAYS", "30")?;
    if window_days == 0 {
        return Err(invalid(
            "REACHLOG_WINDOW_DAYS",
            "must be at least 1".to_string(),
        ));
    }

    let fetch_follower_count = parse_bool(&or_default("REACHLOG_FETCH_FOLLOWERS", "true"))
        .ok_or_else(|| invalid("REACHLOG_FETCH_FOLLOWERS", "expected true or false".to_string()))?;

    let timezone = match lookup("REACHLOG_TIMEZONE") {
        Ok(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<chrono_tz::Tz>()
                .map_err(|e| invalid("REACHLOG_TIMEZONE", e.to_string()))?,
        ),
        _ => None,
    };

    let graph_base_url = or_default(
        "REACHLOG_GRAPH_BASE_URL",
        "https://graph.facebook.com/v22.0/",
    );
    let request_timeout_secs = parse_u64("REACHLOG_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("REACHLOG_USER_AGENT", "reachlog/0.1 (insights-sync)");
    let max_retries = parse_u32("REACHLOG_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("REACHLOG_RETRY_BACKOFF_BASE_MS", "1000")?;
    let log_level = or_default("REACHLOG_LOG_LEVEL", "info");

    Ok(AppConfig {
        access_token,
        account_id,
        dataset_path,
        window_days,
        fetch_follower_count,
        timezone,
        graph_base_url,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        log_level,
    })
}

/// Accepts the usual spellings of a boolean flag.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
