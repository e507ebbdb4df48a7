use std::collections::HashSet;

use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric variable does not parse.
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
/// Returns `ConfigError` if a numeric variable does not parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric variable does not parse.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let input_path = PathBuf::from(or_default("VITRINE_INPUT_FILE", "input.csv"));
    let output_path = PathBuf::from(or_default("VITRINE_OUTPUT_FILE", "output.csv"));
    let log_level = optional("VITRINE_LOG_LEVEL");
    let debug_dir = optional("VITRINE_DEBUG_DIR").map(PathBuf::from);

    let page_load_timeout_secs = parse_u64("VITRINE_PAGE_LOAD_TIMEOUT_SECS", "25")?;
    let ready_timeout_secs = parse_u64("VITRINE_READY_TIMEOUT_SECS", "15")?;
    let http_connect_timeout_secs = parse_u64("VITRINE_HTTP_CONNECT_TIMEOUT_SECS", "8")?;
    let http_read_timeout_secs = parse_u64("VITRINE_HTTP_READ_TIMEOUT_SECS", "20")?;
    let user_agent = or_default("VITRINE_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("VITRINE_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("VITRINE_RETRY_BACKOFF_BASE_SECS", "1")?;
    let postal_code = or_default("VITRINE_POSTAL_CODE", "01001000");

    let limit_rows = match optional("VITRINE_LIMIT_ROWS") {
        Some(raw) => Some(
            raw.parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "VITRINE_LIMIT_ROWS".to_string(),
                    reason: e.to_string(),
                })?,
        ),
        None => None,
    };
    let only_ids = optional("VITRINE_ONLY_IDS").and_then(|raw| parse_id_list(&raw));

    Ok(AppConfig {
        input_path,
        output_path,
        log_level,
        debug_dir,
        page_load_timeout_secs,
        ready_timeout_secs,
        http_connect_timeout_secs,
        http_read_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        postal_code,
        limit_rows,
        only_ids,
    })
}

/// Splits a comma-separated id list. Blank entries are dropped; an empty
/// result is `None` so the filter is not applied at all.
#[must_use]
pub fn parse_id_list(raw: &str) -> Option<HashSet<String>> {
    let ids: HashSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
