use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but invalid.
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
/// Returns `ConfigError` if a variable is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a
/// `HashMap` without touching process state.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let log_level = or_default("SHOPVAR_LOG_LEVEL", "info");
    let settings_path = PathBuf::from(or_default(
        "SHOPVAR_SETTINGS_PATH",
        "./config/settings.yaml",
    ));

    // An empty key is as good as no key: enrichment falls back to pass-through.
    let ai_api_key = lookup("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let ai_base_url = or_default(
        "SHOPVAR_AI_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let ai_model = or_default("SHOPVAR_AI_MODEL", "models/gemini-2.5-flash");
    let ai_request_timeout_secs = parse_u64("SHOPVAR_AI_TIMEOUT_SECS", "30")?;
    let ai_max_concurrent = parse_usize("SHOPVAR_AI_MAX_CONCURRENT", "4")?;
    let ai_max_retries = parse_u32("SHOPVAR_AI_MAX_RETRIES", "1")?;
    let ai_retry_backoff_ms = parse_u64("SHOPVAR_AI_RETRY_BACKOFF_MS", "500")?;
    let ai_inter_request_delay_ms = parse_u64("SHOPVAR_AI_INTER_REQUEST_DELAY_MS", "100")?;

    if ai_max_concurrent == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOPVAR_AI_MAX_CONCURRENT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        log_level,
        settings_path,
        ai_api_key,
        ai_base_url,
        ai_model,
        ai_request_timeout_secs,
        ai_max_concurrent,
        ai_max_retries,
        ai_retry_backoff_ms,
        ai_inter_request_delay_ms,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
