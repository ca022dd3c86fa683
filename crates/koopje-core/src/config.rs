use crate::app_config::AppConfig;
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
/// Decoupled from the real environment so tests can drive it with a
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so an empty `KEY=` line in `.env` does not
    // masquerade as a credential.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = or_default("DATABASE_URL", "sqlite://simple_ads.db?mode=rwc");
    let log_level = or_default("KOOPJE_LOG_LEVEL", "info");

    let category_name = or_default("KOOPJE_CATEGORY_NAME", "Accesspoints");
    let category_id = optional("KOOPJE_CATEGORY_ID")
        .map(|raw| {
            raw.parse::<u32>()
                .map_err(|e| invalid("KOOPJE_CATEGORY_ID", e.to_string()))
        })
        .transpose()?;

    let poll_interval_minutes = parse_u64("KOOPJE_POLL_INTERVAL_MINUTES", "10")?;
    if poll_interval_minutes == 0 {
        return Err(invalid(
            "KOOPJE_POLL_INTERVAL_MINUTES",
            "must be at least 1 minute".to_string(),
        ));
    }

    let brands_to_monitor = parse_watch_list(&or_default("KOOPJE_BRANDS_TO_MONITOR", ""));

    let zip_code = or_default("KOOPJE_ZIP_CODE", "8334SX");
    let max_distance_meters = parse_u32("KOOPJE_MAX_DISTANCE_METERS", "1000000")?;
    let request_timeout_secs = parse_u64("KOOPJE_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("KOOPJE_USER_AGENT", "koopje/0.1 (listing-monitor)");
    let marketplace_base_url =
        or_default("KOOPJE_MARKETPLACE_BASE_URL", "https://www.marktplaats.nl");

    let gemini_api_key = optional("GEMINI_API_KEY");
    let gemini_model = or_default("GEMINI_MODEL", "gemini-2.5-flash-preview-05-20");
    let gemini_base_url = or_default(
        "GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let classifier_max_attempts = parse_u32("KOOPJE_CLASSIFIER_MAX_ATTEMPTS", "3")?;
    if classifier_max_attempts == 0 {
        return Err(invalid(
            "KOOPJE_CLASSIFIER_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let classifier_backoff_base_ms = parse_u64("KOOPJE_CLASSIFIER_BACKOFF_BASE_MS", "1000")?;

    let telegram_bot_token = optional("TELEGRAM_BOT_TOKEN_KOOPJE");
    let telegram_chat_id = optional("TELEGRAM_CHAT_ID_KOOPJE");
    let telegram_base_url = or_default("TELEGRAM_BASE_URL", "https://api.telegram.org");

    Ok(AppConfig {
        database_url,
        log_level,
        category_name,
        category_id,
        poll_interval_minutes,
        brands_to_monitor,
        zip_code,
        max_distance_meters,
        request_timeout_secs,
        user_agent,
        marketplace_base_url,
        gemini_api_key,
        gemini_model,
        gemini_base_url,
        classifier_max_attempts,
        classifier_backoff_base_ms,
        telegram_bot_token,
        telegram_chat_id,
        telegram_base_url,
    })
}

/// Split a comma-separated watch-list, keeping order and dropping blanks.
fn parse_watch_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
