use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const MAX_CONCURRENT_BRANDS_CEILING: usize = 4;
const MAX_CONCURRENT_SEARCHES_CEILING: usize = 16;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

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

    let database_url = require("DATABASE_URL")?;
    let provider_url = require("BRANDSCOPE_PROVIDER_URL")?;

    let env = parse_environment(&or_default("BRANDSCOPE_ENV", "development"))?;
    let log_level = or_default("BRANDSCOPE_LOG_LEVEL", "info");

    let provider_api_key = optional("BRANDSCOPE_PROVIDER_API_KEY");
    let scraper_url = optional("BRANDSCOPE_SCRAPER_URL");
    let llm_url = optional("BRANDSCOPE_LLM_URL");
    let llm_api_key = optional("BRANDSCOPE_LLM_API_KEY");
    let llm_model = or_default("BRANDSCOPE_LLM_MODEL", "gpt-4o-mini");
    let llm_timeout_secs = parse_u64("BRANDSCOPE_LLM_TIMEOUT_SECS", "120")?;

    let request_timeout_secs = parse_u64("BRANDSCOPE_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("BRANDSCOPE_USER_AGENT", "brandscope/0.1 (social-analytics)");
    let max_retries = parse_u32("BRANDSCOPE_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("BRANDSCOPE_RETRY_BACKOFF_BASE_SECS", "2")?;

    let max_concurrent_brands = parse_usize("BRANDSCOPE_MAX_CONCURRENT_BRANDS", "1")?
        .clamp(1, MAX_CONCURRENT_BRANDS_CEILING);
    let max_concurrent_searches = parse_usize("BRANDSCOPE_MAX_CONCURRENT_SEARCHES", "4")?
        .clamp(1, MAX_CONCURRENT_SEARCHES_CEILING);
    let profile_cache_ttl_secs = parse_u64("BRANDSCOPE_PROFILE_CACHE_TTL_SECS", "21600")?;
    let posts_per_platform = parse_usize("BRANDSCOPE_POSTS_PER_PLATFORM", "50")?;
    let mentions_per_source = parse_usize("BRANDSCOPE_MENTIONS_PER_SOURCE", "30")?;

    let utc_offset_hours = parse_utc_offset(&or_default("BRANDSCOPE_UTC_OFFSET_HOURS", "7"))
        .map_err(|reason| invalid("BRANDSCOPE_UTC_OFFSET_HOURS", reason))?;
    let universe_catalog_path = optional("BRANDSCOPE_UNIVERSE_CATALOG_PATH").map(PathBuf::from);

    let db_max_connections = parse_u32("BRANDSCOPE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BRANDSCOPE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BRANDSCOPE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    if db_min_connections > db_max_connections {
        return Err(invalid(
            "BRANDSCOPE_DB_MIN_CONNECTIONS",
            format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        provider_url,
        provider_api_key,
        scraper_url,
        llm_url,
        llm_api_key,
        llm_model,
        llm_timeout_secs,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        max_concurrent_brands,
        max_concurrent_searches,
        profile_cache_ttl_secs,
        posts_per_platform,
        mentions_per_source,
        utc_offset_hours,
        universe_catalog_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BRANDSCOPE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Parse a whole-hour UTC offset. Real-world offsets span `-12..=14`.
fn parse_utc_offset(raw: &str) -> Result<i32, String> {
    let hours = raw.trim().parse::<i32>().map_err(|e| e.to_string())?;
    if (-12..=14).contains(&hours) {
        Ok(hours)
    } else {
        Err(format!("offset {hours} is outside -12..=14"))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
