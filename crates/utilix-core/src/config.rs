use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
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
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so an empty `.env` entry does not pass for a credential.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let api_base = optional("UTILIX_API_BASE");
    let api_token = optional("UTILIX_API_TOKEN");

    let env = parse_environment(&or_default("UTILIX_ENV", "development"))?;
    let log_level = or_default("UTILIX_LOG_LEVEL", "info");
    let default_state = parse_state(&or_default("UTILIX_DEFAULT_STATE", crate::FALLBACK_STATE))?;

    let request_timeout_secs = parse_u64("UTILIX_REQUEST_TIMEOUT_SECS", "30")?;
    let connect_timeout_secs = parse_u64("UTILIX_CONNECT_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("UTILIX_USER_AGENT", "utilix/0.1 (parcel-utilities)");
    let inter_request_delay_ms = parse_u64("UTILIX_INTER_REQUEST_DELAY_MS", "10")?;
    let aliases_path = optional("UTILIX_ALIASES_PATH").map(PathBuf::from);

    Ok(AppConfig {
        api_base,
        api_token,
        env,
        log_level,
        default_state,
        request_timeout_secs,
        connect_timeout_secs,
        user_agent,
        inter_request_delay_ms,
        aliases_path,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "UTILIX_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Validates a two-letter state code and returns it upper-cased.
fn parse_state(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::InvalidEnvVar {
            var: "UTILIX_DEFAULT_STATE".to_string(),
            reason: format!("'{raw}' is not a two-letter state code"),
        });
    }
    Ok(trimmed.to_ascii_uppercase())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
