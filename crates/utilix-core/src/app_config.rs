use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Base URL of the parcel resolution service.
    pub api_base: Option<String>,
    pub api_token: Option<String>,
    pub env: Environment,
    pub log_level: String,
    /// Upper-cased two-letter code applied to rows without a state.
    pub default_state: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub inter_request_delay_ms: u64,
    /// Optional YAML header-alias table; the built-in table is used when unset.
    pub aliases_path: Option<PathBuf>,
}

impl AppConfig {
    /// Returns the service base URL and bearer token, both of which must be
    /// set before any lookup is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first unset variable.
    pub fn api_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let base = self
            .api_base
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("UTILIX_API_BASE".to_string()))?;
        let token = self
            .api_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("UTILIX_API_TOKEN".to_string()))?;
        Ok((base, token))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base", &self.api_base)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("default_state", &self.default_state)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("aliases_path", &self.aliases_path)
            .finish()
    }
}
