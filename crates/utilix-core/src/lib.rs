pub mod aliases;
pub mod app_config;
pub mod config;
pub mod parcel;

use thiserror::Error;

pub use aliases::{canonical_header, load_aliases, AliasTable, CanonicalField};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use parcel::{
    strip_apn_punctuation, BatchProgress, LookupRequest, LookupResult, ParcelUtilityInfo,
};

/// State used when a row or configuration does not name one.
pub const FALLBACK_STATE: &str = "FL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read alias file {path}: {source}")]
    AliasFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse alias file: {0}")]
    AliasFileParse(#[source] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
