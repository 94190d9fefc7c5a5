//! Shared domain types and configuration for brandscope.

pub mod app_config;
pub mod config;
pub mod platform;
pub mod posts;
pub mod session;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use platform::Platform;
pub use posts::{MediaType, ProfileCounts, RawPost};
pub use session::{
    load_session_file, validate_session, BrandProfile, SessionFile, MAX_COMPETITORS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read session file {path}: {source}")]
    SessionFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse session file: {0}")]
    SessionFileParse(#[source] serde_yaml::Error),

    #[error("session validation failed: {0}")]
    Validation(String),
}
