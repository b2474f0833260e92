use thiserror::Error;

/// Application-level errors raised while starting or running the gateway.
///
/// Per-request failures are [`crate::proxy::GatewayError`]s and never
/// surface here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid gateway configuration: {0}")]
    InvalidConfig(#[from] crate::config::GatewayConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
