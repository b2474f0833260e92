//! Type definitions for the proxy module

use http::StatusCode;
use nutype::nutype;
use thiserror::Error;

/// Client-visible error messages. These strings are part of the HTTP contract.
pub mod messages {
    pub const MISSING_PARAMETERS: &str = "Missing parameters";
    pub const MISSING_APP_ID: &str = "Missing App ID: ?appid=... required";
    pub const INVALID_VERIFICATION: &str = "Invalid anti-bot verification";
    pub const INVALID_PRIVATE_KEY: &str = "Unauthorized: Invalid Private Key";
    pub const UPSTREAM_FETCH_FAILED: &str = "Failed to fetch from upstream";
    pub const INTERNAL_ERROR: &str = "Internal Server Error";
    pub const PRIVATE_INTERNAL_ERROR: &str = "Internal Server Error in V2 Proxy";
}

/// Query parameter carrying the upstream credential
pub const AUTH_CODE_PARAM: &str = "auth_code";

/// Fully resolved upstream URL, including the auth code.
///
/// Deliberately has no `Display`: log [`TargetUrl::redacted`] instead.
#[nutype(
    validate(predicate = |s: &str| s.starts_with("http://") || s.starts_with("https://")),
    derive(Clone, PartialEq, Eq, AsRef)
)]
pub struct TargetUrl(String);

impl TargetUrl {
    /// The URL with the auth code value masked
    pub fn redacted(&self) -> String {
        let url = self.as_ref();
        let marker = format!("{AUTH_CODE_PARAM}=");

        match url.find(&marker) {
            Some(start) => {
                let value_start = start + marker.len();
                let value_end = url[value_start..]
                    .find('&')
                    .map(|offset| value_start + offset)
                    .unwrap_or(url.len());
                format!("{}***{}", &url[..value_start], &url[value_end..])
            }
            None => url.to_string(),
        }
    }
}

impl std::fmt::Debug for TargetUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TargetUrl").field(&self.redacted()).finish()
    }
}

/// Failures of the upstream fetch, before any pipeline policy is applied
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Upstream responded with status {status}")]
    Status { status: StatusCode },

    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid upstream URL: {0}")]
    InvalidTargetUrl(String),

    #[error("Invalid response header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    #[error("Failed to build response: {0}")]
    Http(#[from] http::Error),
}

/// Errors returned to clients of the gateway, each rendered as
/// `{"error": "<message>"}` with the status from `status_code()`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{}", messages::INVALID_PRIVATE_KEY)]
    Unauthorized,

    #[error("{}", messages::INVALID_VERIFICATION)]
    Forbidden,

    #[error("{}", messages::UPSTREAM_FETCH_FAILED)]
    BadGateway,

    #[error("Upstream error ({}): {reason}", .status.as_u16())]
    UpstreamStatus { status: StatusCode, reason: String },

    #[error("{0}")]
    Internal(&'static str),
}

impl GatewayError {
    pub fn upstream_status(status: StatusCode) -> Self {
        Self::UpstreamStatus {
            status,
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

/// Result type for gateway request handling
pub type GatewayResult<T> = Result<T, GatewayError>;
