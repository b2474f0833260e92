//! HTTP header and path constants for the gateway

use ::http::header;

/// Header name for request ID used for tracing and correlation
pub const X_REQUEST_ID: &str = "x-request-id";

/// Headers copied from the upstream response when present
pub use header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};

/// Well-known paths
pub mod paths {
    /// Health check endpoint path
    pub const HEALTH: &str = "/health";

    /// Token-gated public download endpoint
    pub const PUBLIC_DOWNLOAD: &str = "/api/download";

    /// Key-gated private download endpoint
    pub const PRIVATE_DOWNLOAD: &str = "/api/v2/{key}/download/{type}";

    /// Steam store metadata lookup
    pub const GAME_DETAILS: &str = "/api/games/{appid}";
}
