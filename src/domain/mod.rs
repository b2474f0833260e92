//! Domain types for the download gateway
//!
//! Everything here is request-scoped or immutable configuration; nothing is
//! persisted.

pub mod request;
pub mod resource;
pub mod types;

pub use request::{Credential, DownloadRequest};
pub use resource::ResourceKind;
pub use types::{
    AppId, EndpointUrl, NumericAppId, PrivateKey, PrivateKeySet, UpstreamAuthCode,
    VerificationSecret, VerificationToken,
};
