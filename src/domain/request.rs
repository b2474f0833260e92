//! Per-request download descriptions

use crate::domain::resource::ResourceKind;
use crate::domain::types::{AppId, NumericAppId, VerificationToken};
use std::fmt;

/// Proof presented by the caller, one variant per trust model
#[derive(Clone)]
pub enum Credential {
    /// Human-verification token (public endpoint)
    Token(VerificationToken),
    /// Path-embedded pre-shared key (private endpoint), compared verbatim
    Key(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Credential::Token(..)"),
            Self::Key(_) => f.write_str("Credential::Key(..)"),
        }
    }
}

/// A download the gateway has been asked to perform
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub app_id: AppId,
    pub kind: ResourceKind,
    pub credential: Credential,
}

impl DownloadRequest {
    /// Build a public-endpoint request.
    ///
    /// Returns `None` unless `appid` is strictly numeric and `token` is non-empty.
    pub fn public(appid: Option<String>, token: Option<String>, kind: Option<&str>) -> Option<Self> {
        let numeric = NumericAppId::try_new(appid?).ok()?;
        let token = VerificationToken::try_new(token?).ok()?;
        let app_id = AppId::try_new(numeric.into_inner()).ok()?;

        Some(Self {
            app_id,
            kind: ResourceKind::from_optional(kind),
            credential: Credential::Token(token),
        })
    }

    /// Build a private-endpoint request for an already-presented key.
    ///
    /// Returns `None` when `appid` is absent or empty.
    pub fn private(key: String, appid: Option<String>, kind: &str) -> Option<Self> {
        let app_id = AppId::try_new(appid?).ok()?;

        Some(Self {
            app_id,
            kind: ResourceKind::from_discriminator(kind),
            credential: Credential::Key(key),
        })
    }
}
