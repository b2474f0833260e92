//! Access authorization for the two trust models
//!
//! Both strategies implement [`Authorizer`] and produce a uniform
//! [`AuthDecision`], so the download pipeline treats them identically:
//!
//! - [`TurnstileAuthorizer`] checks a human-verification token against the
//!   verification service (one POST per request, no caching, fail closed).
//! - [`PrivateKeyAuthorizer`] checks a pre-shared key against the configured
//!   allow-list (no I/O).

use crate::domain::{Credential, EndpointUrl, PrivateKeySet, VerificationSecret};
use crate::proxy::types::GatewayError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

/// Why a request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The verification service did not confirm the token
    TokenRejected,
    /// The verification service could not be reached or answered garbage
    VerificationUnavailable,
    /// The presented key is not in the allow-list
    UnknownKey,
    /// The credential does not belong to this strategy
    WrongCredential,
}

impl DenyReason {
    /// Client-visible error for this denial
    pub fn into_gateway_error(self) -> GatewayError {
        match self {
            Self::TokenRejected | Self::VerificationUnavailable => GatewayError::Forbidden,
            Self::UnknownKey | Self::WrongCredential => GatewayError::Unauthorized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Allow,
    Deny(DenyReason),
}

impl AuthDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// `Ok(())` when allowed, the mapped client error otherwise
    pub fn into_result(self) -> Result<(), GatewayError> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason.into_gateway_error()),
        }
    }
}

/// A strategy deciding whether a credential may trigger an upstream fetch
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, credential: &Credential) -> AuthDecision;
}

/// Body of the verification service's answer; only `success` matters
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Token strategy backed by a Turnstile-compatible `siteverify` endpoint
pub struct TurnstileAuthorizer {
    client: reqwest::Client,
    endpoint: EndpointUrl,
    secret: VerificationSecret,
}

impl TurnstileAuthorizer {
    pub fn new(client: reqwest::Client, endpoint: EndpointUrl, secret: VerificationSecret) -> Self {
        Self {
            client,
            endpoint,
            secret,
        }
    }

    /// Ask the verification service about `token`
    async fn verify(&self, token: &str) -> Result<SiteVerifyResponse, reqwest::Error> {
        self.client
            .post(self.endpoint.as_ref())
            .form(&[("secret", self.secret.as_ref()), ("response", token)])
            .send()
            .await?
            .json::<SiteVerifyResponse>()
            .await
    }
}

#[async_trait]
impl Authorizer for TurnstileAuthorizer {
    async fn authorize(&self, credential: &Credential) -> AuthDecision {
        let Credential::Token(token) = credential else {
            return AuthDecision::Deny(DenyReason::WrongCredential);
        };

        match self.verify(token.as_ref()).await {
            Ok(answer) if answer.success => AuthDecision::Allow,
            Ok(answer) => {
                debug!(error_codes = ?answer.error_codes, "Verification token rejected");
                AuthDecision::Deny(DenyReason::TokenRejected)
            }
            Err(e) => {
                warn!(error = %e, "Verification service call failed");
                AuthDecision::Deny(DenyReason::VerificationUnavailable)
            }
        }
    }
}

/// Static-key strategy: exact membership in the configured allow-list
pub struct PrivateKeyAuthorizer {
    keys: PrivateKeySet,
}

impl PrivateKeyAuthorizer {
    pub fn new(keys: PrivateKeySet) -> Self {
        Self { keys }
    }

    pub fn permits(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

#[async_trait]
impl Authorizer for PrivateKeyAuthorizer {
    async fn authorize(&self, credential: &Credential) -> AuthDecision {
        match credential {
            Credential::Key(key) if self.permits(key) => AuthDecision::Allow,
            Credential::Key(_) => AuthDecision::Deny(DenyReason::UnknownKey),
            Credential::Token(_) => AuthDecision::Deny(DenyReason::WrongCredential),
        }
    }
}
