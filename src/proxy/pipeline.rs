//! Download pipeline shared by both entry points
//!
//! `Received → Authorizing → {Denied | Resolving} → Fetching →
//! {Streaming | UpstreamFailed} → {Completed | Errored}`
//!
//! Every failing transition is terminal and reported immediately. The two
//! pipelines differ only in how upstream failures are reported, which is
//! captured by [`Pipeline`].

use crate::domain::{Credential, DownloadRequest};
use crate::proxy::authorizer::Authorizer;
use crate::proxy::streaming::StreamingRelay;
use crate::proxy::types::{messages, GatewayError, GatewayResult, RelayError};
use crate::proxy::url_resolver::UrlResolver;
use axum::body::Body;
use http::Response;
use tracing::{error, info, warn};

/// Which entry point a request came through
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Pipeline {
    /// Token-gated endpoint; every upstream failure becomes `502`
    #[display("public")]
    Public,
    /// Key-gated endpoint; upstream status codes pass through verbatim
    #[display("private")]
    Private,
}

impl Pipeline {
    /// Generic error for failures nobody classified
    pub fn internal_error(self) -> GatewayError {
        match self {
            Self::Public => GatewayError::Internal(messages::INTERNAL_ERROR),
            Self::Private => GatewayError::Internal(messages::PRIVATE_INTERNAL_ERROR),
        }
    }

    /// Apply this pipeline's reporting policy to an upstream failure
    pub fn upstream_failure(self, error: &RelayError) -> GatewayError {
        match (self, error) {
            (Self::Public, RelayError::Status { .. } | RelayError::Transport(_)) => {
                GatewayError::BadGateway
            }
            (Self::Private, RelayError::Status { status }) => GatewayError::upstream_status(*status),
            (
                _,
                RelayError::Transport(_)
                | RelayError::InvalidTargetUrl(_)
                | RelayError::InvalidHeader { .. }
                | RelayError::Http(_),
            ) => self.internal_error(),
        }
    }
}

/// Check `credential` with `authorizer`, failing with the mapped denial
pub async fn authorize(
    pipeline: Pipeline,
    authorizer: &dyn Authorizer,
    credential: &Credential,
) -> GatewayResult<()> {
    let decision = authorizer.authorize(credential).await;
    if let Err(e) = decision.into_result() {
        warn!(%pipeline, ?decision, "Download denied");
        return Err(e);
    }
    Ok(())
}

/// Resolve, fetch and stream an already-authorized request
pub async fn fetch_and_relay(
    pipeline: Pipeline,
    resolver: &UrlResolver,
    relay: &StreamingRelay,
    request: &DownloadRequest,
) -> GatewayResult<Response<Body>> {
    let app_id = request.app_id.as_ref();

    let target = resolver.resolve(app_id, request.kind).map_err(|e| {
        error!(%pipeline, app_id, error = %e, "Failed to resolve upstream URL");
        pipeline.internal_error()
    })?;

    match relay.relay(&target, app_id, request.kind).await {
        Ok(response) => {
            info!(%pipeline, app_id, kind = %request.kind, "Streaming download");
            Ok(response)
        }
        Err(e) => {
            let mapped = pipeline.upstream_failure(&e);
            if matches!(mapped, GatewayError::Internal(_)) {
                error!(%pipeline, app_id, error = %e, "Download proxy error");
            } else {
                warn!(%pipeline, app_id, error = %e, "Upstream fetch failed");
            }
            Err(mapped)
        }
    }
}

/// Run the full pipeline: authorize, then resolve, fetch and stream
pub async fn run(
    pipeline: Pipeline,
    authorizer: &dyn Authorizer,
    resolver: &UrlResolver,
    relay: &StreamingRelay,
    request: &DownloadRequest,
) -> GatewayResult<Response<Body>> {
    authorize(pipeline, authorizer, &request.credential).await?;
    fetch_and_relay(pipeline, resolver, relay, request).await
}
