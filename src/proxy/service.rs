//! Main gateway service implementation
//!
//! `GatewayService` owns the per-process collaborators (authorizers,
//! resolver, relay, metadata client) and exposes them as an Axum router.
//!
//! ```rust,ignore
//! use manifest_gateway::proxy::GatewayService;
//!
//! let service = GatewayService::new(&gateway_config)?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, service.into_router()).await?;
//! ```

use crate::config::GatewayConfig;
use crate::domain::{Credential, DownloadRequest, NumericAppId};
use crate::proxy::authorizer::{Authorizer, PrivateKeyAuthorizer, TurnstileAuthorizer};
use crate::proxy::headers::paths;
use crate::proxy::middleware_stack::GatewayMiddlewareStack;
use crate::proxy::pipeline::{self, Pipeline};
use crate::proxy::streaming::StreamingRelay;
use crate::proxy::types::{messages, GatewayError, GatewayResult};
use crate::proxy::url_resolver::UrlResolver;
use crate::steam::{self, GameLookupResponse, SteamClient};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, instrument, warn};

/// User agent sent on every outbound request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Gateway combining both download pipelines and the metadata lookup
pub struct GatewayService {
    public_authorizer: Arc<dyn Authorizer>,
    private_authorizer: Arc<dyn Authorizer>,
    resolver: UrlResolver,
    relay: StreamingRelay,
    steam: SteamClient,
}

impl GatewayService {
    /// Build the service from validated configuration
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self::from_parts(
            Arc::new(TurnstileAuthorizer::new(
                client.clone(),
                config.verification_endpoint.clone(),
                config.verification_secret.clone(),
            )),
            Arc::new(PrivateKeyAuthorizer::new(config.private_keys.clone())),
            UrlResolver::new(config.upstream.clone(), config.upstream_auth_code.clone()),
            StreamingRelay::new(client.clone()),
            SteamClient::new(client, &config.steam),
        ))
    }

    /// Assemble the service from explicit collaborators
    pub fn from_parts(
        public_authorizer: Arc<dyn Authorizer>,
        private_authorizer: Arc<dyn Authorizer>,
        resolver: UrlResolver,
        relay: StreamingRelay,
        steam: SteamClient,
    ) -> Self {
        Self {
            public_authorizer,
            private_authorizer,
            resolver,
            relay,
            steam,
        }
    }

    /// Create an Axum router for the gateway with middleware
    pub fn into_router(self) -> Router {
        let router = Router::new()
            .route(paths::HEALTH, get(health_handler))
            .route(
                paths::PUBLIC_DOWNLOAD,
                get(public_download_handler).head(head_not_allowed),
            )
            .route(
                paths::PRIVATE_DOWNLOAD,
                get(private_download_handler).head(head_not_allowed),
            )
            .route(paths::GAME_DETAILS, get(game_details_handler))
            .with_state(Arc::new(self));

        GatewayMiddlewareStack::new().apply_to_router(router)
    }

    /// Token-gated download: parameters, then verification, then relay
    #[instrument(skip_all, fields(pipeline = %Pipeline::Public))]
    pub async fn public_download(&self, query: PublicDownloadQuery) -> GatewayResult<Response> {
        let request = DownloadRequest::public(query.appid, query.token, query.kind.as_deref())
            .ok_or(GatewayError::BadRequest(messages::MISSING_PARAMETERS))?;

        pipeline::run(
            Pipeline::Public,
            self.public_authorizer.as_ref(),
            &self.resolver,
            &self.relay,
            &request,
        )
        .await
    }

    /// Key-gated download: the key is checked before the app id
    #[instrument(skip_all, fields(pipeline = %Pipeline::Private))]
    pub async fn private_download(
        &self,
        key: String,
        kind: String,
        appid: Option<String>,
    ) -> GatewayResult<Response> {
        let credential = Credential::Key(key);
        pipeline::authorize(
            Pipeline::Private,
            self.private_authorizer.as_ref(),
            &credential,
        )
        .await?;

        let Credential::Key(key) = credential else {
            return Err(Pipeline::Private.internal_error());
        };
        let request = DownloadRequest::private(key, appid, &kind)
            .ok_or(GatewayError::BadRequest(messages::MISSING_APP_ID))?;

        pipeline::fetch_and_relay(Pipeline::Private, &self.resolver, &self.relay, &request).await
    }

    /// Store metadata for `appid`, rendered as the lookup endpoint's body
    pub async fn game_details(&self, appid: &str) -> (StatusCode, GameLookupResponse) {
        let Ok(app_id) = NumericAppId::try_new(appid.to_string()) else {
            return (
                StatusCode::BAD_REQUEST,
                GameLookupResponse::failed(steam::messages::INVALID_APP_ID),
            );
        };

        match self.steam.game_details(&app_id).await {
            Ok(Some(details)) => (StatusCode::OK, GameLookupResponse::found(details)),
            Ok(None) => (
                StatusCode::NOT_FOUND,
                GameLookupResponse::failed(steam::messages::GAME_NOT_FOUND),
            ),
            Err(e) => {
                error!(app_id = %app_id, error = %e, "Steam metadata lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GameLookupResponse::failed(steam::messages::INTERNAL_ERROR),
                )
            }
        }
    }
}

/// Query string of the public download endpoint
#[derive(Debug, Default, Deserialize)]
pub struct PublicDownloadQuery {
    pub appid: Option<String>,
    pub token: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Query string of the private download endpoint
#[derive(Debug, Default, Deserialize)]
pub struct PrivateDownloadQuery {
    pub appid: Option<String>,
}

/// Axum handler for the token-gated download endpoint
async fn public_download_handler(
    State(gateway): State<Arc<GatewayService>>,
    query: Result<Query<PublicDownloadQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    let Ok(Query(query)) = query else {
        return Err(GatewayError::BadRequest(messages::MISSING_PARAMETERS));
    };
    gateway.public_download(query).await
}

/// Axum handler for the key-gated download endpoint.
///
/// A path that cannot be decoded carries no usable key, so it is refused
/// like an unknown one.
async fn private_download_handler(
    State(gateway): State<Arc<GatewayService>>,
    path: Result<Path<(String, String)>, PathRejection>,
    query: Result<Query<PrivateDownloadQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    let Ok(Path((key, kind))) = path else {
        warn!(pipeline = %Pipeline::Private, "Undecodable download path");
        return Err(GatewayError::Unauthorized);
    };
    let appid = query.ok().and_then(|Query(q)| q.appid);
    gateway.private_download(key, kind, appid).await
}

/// Axum handler for the metadata lookup
async fn game_details_handler(
    State(gateway): State<Arc<GatewayService>>,
    appid: Result<Path<String>, PathRejection>,
) -> Response {
    let appid = appid.map(|Path(appid)| appid).unwrap_or_default();
    let (status, body) = gateway.game_details(&appid).await;
    (status, Json(body)).into_response()
}

/// Downloads answer `GET` only; axum would otherwise serve `HEAD` through
/// the `GET` handler
async fn head_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET")])
}

/// Health check handler
async fn health_handler() -> &'static str {
    "OK"
}
