//! Test utilities for gateway testing
//!
//! Counting authorizers, throwaway upstream servers on ephemeral ports and
//! request/response helpers shared by the gateway's router-level tests.

#[cfg(test)]
pub mod test_helpers {
    use crate::config::{SteamLookupConfig, UpstreamEndpoints};
    use crate::domain::{Credential, EndpointUrl, UpstreamAuthCode};
    use crate::proxy::authorizer::{AuthDecision, Authorizer, DenyReason};
    use crate::proxy::service::GatewayService;
    use crate::proxy::streaming::StreamingRelay;
    use crate::proxy::url_resolver::UrlResolver;
    use crate::steam::SteamClient;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request, response::Response, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    pub const TEST_AUTH_CODE: &str = "upstream-secret-code";

    /// Authorizer with a fixed answer that records how often it was asked
    pub struct CountingAuthorizer {
        decision: AuthDecision,
        calls: AtomicUsize,
    }

    impl CountingAuthorizer {
        pub fn allowing() -> Arc<Self> {
            Arc::new(Self {
                decision: AuthDecision::Allow,
                calls: AtomicUsize::new(0),
            })
        }

        pub fn denying(reason: DenyReason) -> Arc<Self> {
            Arc::new(Self {
                decision: AuthDecision::Deny(reason),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Authorizer for CountingAuthorizer {
        async fn authorize(&self, _credential: &Credential) -> AuthDecision {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.decision
        }
    }

    /// Serve `router` on `127.0.0.1:0` and return its base URL
    pub async fn spawn_backend(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral port should bind");
        let addr = listener.local_addr().expect("bound listener has an address");

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("test backend should serve");
        });

        format!("http://{addr}")
    }

    /// Upstream endpoints rooted at `base`
    pub fn test_endpoints(base: &str) -> UpstreamEndpoints {
        UpstreamEndpoints {
            manifest: EndpointUrl::try_new(format!("{base}/secure_download"))
                .expect("test manifest endpoint should be valid"),
            script: EndpointUrl::try_new(format!("{base}/resellerlua"))
                .expect("test script endpoint should be valid"),
        }
    }

    /// Gateway wired to mock authorizers, an upstream at `upstream_base`
    /// and a store API at `steam_base`
    pub fn test_gateway(
        public: Arc<CountingAuthorizer>,
        private: Arc<CountingAuthorizer>,
        upstream_base: &str,
        steam_base: &str,
    ) -> GatewayService {
        let client = reqwest::Client::new();
        let auth_code = UpstreamAuthCode::try_new(TEST_AUTH_CODE.to_string())
            .expect("test auth code should be valid");

        GatewayService::from_parts(
            public,
            private,
            UrlResolver::new(test_endpoints(upstream_base), auth_code),
            StreamingRelay::new(client.clone()),
            SteamClient::new(
                client,
                &SteamLookupConfig {
                    endpoint: EndpointUrl::try_new(format!("{steam_base}/api/appdetails"))
                        .expect("test store endpoint should be valid"),
                    cache_ttl: Duration::from_secs(3600),
                },
            ),
        )
    }

    /// Base URL that refuses connections; nothing listens on port 9
    pub const UNREACHABLE_BASE: &str = "http://127.0.0.1:9";

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("test request should be valid")
    }

    pub async fn body_bytes(response: Response) -> bytes::Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body should be readable")
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).expect("response body should be JSON")
    }
}
