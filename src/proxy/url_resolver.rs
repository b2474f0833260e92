//! Upstream URL resolution for download requests

use crate::config::UpstreamEndpoints;
use crate::domain::{ResourceKind, UpstreamAuthCode};
use crate::proxy::types::{RelayError, TargetUrl, AUTH_CODE_PARAM};

/// Maps (resource id, resource kind) to the upstream generator URL.
///
/// - script:   `{script_base}/{id}?auth_code={code}`
/// - manifest: `{manifest_base}?appid={id}&auth_code={code}`
///
/// The id and auth code are percent-encoded, the bases are used verbatim.
pub fn resolve(
    endpoints: &UpstreamEndpoints,
    resource_id: &str,
    kind: ResourceKind,
    auth_code: &UpstreamAuthCode,
) -> Result<TargetUrl, RelayError> {
    let id = urlencoding::encode(resource_id);
    let code = urlencoding::encode(auth_code.as_ref());

    let url = match kind {
        ResourceKind::Script => format!(
            "{}/{id}?{AUTH_CODE_PARAM}={code}",
            endpoints.script.as_ref().trim_end_matches('/')
        ),
        ResourceKind::Manifest => format!(
            "{}?appid={id}&{AUTH_CODE_PARAM}={code}",
            endpoints.manifest.as_ref()
        ),
    };

    TargetUrl::try_new(url).map_err(|e| RelayError::InvalidTargetUrl(e.to_string()))
}

/// Resolver bound to the server-held endpoints and auth code
#[derive(Debug, Clone)]
pub struct UrlResolver {
    endpoints: UpstreamEndpoints,
    auth_code: UpstreamAuthCode,
}

impl UrlResolver {
    pub fn new(endpoints: UpstreamEndpoints, auth_code: UpstreamAuthCode) -> Self {
        Self {
            endpoints,
            auth_code,
        }
    }

    pub fn resolve(&self, resource_id: &str, kind: ResourceKind) -> Result<TargetUrl, RelayError> {
        resolve(&self.endpoints, resource_id, kind, &self.auth_code)
    }
}
