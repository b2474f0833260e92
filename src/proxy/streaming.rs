//! Streaming relay of upstream downloads
//!
//! The upstream body is never collected: each chunk is handed to the
//! outbound response as it arrives, so hyper's write side sets the pace.
//! When the client goes away the response body (and with it the upstream
//! connection) is dropped, which [`RelayStream`] records.

use crate::domain::ResourceKind;
use crate::proxy::headers::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use crate::proxy::types::{RelayError, TargetUrl};
use axum::body::Body;
use bytes::Bytes;
use futures_util::Stream;
use http::{HeaderValue, Response, StatusCode};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, info, instrument, warn};

pin_project! {
    /// Pass-through stream that counts relayed bytes and notices early termination
    pub struct RelayStream<S> {
        #[pin]
        inner: S,
        resource: String,
        relayed: u64,
        expected: Option<u64>,
        finished: bool,
    }

    impl<S> PinnedDrop for RelayStream<S> {
        fn drop(this: Pin<&mut Self>) {
            let this = this.project();
            if !*this.finished {
                warn!(
                    resource = %this.resource,
                    bytes_relayed = *this.relayed,
                    expected_bytes = ?this.expected,
                    "Download stream dropped before completion, closing upstream connection"
                );
            }
        }
    }
}

impl<S> RelayStream<S> {
    pub fn new(inner: S, resource: String, expected: Option<u64>) -> Self {
        Self {
            inner,
            resource,
            relayed: 0,
            expected,
            finished: false,
        }
    }
}

impl<S, E> Stream for RelayStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    type Item = Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                *this.relayed += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                *this.finished = true;
                warn!(
                    resource = %this.resource,
                    bytes_relayed = *this.relayed,
                    error = %e,
                    "Upstream stream failed mid-relay"
                );
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if !*this.finished {
                    *this.finished = true;
                    info!(
                        resource = %this.resource,
                        bytes_relayed = *this.relayed,
                        "Download relayed"
                    );
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Performs the upstream GET and turns a successful answer into a streamed response
#[derive(Clone)]
pub struct StreamingRelay {
    client: reqwest::Client,
}

impl StreamingRelay {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Issue a single GET. Non-2xx answers are errors; nothing is retried.
    #[instrument(skip_all, fields(upstream = %target.redacted()))]
    pub async fn fetch(&self, target: &TargetUrl) -> Result<reqwest::Response, RelayError> {
        let response = self.client.get(target.as_ref()).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Upstream responded");

        if !status.is_success() {
            return Err(RelayError::Status { status });
        }

        Ok(response)
    }

    /// Fetch `target` and relay it as a download of `resource_id`
    pub async fn relay(
        &self,
        target: &TargetUrl,
        resource_id: &str,
        kind: ResourceKind,
    ) -> Result<Response<Body>, RelayError> {
        let upstream = self.fetch(target).await?;
        into_download_response(upstream, resource_id, kind)
    }
}

/// Build the outbound response from a successful upstream answer.
///
/// `Content-Type` and `Content-Disposition` are copied or defaulted from
/// `kind`; `Content-Length` is copied only when the upstream sends it.
pub fn into_download_response(
    upstream: reqwest::Response,
    resource_id: &str,
    kind: ResourceKind,
) -> Result<Response<Body>, RelayError> {
    let headers = upstream.headers();

    let content_type = match headers.get(CONTENT_TYPE) {
        Some(value) => value.clone(),
        None => HeaderValue::from_static(kind.default_content_type()),
    };

    let content_disposition = match headers.get(CONTENT_DISPOSITION) {
        Some(value) => value.clone(),
        None => HeaderValue::try_from(kind.fallback_disposition(resource_id)).map_err(|e| {
            RelayError::InvalidHeader {
                name: "content-disposition",
                reason: e.to_string(),
            }
        })?,
    };

    let content_length = headers.get(CONTENT_LENGTH).cloned();
    let expected = content_length
        .as_ref()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_DISPOSITION, content_disposition);

    if let Some(length) = content_length {
        builder = builder.header(CONTENT_LENGTH, length);
    }

    let resource = format!("{kind}:{resource_id}");
    let body = Body::from_stream(RelayStream::new(
        upstream.bytes_stream(),
        resource,
        expected,
    ));

    Ok(builder.body(body)?)
}
