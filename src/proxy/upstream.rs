use crate::http_client::HttpClient;
use crate::proxy::error::ProxyError;
use crate::proxy::responses::UpstreamResponse;
use async_trait::async_trait;
use hyper::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use hyper::{Body, HeaderMap, Method, Request, Uri};
use log::debug;
use std::time::Duration;

/// Sends a sanitized request to the origin and buffers the whole response.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn relay(&self, method: &Method, url: &str, headers: &HeaderMap) -> Result<UpstreamResponse, ProxyError>;
}

pub struct HyperUpstream {
    client: HttpClient,
    timeout: Duration,
}

impl HyperUpstream {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn fetch(&self, request: Request<Body>) -> Result<UpstreamResponse, ProxyError> {
        let response = self.client.request(request).await?;
        let (parts, body) = response.into_parts();
        let body = hyper::body::to_bytes(body).await?;
        Ok(UpstreamResponse { status: parts.status, headers: parts.headers, body })
    }
}

#[async_trait]
impl Upstream for HyperUpstream {
    async fn relay(&self, method: &Method, url: &str, headers: &HeaderMap) -> Result<UpstreamResponse, ProxyError> {
        let uri: Uri = url.parse().map_err(|source| ProxyError::InvalidTarget { url: url.to_string(), source })?;
        let mut request = Request::builder().method(method.clone()).uri(uri).body(Body::empty())?;
        *request.headers_mut() = headers.clone();
        // the client body is not forwarded, so its framing must not be either
        request.headers_mut().remove(CONTENT_LENGTH);
        request.headers_mut().remove(TRANSFER_ENCODING);
        debug!("Relaying {} {} with {} header(s)", method, url, request.headers().len());

        tokio::time::timeout(self.timeout, self.fetch(request)).await.map_err(|_| ProxyError::UpstreamTimeout(url.to_string()))?
    }
}
