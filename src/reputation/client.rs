use crate::http_client::HttpClient;
use crate::reputation::{ReputationLookup, ReputationResult};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use hyper::{Body, Request, Uri};
use log::{trace, warn};
use std::time::Duration;

/// Queries the reputation service over HTTP: `GET <endpoint>?url=<target>`.
#[derive(Clone)]
pub struct HttpReputationClient {
    client: HttpClient,
    endpoint: String,
    timeout: Duration,
}

impl HttpReputationClient {
    pub fn new(client: HttpClient, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self { client, endpoint: endpoint.into(), timeout }
    }

    /// Build the query URI for `target`, appending to any query the endpoint already carries.
    pub fn query_uri(&self, target: &str) -> Result<Uri> {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        let uri = format!("{}{}url={}", self.endpoint, separator, urlencoding::encode(target));
        uri.parse::<Uri>().map_err(|e| anyhow!("Invalid reputation query URI {uri}: {e}"))
    }

    async fn query(&self, target: &str) -> Result<ReputationResult> {
        let request = Request::get(self.query_uri(target)?).body(Body::empty())?;
        let response = self.client.request(request).await?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;
        trace!("Reputation service answered {} for {}: {}", status, target, String::from_utf8_lossy(&body));
        serde_json::from_slice::<ReputationResult>(&body)
            .map_err(|e| anyhow!("Unexpected reputation answer (status {status}): {e}"))
    }
}

#[async_trait]
impl ReputationLookup for HttpReputationClient {
    async fn score(&self, url: &str) -> ReputationResult {
        match tokio::time::timeout(self.timeout, self.query(url)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!("Reputation check for {} failed: {:#}", url, e);
                ReputationResult::check_failed()
            }
            Err(_) => {
                warn!("Reputation check for {} timed out after {:?}", url, self.timeout);
                ReputationResult::check_failed()
            }
        }
    }
}
