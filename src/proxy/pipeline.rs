use crate::auth::{AuthOutcome, CredentialValidator};
use crate::config::Config;
use crate::proxy::error::ProxyError;
use crate::proxy::request::{ProxyRequest, read_head};
use crate::proxy::responses::{BLOCK_PAGE, METHOD_NOT_ALLOWED, unauthorized};
use crate::proxy::upstream::Upstream;
use crate::reputation::ReputationLookup;
use hyper::StatusCode;
use log::{debug, error, info, trace, warn};
use std::fmt::Display;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

const SNIPPET_PREVIEW_CHARS: usize = 100;

/// Per-process policy settings read from [`Config`].
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub block_threshold: f64,
    pub realm: String,
    pub print_reputation: bool,
    pub max_header_bytes: usize,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            block_threshold: config.get_block_threshold(),
            realm: config.get_realm().to_string(),
            print_reputation: config.should_print_reputation(),
            max_header_bytes: config.get_max_header_bytes(),
        }
    }
}

/// Everything a connection handler needs, built once at startup and shared by all connections.
pub struct ProxyContext {
    pub settings: PipelineSettings,
    pub credentials: CredentialValidator,
    pub reputation: Arc<dyn ReputationLookup>,
    pub upstream: Arc<dyn Upstream>,
}

/// How one exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// CONNECT was refused with 405.
    Rejected,
    /// Credentials were missing or wrong; answered 401.
    Unauthorized,
    /// Reputation above the threshold; answered 403.
    Blocked,
    /// Relayed upstream; carries the upstream status.
    Proxied(StatusCode),
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Rejected => write!(f, "rejected (405)"),
            Outcome::Unauthorized => write!(f, "unauthorized (401)"),
            Outcome::Blocked => write!(f, "blocked (403)"),
            Outcome::Proxied(status) => write!(f, "proxied ({})", status.as_u16()),
        }
    }
}

impl ProxyContext {
    /// Serve exactly one request on `stream`, then close it.
    ///
    /// Every failure is contained here: it is logged and the connection is closed without a response.
    /// Close errors are swallowed.
    pub async fn handle_connection<S>(&self, mut stream: S, peer: impl Display)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match self.exchange(&mut stream, &peer).await {
            Ok(outcome) => debug!("Connection from {peer} finished: {outcome}"),
            Err(e) => error!("Connection from {peer} failed: {e}"),
        }
        if let Err(e) = stream.shutdown().await {
            trace!("Ignoring close error for {peer}: {e}");
        }
    }

    /// Read, gate and relay one request. Steps run strictly in this order.
    pub async fn exchange<S>(&self, stream: &mut S, peer: &impl Display) -> Result<Outcome, ProxyError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let head = read_head(stream, self.settings.max_header_bytes).await?;
        let mut request = ProxyRequest::parse(&head)?;

        if request.is_connect() {
            warn!("Rejected CONNECT {} from {peer}: tunneling is not supported", request.target_url);
            return respond(stream, METHOD_NOT_ALLOWED, Outcome::Rejected).await;
        }

        info!("Request from {peer}: method={} url={}", request.method, request.target_url);

        // reputation is always consulted before credentials are looked at
        let reputation = self.reputation.score(&request.target_url).await;
        info!("Reputation url={} score={} cached={}", request.target_url, reputation.score, reputation.cached);
        if self.settings.print_reputation {
            let preview: String = reputation.snippet.chars().take(SNIPPET_PREVIEW_CHARS).collect();
            info!("Reputation body for {}: {:?}", request.target_url, preview);
        }

        let auth = match request.basic_token() {
            Some(token) => self.credentials.validate(token),
            None => AuthOutcome { ok: false, identity: "unknown".to_string() },
        };
        info!("Auth result={} user={}", if auth.ok { "OK" } else { "FAIL" }, auth.identity);
        if !auth.ok {
            return respond(stream, &unauthorized(&self.settings.realm), Outcome::Unauthorized).await;
        }

        if reputation.score > self.settings.block_threshold {
            warn!(
                "Blocked url={} score={} threshold={}",
                request.target_url, reputation.score, self.settings.block_threshold
            );
            return respond(stream, BLOCK_PAGE, Outcome::Blocked).await;
        }

        request.strip_hop_by_hop();
        let response = self.upstream.relay(&request.method, &request.target_url, &request.headers).await?;
        let outcome = Outcome::Proxied(response.status);
        respond(stream, &response.render(), outcome).await?;
        info!("Response url={} action=proxied code={} bytes={}", request.target_url, response.status.as_u16(), response.body.len());
        Ok(outcome)
    }
}

async fn respond<S>(stream: &mut S, bytes: &[u8], outcome: Outcome) -> Result<Outcome, ProxyError>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(bytes).await?;
    stream.flush().await?;
    Ok(outcome)
}
