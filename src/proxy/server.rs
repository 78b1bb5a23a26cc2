use crate::auth::CredentialValidator;
use crate::config::Config;
use crate::http_client::build_client;
use crate::proxy::pipeline::{PipelineSettings, ProxyContext};
use crate::proxy::tls::load_acceptor;
use crate::proxy::upstream::HyperUpstream;
use crate::reputation::HttpReputationClient;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_native_tls::TlsAcceptor;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::TcpListenerStream;

impl ProxyContext {
    /// Wire the real collaborators: one shared outbound client for the reputation service and the origin.
    pub fn from_config(config: &Config) -> Self {
        let client = build_client();
        Self {
            settings: PipelineSettings::from(config),
            credentials: CredentialValidator::new(config.get_users().iter().cloned()),
            reputation: Arc::new(HttpReputationClient::new(
                client.clone(),
                config.get_reputation_service(),
                config.get_reputation_timeout(),
            )),
            upstream: Arc::new(HyperUpstream::new(client, config.get_upstream_timeout())),
        }
    }
}

/// Bind the configured address and serve forever. Bind and certificate failures are returned to the caller.
pub async fn start_proxy_server(config: &Config) -> Result<()> {
    let addr = format!("{}:{}", config.get_host(), config.get_port());
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind proxy on {addr}"))?;

    let tls = if config.get_tls().is_enabled() {
        Some(load_acceptor(config.get_tls().get_cert_path(), config.get_tls().get_key_path()).await?)
    } else {
        None
    };

    info!("Proxy running on {} ({})", addr, if tls.is_some() { "TLS" } else { "plain TCP" });
    serve(listener, Arc::new(ProxyContext::from_config(config)), tls).await;
    Ok(())
}

/// Accept connections and spawn one independent task per connection.
pub async fn serve(listener: TcpListener, context: Arc<ProxyContext>, tls: Option<TlsAcceptor>) {
    let mut incoming = TcpListenerStream::new(listener);
    while let Some(accepted) = incoming.next().await {
        let stream = match accepted {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Accept error: {}", e);
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                continue;
            }
        };
        let peer = match stream.peer_addr() {
            Ok(peer) => peer.to_string(),
            Err(_) => "unknown".to_string(),
        };
        debug!("Accepted connection from {}", peer);

        let context = context.clone();
        let tls = tls.clone();
        tokio::spawn(async move {
            match tls {
                Some(acceptor) => match acceptor.accept(stream).await {
                    Ok(tls_stream) => context.handle_connection(tls_stream, peer).await,
                    Err(e) => warn!("TLS handshake with {} failed: {}", peer, e),
                },
                None => context.handle_connection(stream, peer).await,
            }
        });
    }
    warn!("Listener stream ended");
}
