use thiserror::Error;

/// Failures that end a proxied connection without a response.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("connection closed before the request head was complete")]
    IncompleteHead,
    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),
    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),
    #[error("invalid target url {url}: {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: hyper::http::uri::InvalidUri,
    },
    #[error("upstream request to {0} timed out")]
    UpstreamTimeout(String),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper::Error),
    #[error("failed to build upstream request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
