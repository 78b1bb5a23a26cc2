//! Keyword scanner for URL bodies.
//!
//! The body is cut into fixed-size chunks and every chunk is tested on its own, so a keyword that
//! straddles two chunks is not seen. Scores are fixed: a keyword hit is 0.9, a clean body 0.1 and a
//! failed fetch 1.0. Redirects are followed (at most [`MAX_REDIRECTS`]) and the final page is scanned.

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use hyper::body::HttpBody;
use hyper::header::LOCATION;
use hyper::{Body, Request, Response, Uri};
use log::{debug, warn};
use repgate::http_client::HttpClient;
use std::time::Duration;

pub const SCORE_KEYWORD_MATCH: f64 = 0.9;
pub const SCORE_CLEAN: f64 = 0.1;
pub const SCORE_FETCH_FAILED: f64 = 1.0;
pub const FETCH_FAILED: &str = "Fetch failed";
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub score: f64,
    pub snippet: String,
}

#[async_trait]
pub trait ContentScanner: Send + Sync {
    async fn scan(&self, url: &str) -> ScanResult;
}

/// Collects decoded chunk text up to the snippet cap and remembers whether a keyword was seen.
struct SnippetCollector<'a> {
    keywords: &'a [String],
    cap: usize,
    snippet: String,
    matched: bool,
}

impl<'a> SnippetCollector<'a> {
    fn new(keywords: &'a [String], cap: usize) -> Self {
        Self { keywords, cap, snippet: String::new(), matched: false }
    }

    /// Feed one chunk. Returns true once scanning should stop.
    fn feed(&mut self, chunk: &[u8]) -> bool {
        // invalid sequences are dropped, valid text (including a literal U+FFFD) is kept
        let text: String = chunk.utf8_chunks().map(|c| c.valid()).collect();
        self.snippet.push_str(&text);
        let lowered = text.to_lowercase();
        if self.keywords.iter().any(|k| lowered.contains(k.as_str())) {
            self.matched = true;
            return true;
        }
        self.snippet.chars().count() >= self.cap
    }

    fn finish(self) -> ScanResult {
        let score = if self.matched { SCORE_KEYWORD_MATCH } else { SCORE_CLEAN };
        ScanResult { score, snippet: truncate_chars(&self.snippet, self.cap) }
    }
}

fn truncate_chars(text: &str, cap: usize) -> String {
    text.chars().take(cap).collect()
}

/// Resolve a `Location` header value against the URI that produced it.
fn resolve_location(base: &Uri, location: &str) -> Result<Uri> {
    let scheme = base.scheme_str().unwrap_or("http");
    // a scheme is only present before the first '/', '?' or '#'
    let has_scheme = location.split(['/', '?', '#']).next().is_some_and(|head| head.contains(':'));
    let target = if location.starts_with("//") {
        format!("{scheme}:{location}")
    } else if has_scheme {
        location.to_string()
    } else {
        let authority = base.authority().ok_or_else(|| anyhow!("Cannot resolve {location} against {base}"))?;
        if location.starts_with('/') {
            format!("{scheme}://{authority}{location}")
        } else {
            let dir = base.path().rsplit_once('/').map(|(dir, _)| dir).unwrap_or_default();
            format!("{scheme}://{authority}{dir}/{location}")
        }
    };
    target.parse::<Uri>().map_err(|e| anyhow!("Invalid redirect target {target}: {e}"))
}

pub struct HttpScanner {
    client: HttpClient,
    keywords: Vec<String>,
    chunk_size: usize,
    snippet_len: usize,
    timeout: Duration,
}

impl HttpScanner {
    pub fn new(client: HttpClient, keywords: &[String], chunk_size: usize, snippet_len: usize, timeout: Duration) -> Self {
        Self {
            client,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            chunk_size: chunk_size.max(1),
            snippet_len,
            timeout,
        }
    }

    /// GET `url`, following 3xx responses that carry a `Location`.
    async fn fetch(&self, url: &str) -> Result<Response<Body>> {
        let mut uri: Uri = url.parse()?;
        let mut redirects = 0;
        loop {
            let response = self.client.request(Request::get(uri.clone()).body(Body::empty())?).await?;
            debug!("Fetched {} with status {}", uri, response.status());
            let location = match response.headers().get(LOCATION) {
                Some(location) if response.status().is_redirection() => location.to_str()?.to_string(),
                _ => return Ok(response),
            };
            if redirects == MAX_REDIRECTS {
                bail!("More than {MAX_REDIRECTS} redirects starting at {url}");
            }
            redirects += 1;
            uri = resolve_location(&uri, &location)?;
        }
    }

    async fn fetch_and_scan(&self, url: &str) -> Result<ScanResult> {
        let response = self.fetch(url).await?;

        let mut body = response.into_body();
        let mut collector = SnippetCollector::new(&self.keywords, self.snippet_len);
        let mut pending: Vec<u8> = Vec::with_capacity(self.chunk_size);
        while let Some(data) = body.data().await {
            pending.extend_from_slice(&data?);
            while pending.len() >= self.chunk_size {
                let rest = pending.split_off(self.chunk_size);
                let chunk = std::mem::replace(&mut pending, rest);
                if collector.feed(&chunk) {
                    return Ok(collector.finish());
                }
            }
        }
        if !pending.is_empty() {
            collector.feed(&pending);
        }
        Ok(collector.finish())
    }
}

#[async_trait]
impl ContentScanner for HttpScanner {
    async fn scan(&self, url: &str) -> ScanResult {
        let outcome = match tokio::time::timeout(self.timeout, self.fetch_and_scan(url)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!("timed out after {:?}", self.timeout)),
        };
        match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!("Fetch error for {}: {:#}", url, e);
                ScanResult { score: SCORE_FETCH_FAILED, snippet: truncate_chars(FETCH_FAILED, self.snippet_len) }
            }
        }
    }
}
