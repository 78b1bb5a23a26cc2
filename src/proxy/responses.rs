use hyper::body::Bytes;
use hyper::header::{CONNECTION, CONTENT_LENGTH, HeaderValue, TRANSFER_ENCODING};
use hyper::{HeaderMap, StatusCode};

pub const METHOD_NOT_ALLOWED: &[u8] =
    b"HTTP/1.1 405 Method Not Allowed\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\nCONNECT not supported.\r\n";

pub const BLOCK_PAGE: &[u8] = b"HTTP/1.1 403 Forbidden\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
<h1>BLOCKED</h1><p>This URL is blocked by policy.</p>";

/// Challenge for proxy credentials. Sent as 401, not 407.
pub fn unauthorized(realm: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 401 Unauthorized\r\nProxy-Authenticate: Basic realm=\"{}\"\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        realm.replace('"', "")
    )
    .into_bytes()
}

/// A fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Serialize for the client: chunked framing removed, Content-Length recomputed, connection closed.
    pub fn render(&self) -> Vec<u8> {
        let mut headers = self.headers.clone();
        headers.remove(TRANSFER_ENCODING);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(self.body.len()));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        let reason = self.status.canonical_reason().unwrap_or_default();
        let mut out = format!("HTTP/1.1 {} {}\r\n", self.status.as_u16(), reason).into_bytes();
        for (name, value) in &headers {
            out.extend_from_slice(name.as_str().as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_text(response: &UpstreamResponse) -> String {
        String::from_utf8(response.render()).unwrap()
    }

    #[test]
    fn test_render_recomputes_length_and_drops_chunking() {
        let mut headers = HeaderMap::new();
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("999"));
        headers.insert("content-type", HeaderValue::from_static("text/plain"));
        let response = UpstreamResponse { status: StatusCode::OK, headers, body: Bytes::from_static(b"hello") };

        let text = rendered_text(&response);
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("content-length: 5\r\n"));
        assert!(text.contains("content-type: text/plain\r\n"));
        assert!(text.contains("connection: close\r\n"));
        assert!(!text.contains("transfer-encoding"));
        assert!(!text.contains("999"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_render_uses_real_reason_phrase() {
        let response = UpstreamResponse { status: StatusCode::NOT_FOUND, headers: HeaderMap::new(), body: Bytes::new() };
        assert!(rendered_text(&response).starts_with("HTTP/1.1 404 Not Found\r\n"));

        let unknown = UpstreamResponse { status: StatusCode::from_u16(599).unwrap(), headers: HeaderMap::new(), body: Bytes::new() };
        assert!(rendered_text(&unknown).starts_with("HTTP/1.1 599 \r\n"));
    }

    #[test]
    fn test_render_keeps_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        let response = UpstreamResponse { status: StatusCode::OK, headers, body: Bytes::new() };

        let text = rendered_text(&response);
        assert!(text.contains("set-cookie: a=1\r\n"));
        assert!(text.contains("set-cookie: b=2\r\n"));
        assert!(text.contains("content-length: 0\r\n"));
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let text = String::from_utf8(unauthorized("repgate")).unwrap();
        assert!(text.starts_with("HTTP/1.1 401 Unauthorized\r\n"));
        assert!(text.contains("Proxy-Authenticate: Basic realm=\"repgate\"\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }
}
