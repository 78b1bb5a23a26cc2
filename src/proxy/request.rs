use crate::proxy::error::ProxyError;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Method};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Headers that only describe the client-to-proxy leg and are never forwarded.
pub const HOP_BY_HOP_HEADERS: [&str; 7] =
    ["proxy-authorization", "proxy-connection", "connection", "keep-alive", "upgrade", "te", "trailers"];

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// One request read off a client connection. The body, if any, is never read.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub target_url: String,
    pub headers: HeaderMap,
}

/// Read bytes until the end of the request head, returning the head including its terminator.
pub async fn read_head<S>(stream: &mut S, limit: usize) -> Result<Vec<u8>, ProxyError>
where
    S: AsyncRead + Unpin,
{
    let mut head = Vec::with_capacity(1024);
    let mut buf = [0u8; 1024];
    loop {
        let read = stream.read(&mut buf).await?;
        if read == 0 {
            return Err(ProxyError::IncompleteHead);
        }
        // the terminator may straddle two reads
        let search_from = head.len().saturating_sub(HEAD_TERMINATOR.len() - 1);
        head.extend_from_slice(&buf[..read]);
        if let Some(pos) = head[search_from..].windows(HEAD_TERMINATOR.len()).position(|w| w == HEAD_TERMINATOR) {
            let end = search_from + pos + HEAD_TERMINATOR.len();
            if end > limit {
                return Err(ProxyError::HeadTooLarge(limit));
            }
            head.truncate(end);
            return Ok(head);
        }
        if head.len() > limit {
            return Err(ProxyError::HeadTooLarge(limit));
        }
    }
}

impl ProxyRequest {
    /// Parse a raw request head: `METHOD target protocol` followed by `name: value` lines.
    pub fn parse(head: &[u8]) -> Result<Self, ProxyError> {
        let text = String::from_utf8_lossy(head);
        let mut lines = text.split("\r\n");
        let request_line = lines.next().unwrap_or_default();

        let mut parts = request_line.splitn(3, ' ');
        let (Some(method), Some(target), Some(_protocol)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ProxyError::MalformedRequestLine(request_line.to_string()));
        };
        let method = Method::from_bytes(method.as_bytes()).map_err(|_| ProxyError::MalformedRequestLine(request_line.to_string()))?;

        let mut headers = HeaderMap::new();
        for line in lines.filter(|l| !l.is_empty()) {
            let (name, value) = line.split_once(':').ok_or_else(|| ProxyError::MalformedHeader(line.to_string()))?;
            let name = HeaderName::from_bytes(name.trim().to_ascii_lowercase().as_bytes())
                .map_err(|_| ProxyError::MalformedHeader(line.to_string()))?;
            let value = HeaderValue::from_str(value.trim()).map_err(|_| ProxyError::MalformedHeader(line.to_string()))?;
            // last value wins
            headers.insert(name, value);
        }

        Ok(Self { method, target_url: target.to_string(), headers })
    }

    pub fn is_connect(&self) -> bool {
        self.method.as_str().eq_ignore_ascii_case(Method::CONNECT.as_str())
    }

    /// The credentials of a `Proxy-Authorization: Basic <token>` header, if present.
    pub fn basic_token(&self) -> Option<&str> {
        let value = self.headers.get(hyper::header::PROXY_AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.split_once(' ')?;
        scheme.eq_ignore_ascii_case("basic").then_some(token)
    }

    pub fn strip_hop_by_hop(&mut self) {
        for name in HOP_BY_HOP_HEADERS {
            self.headers.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_form_request() {
        let head = b"GET http://example.com/index.html HTTP/1.1\r\nHost: example.com\r\nUser-Agent: curl/8.0\r\n\r\n";
        let request = ProxyRequest::parse(head).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.target_url, "http://example.com/index.html");
        assert_eq!(request.headers.get("host").unwrap(), "example.com");
        assert_eq!(request.headers.get("user-agent").unwrap(), "curl/8.0");
    }

    #[test]
    fn test_header_names_are_case_folded_and_last_wins() {
        let head = b"GET http://example.com/ HTTP/1.1\r\nX-Trace: one\r\nx-trace: two\r\n\r\n";
        let request = ProxyRequest::parse(head).unwrap();
        let values: Vec<_> = request.headers.get_all("X-TRACE").iter().collect();
        assert_eq!(values, ["two"]);
    }

    #[test]
    fn test_header_values_may_contain_colons() {
        let head = b"GET http://example.com/ HTTP/1.1\r\nReferer: http://other.example/\r\n\r\n";
        let request = ProxyRequest::parse(head).unwrap();
        assert_eq!(request.headers.get("referer").unwrap(), "http://other.example/");
    }

    #[test]
    fn test_request_line_needs_three_parts() {
        let err = ProxyRequest::parse(b"GET http://example.com/\r\n\r\n").unwrap_err();
        assert!(matches!(err, ProxyError::MalformedRequestLine(_)));
    }

    #[test]
    fn test_header_without_colon_is_malformed() {
        let err = ProxyRequest::parse(b"GET http://example.com/ HTTP/1.1\r\nbroken header\r\n\r\n").unwrap_err();
        assert!(matches!(err, ProxyError::MalformedHeader(_)));
    }

    #[test]
    fn test_connect_is_detected() {
        let request = ProxyRequest::parse(b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\n\r\n").unwrap();
        assert!(request.is_connect());

        let lower = ProxyRequest::parse(b"connect example.com:443 HTTP/1.1\r\n\r\n").unwrap();
        assert!(lower.is_connect());
    }

    #[test]
    fn test_basic_token_scheme_is_case_insensitive() {
        let request = ProxyRequest::parse(b"GET http://a/ HTTP/1.1\r\nProxy-Authorization: bAsIc YWxpY2U6c2VjcmV0\r\n\r\n").unwrap();
        assert_eq!(request.basic_token(), Some("YWxpY2U6c2VjcmV0"));

        let bearer = ProxyRequest::parse(b"GET http://a/ HTTP/1.1\r\nProxy-Authorization: Bearer abc\r\n\r\n").unwrap();
        assert_eq!(bearer.basic_token(), None);

        let missing = ProxyRequest::parse(b"GET http://a/ HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(missing.basic_token(), None);
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let head = b"GET http://a/ HTTP/1.1\r\nProxy-Authorization: Basic x\r\nProxy-Connection: keep-alive\r\n\
Connection: keep-alive\r\nKeep-Alive: 5\r\nUpgrade: h2c\r\nTE: trailers\r\nTrailers: x\r\nAccept: */*\r\n\r\n";
        let mut request = ProxyRequest::parse(head).unwrap();
        request.strip_hop_by_hop();
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.headers.get("accept").unwrap(), "*/*");
    }

    #[tokio::test]
    async fn test_read_head_stops_at_terminator() {
        let (mut client, mut server) = tokio::io::duplex(64);
        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            client.write_all(b"GET http://a/ HTTP/1.1\r\nHost: a\r").await.unwrap();
            client.write_all(b"\n\r\nbody-bytes").await.unwrap();
        });
        let head = read_head(&mut server, 4096).await.unwrap();
        assert_eq!(head, b"GET http://a/ HTTP/1.1\r\nHost: a\r\n\r\n");
    }

    #[tokio::test]
    async fn test_read_head_eof_is_incomplete() {
        let mut input: &[u8] = b"GET http://a/ HTTP/1.1\r\nHost: a\r\n";
        let err = read_head(&mut input, 4096).await.unwrap_err();
        assert!(matches!(err, ProxyError::IncompleteHead));
    }

    #[tokio::test]
    async fn test_read_head_enforces_limit() {
        let big = format!("GET http://a/ HTTP/1.1\r\nX-Pad: {}\r\n\r\n", "a".repeat(5000));
        let mut input = big.as_bytes();
        let err = read_head(&mut input, 1024).await.unwrap_err();
        assert!(matches!(err, ProxyError::HeadTooLarge(1024)));
    }
}
