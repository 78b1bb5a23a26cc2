//! Common validation utilities shared across modules

use hyper::Uri;

/// Validate that a port number is in valid range (1-65535)
pub fn validate_port_range(port: u16) -> Result<(), String> {
    if port == 0 {
        return Err("Port must be between 1 and 65535".to_string());
    }
    Ok(())
}

/// Check if a string is empty or only whitespace
pub fn is_empty_or_whitespace(s: &str) -> bool {
    s.trim().is_empty()
}

/// Validate that a score or threshold lies within [0, 1]
pub fn validate_unit_interval(name: &str, value: f64) -> Result<(), String> {
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{name} must be between 0 and 1, got {value}"));
    }
    Ok(())
}

/// Validate that a string is an absolute http:// or https:// URL with a host
pub fn validate_http_url(url: &str) -> Result<(), String> {
    let uri: Uri = url.parse().map_err(|e| format!("Invalid URL '{url}': {e}"))?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        _ => return Err(format!("URL '{url}' must use http or https")),
    }
    if uri.host().is_none_or(is_empty_or_whitespace) {
        return Err(format!("URL '{url}' has no host"));
    }
    Ok(())
}
