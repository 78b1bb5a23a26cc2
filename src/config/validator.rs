use crate::config::types::Config;
use crate::utils::validation::{is_empty_or_whitespace, validate_http_url, validate_port_range, validate_unit_interval};
use anyhow::{Result, anyhow};

const MIN_HEADER_BYTES: usize = 1024;

impl Config {
    /// Collect every problem with this config. An empty list means the config is usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if let Err(e) = validate_port_range(self.port) {
            problems.push(e);
        }
        if is_empty_or_whitespace(&self.host) {
            problems.push("Listen host must not be empty".to_string());
        }
        if let Err(e) = validate_unit_interval("block_threshold", self.block_threshold) {
            problems.push(e);
        }
        if let Err(e) = validate_http_url(&self.reputation_service) {
            problems.push(format!("reputation_service: {e}"));
        }
        for user in &self.users {
            if !user.contains(':') {
                problems.push(format!("Credential entry '{user}' must have the form username:secret"));
            }
        }
        if self.tls.enabled {
            if is_empty_or_whitespace(&self.tls.cert_path) {
                problems.push("TLS is enabled but cert_path is empty".to_string());
            }
            if is_empty_or_whitespace(&self.tls.key_path) {
                problems.push("TLS is enabled but key_path is empty".to_string());
            }
        }
        if self.reputation_timeout_secs == 0 {
            problems.push("reputation_timeout_secs must be greater than 0".to_string());
        }
        if self.upstream_timeout_secs == 0 {
            problems.push("upstream_timeout_secs must be greater than 0".to_string());
        }
        if self.max_header_bytes < MIN_HEADER_BYTES {
            problems.push(format!("max_header_bytes must be at least {MIN_HEADER_BYTES}"));
        }
        problems
    }

    pub fn validate(&self) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Invalid configuration in {}: {}", self.path.display(), problems.join("; ")))
        }
    }
}
