use anyhow::{Result, anyhow};
use repgate::config::loader::load_or_init;
use repgate::utils::validation::{is_empty_or_whitespace, validate_port_range};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "./reputation.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    // SQLite file holding the reputation table, created if absent
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_cache_ttl_days")]
    pub cache_ttl_days: u64,
    // Maximum characters of body text kept per URL
    #[serde(default = "default_snippet_len")]
    pub snippet_len: usize,
    // Bytes per scanned chunk; keywords are matched within a single chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_secs: u64,
}

/// Command line overrides. Only provided fields are applied.
#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<String>,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_PATH),
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            cache_ttl_days: default_cache_ttl_days(),
            snippet_len: default_snippet_len(),
            chunk_size: default_chunk_size(),
            keywords: default_keywords(),
            scan_timeout_secs: default_scan_timeout(),
        }
    }
}

impl ReputationConfig {
    pub async fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = load_or_init(path, Self::default).await?;
        config.path = path.to_owned();
        Ok(config)
    }

    pub fn apply(&mut self, patch: ServicePatch) {
        if let Some(host) = patch.host {
            self.host = host;
        }
        if let Some(port) = patch.port {
            self.port = port;
        }
        if let Some(database_path) = patch.database_path {
            self.database_path = database_path;
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_days.saturating_mul(24 * 60 * 60))
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if let Err(e) = validate_port_range(self.port) {
            problems.push(e);
        }
        if is_empty_or_whitespace(&self.host) {
            problems.push("Listen host must not be empty".to_string());
        }
        if is_empty_or_whitespace(&self.database_path) {
            problems.push("database_path must not be empty".to_string());
        }
        if self.cache_ttl_days == 0 {
            problems.push("cache_ttl_days must be greater than 0".to_string());
        }
        if self.snippet_len == 0 {
            problems.push("snippet_len must be greater than 0".to_string());
        }
        if self.chunk_size == 0 {
            problems.push("chunk_size must be greater than 0".to_string());
        }
        if self.scan_timeout_secs == 0 {
            problems.push("scan_timeout_secs must be greater than 0".to_string());
        }
        if self.keywords.is_empty() {
            problems.push("At least one keyword is required".to_string());
        }
        if self.keywords.iter().any(|k| is_empty_or_whitespace(k)) {
            problems.push("Keywords must not be blank".to_string());
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

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_database_path() -> String {
    "reputation.db".to_string()
}

fn default_cache_ttl_days() -> u64 {
    7
}

fn default_snippet_len() -> usize {
    500
}

fn default_chunk_size() -> usize {
    512
}

fn default_keywords() -> Vec<String> {
    ["sex", "roblox", "hack", "phish"].into_iter().map(String::from).collect()
}

fn default_scan_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReputationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl(), Duration::from_secs(7 * 24 * 3600));
        assert_eq!(config.keywords, ["sex", "roblox", "hack", "phish"]);
    }

    #[test]
    fn test_blank_keyword_and_zero_chunk_rejected() {
        let config = ReputationConfig { keywords: vec!["hack".to_string(), " ".to_string()], chunk_size: 0, ..Default::default() };
        assert_eq!(config.problems().len(), 2);
    }

    #[tokio::test]
    async fn test_load_creates_file_and_patch_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reputation.json");

        let mut config = ReputationConfig::try_load(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(config.port, 8081);

        config.apply(ServicePatch { port: Some(9091), ..Default::default() });
        assert_eq!(config.port, 9091);
        assert_eq!(config.host, "0.0.0.0");
    }
}
