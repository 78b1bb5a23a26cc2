use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "./repgate.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub(crate) path: PathBuf,
    // Address the proxy listens on
    #[serde(default = "default_host")]
    pub(crate) host: String,
    #[serde(default = "default_port")]
    pub(crate) port: u16,
    #[serde(default)]
    pub(crate) tls: TlsConfig,
    // Full URL of the reputation endpoint, queried as <url>?url=<target>
    #[serde(default = "default_reputation_service")]
    pub(crate) reputation_service: String,
    // Requests scoring strictly above this are blocked
    #[serde(default = "default_block_threshold")]
    pub(crate) block_threshold: f64,
    #[serde(default = "default_realm")]
    pub(crate) realm: String,
    // Allow-list of "username:secret" pairs
    #[serde(default = "default_users")]
    pub(crate) users: Vec<String>,
    #[serde(deserialize_with = "bool_or_default", default)]
    pub(crate) print_reputation: bool,
    #[serde(default = "default_reputation_timeout")]
    pub(crate) reputation_timeout_secs: u64,
    #[serde(default = "default_upstream_timeout")]
    pub(crate) upstream_timeout_secs: u64,
    #[serde(default = "default_max_header_bytes")]
    pub(crate) max_header_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(deserialize_with = "bool_or_default", default)]
    pub(crate) enabled: bool,
    #[serde(default = "default_cert_path")]
    pub(crate) cert_path: String,
    #[serde(default = "default_key_path")]
    pub(crate) key_path: String,
}

/// Partial update applied on top of a loaded config. Only provided fields are applied.
#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls_enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
    pub reputation_service: Option<String>,
    pub print_reputation: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self { enabled: false, cert_path: default_cert_path(), key_path: default_key_path() }
    }
}

impl Config {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
            host: default_host(),
            port: default_port(),
            tls: TlsConfig::default(),
            reputation_service: default_reputation_service(),
            block_threshold: default_block_threshold(),
            realm: default_realm(),
            users: default_users(),
            print_reputation: false,
            reputation_timeout_secs: default_reputation_timeout(),
            upstream_timeout_secs: default_upstream_timeout(),
            max_header_bytes: default_max_header_bytes(),
        }
    }

    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(host) = patch.host {
            self.host = host;
        }
        if let Some(port) = patch.port {
            self.port = port;
        }
        if let Some(enabled) = patch.tls_enabled {
            self.tls.enabled = enabled;
        }
        if let Some(cert_path) = patch.cert_path {
            self.tls.cert_path = cert_path;
        }
        if let Some(key_path) = patch.key_path {
            self.tls.key_path = key_path;
        }
        if let Some(url) = patch.reputation_service {
            self.reputation_service = url;
        }
        if let Some(print) = patch.print_reputation {
            self.print_reputation = print;
        }
    }

    pub fn get_host(&self) -> &str {
        &self.host
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_tls(&self) -> &TlsConfig {
        &self.tls
    }

    pub fn get_reputation_service(&self) -> &str {
        &self.reputation_service
    }

    pub fn get_block_threshold(&self) -> f64 {
        self.block_threshold
    }

    pub fn get_realm(&self) -> &str {
        &self.realm
    }

    pub fn get_users(&self) -> &[String] {
        &self.users
    }

    pub fn should_print_reputation(&self) -> bool {
        self.print_reputation
    }

    pub fn get_reputation_timeout(&self) -> Duration {
        Duration::from_secs(self.reputation_timeout_secs)
    }

    pub fn get_upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn get_max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }
}

impl TlsConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get_cert_path(&self) -> &str {
        &self.cert_path
    }

    pub fn get_key_path(&self) -> &str {
        &self.key_path
    }
}

// Forgiving bool: non-bool types fall back to false.
fn bool_or_default<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match bool::deserialize(deserializer) {
        Ok(b) => Ok(b),
        Err(e) => {
            warn!("Failed to deserialize bool value: {}, using false", e);
            Ok(false)
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8443
}

fn default_cert_path() -> String {
    "cert.pem".to_string()
}

fn default_key_path() -> String {
    "key.pem".to_string()
}

fn default_reputation_service() -> String {
    "http://127.0.0.1:8081/reputation".to_string()
}

fn default_block_threshold() -> f64 {
    0.3
}

fn default_realm() -> String {
    "repgate".to_string()
}

fn default_users() -> Vec<String> {
    vec!["alice:secret".to_string(), "bob:hunter2".to_string()]
}

fn default_reputation_timeout() -> u64 {
    10
}

fn default_upstream_timeout() -> u64 {
    30
}

fn default_max_header_bytes() -> usize {
    64 * 1024
}
