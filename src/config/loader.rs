use crate::config::types::Config;
use crate::utils::validation::is_empty_or_whitespace;
use anyhow::{Context, Result};
use log::{debug, trace, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::path::Path;

/// Load a JSON config file, writing `fallback` to `path` and returning it when the file does not exist.
///
/// A file that exists but fails to parse is an error: the caller is expected to abort startup.
pub async fn load_or_init<T>(path: impl AsRef<Path>, fallback: impl FnOnce() -> T) -> Result<T>
where
    T: Serialize + DeserializeOwned + Debug,
{
    let path = path.as_ref();
    debug!("Loading config from: {}", path.display());
    let config = if path.exists() {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str::<T>(&content).with_context(|| format!("Failed to parse config file {}", path.display()))?
    } else {
        warn!("Config file not found, writing defaults to {}", path.display());
        let config = fallback();
        save_json(path, &config).await?;
        config
    };
    trace!("Loaded config: {:#?}", config);
    Ok(config)
}

/// Serialize `value` as pretty JSON into `path`, creating parent directories as needed.
pub async fn save_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    debug!("Saving config to: {}", path.display());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, content).await?;
    Ok(())
}

impl Config {
    /// Resolve the config path from a command line argument
    pub fn resolve_config_path(arg: Option<String>) -> String {
        match arg {
            Some(s) if !is_empty_or_whitespace(&s) => s,
            _ => super::types::DEFAULT_CONFIG_PATH.to_string(),
        }
    }

    /// Load configuration from a file, creating it with defaults when missing
    pub async fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = load_or_init(path, || Self::new(path)).await?;
        config.path = path.to_owned();
        Ok(config)
    }
}
