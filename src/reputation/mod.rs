//! Reputation results as exchanged between the proxy and the reputation service.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::HttpReputationClient;

/// Snippet reported when the reputation service cannot be reached or answers nonsense.
pub const CHECK_FAILED: &str = "Check failed";

/// Score of a URL (0 = safe, 1 = worst), the captured body snippet and whether it came from cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationResult {
    pub score: f64,
    pub snippet: String,
    #[serde(default)]
    pub cached: bool,
}

impl ReputationResult {
    /// The maximally suspicious result used whenever scoring is impossible.
    pub fn check_failed() -> Self {
        Self { score: 1.0, snippet: CHECK_FAILED.to_string(), cached: false }
    }
}

/// Something that can score a URL. Implementations never fail: errors map to [`ReputationResult::check_failed`].
#[async_trait]
pub trait ReputationLookup: Send + Sync {
    async fn score(&self, url: &str) -> ReputationResult;
}
