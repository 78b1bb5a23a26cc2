use crate::cache::ReputationCache;
use crate::scanner::ContentScanner;
use log::info;
use repgate::reputation::ReputationResult;
use std::sync::Arc;

/// Cache first, scan on miss. Concurrent misses for the same URL are not coalesced and may scan twice.
#[derive(Clone)]
pub struct ReputationEngine {
    cache: ReputationCache,
    scanner: Arc<dyn ContentScanner>,
}

impl ReputationEngine {
    pub fn new(cache: ReputationCache, scanner: Arc<dyn ContentScanner>) -> Self {
        Self { cache, scanner }
    }

    /// Score `url`, serving an unexpired cached record when there is one.
    ///
    /// Scan failures are scored and cached like any other result; only storage errors are returned.
    pub async fn score(&self, url: &str) -> Result<ReputationResult, sqlx::Error> {
        if let Some(record) = self.cache.lookup(url).await? {
            return Ok(ReputationResult { score: record.score, snippet: record.snippet, cached: true });
        }

        let scan = self.scanner.scan(url).await;
        self.cache.store(url, scan.score, &scan.snippet).await?;
        info!("Scanned url={} score={} snippet_chars={}", url, scan.score, scan.snippet.chars().count());
        Ok(ReputationResult { score: scan.score, snippet: scan.snippet, cached: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::scanner::{FETCH_FAILED, SCORE_FETCH_FAILED, ScanResult};
    use async_trait::async_trait;
    use chrono::{TimeDelta, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingScanner {
        result: ScanResult,
        scans: AtomicUsize,
    }

    #[async_trait]
    impl ContentScanner for CountingScanner {
        async fn scan(&self, _url: &str) -> ScanResult {
            self.scans.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    async fn engine(dir: &tempfile::TempDir, result: ScanResult) -> (ReputationEngine, ReputationCache, Arc<CountingScanner>) {
        let pool = init_database(dir.path().join("reputation.db")).await.unwrap();
        let cache = ReputationCache::new(pool, Duration::from_secs(7 * 24 * 3600));
        let scanner = Arc::new(CountingScanner { result, scans: AtomicUsize::new(0) });
        (ReputationEngine::new(cache.clone(), scanner.clone()), cache, scanner)
    }

    #[tokio::test]
    async fn test_miss_scans_and_stores_then_hit_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, cache, scanner) = engine(&dir, ScanResult { score: 0.1, snippet: "<html>".to_string() }).await;

        let first = engine.score("http://example.com/").await.unwrap();
        assert_eq!(first, ReputationResult { score: 0.1, snippet: "<html>".to_string(), cached: false });
        assert_eq!(cache.len().await.unwrap(), 1);

        let second = engine.score("http://example.com/").await.unwrap();
        assert_eq!(second, ReputationResult { score: 0.1, snippet: "<html>".to_string(), cached: true });
        assert_eq!(scanner.scans.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_record_forces_rescan() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, cache, scanner) = engine(&dir, ScanResult { score: 0.9, snippet: "hack".to_string() }).await;
        cache.store_checked_at("http://example.com/", 0.1, "stale", Utc::now() - TimeDelta::days(30)).await.unwrap();

        let result = engine.score("http://example.com/").await.unwrap();

        assert_eq!(result, ReputationResult { score: 0.9, snippet: "hack".to_string(), cached: false });
        assert_eq!(scanner.scans.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_scan_is_cached_as_sticky_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let failed = ScanResult { score: SCORE_FETCH_FAILED, snippet: FETCH_FAILED.to_string() };
        let (engine, _cache, scanner) = engine(&dir, failed).await;

        engine.score("http://down.example/").await.unwrap();
        let again = engine.score("http://down.example/").await.unwrap();

        assert!(again.cached);
        assert_eq!(again.score, 1.0);
        assert_eq!(again.snippet, FETCH_FAILED);
        assert_eq!(scanner.scans.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, cache, _scanner) = engine(&dir, ScanResult { score: 0.1, snippet: String::new() }).await;
        cache.pool().close().await;

        assert!(engine.score("http://example.com/").await.is_err());
    }
}
