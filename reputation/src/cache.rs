//! Durable, TTL-checked reputation cache on top of the SQLite `reputation` table.

use crate::models::ReputationRecord;
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, warn};
use sqlx::SqlitePool;
use std::time::Duration;

#[derive(Clone)]
pub struct ReputationCache {
    pool: SqlitePool,
    ttl: TimeDelta,
}

impl ReputationCache {
    pub fn new(pool: SqlitePool, ttl: Duration) -> Self {
        Self { pool, ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX) }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The record for `url` if one exists and is younger than the TTL.
    ///
    /// Expired rows are left in place; the next [`store`](Self::store) overwrites them.
    pub async fn lookup(&self, url: &str) -> Result<Option<ReputationRecord>, sqlx::Error> {
        let row = sqlx::query_as::<_, ReputationRecord>("SELECT url, date_checked, score, snippet FROM reputation WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        let Some(record) = row else {
            debug!("Cache MISS for {}", url);
            return Ok(None);
        };
        let Some(checked_at) = record.checked_at() else {
            warn!("Unreadable date_checked {:?} for {}, treating as absent", record.date_checked, url);
            return Ok(None);
        };
        if Utc::now().signed_duration_since(checked_at) < self.ttl {
            debug!("Cache HIT for {}", url);
            Ok(Some(record))
        } else {
            debug!("Cache EXPIRED for {} (checked at {})", url, record.date_checked);
            Ok(None)
        }
    }

    /// Upsert with `checked_at = now`. Last write wins.
    pub async fn store(&self, url: &str, score: f64, snippet: &str) -> Result<(), sqlx::Error> {
        self.store_checked_at(url, score, snippet, Utc::now()).await
    }

    pub async fn store_checked_at(&self, url: &str, score: f64, snippet: &str, checked_at: DateTime<Utc>) -> Result<(), sqlx::Error> {
        sqlx::query("REPLACE INTO reputation (url, date_checked, score, snippet) VALUES (?, ?, ?, ?)")
            .bind(url)
            .bind(checked_at.to_rfc3339())
            .bind(score)
            .bind(snippet)
            .execute(&self.pool)
            .await?;
        debug!("Stored reputation result for {}", url);
        Ok(())
    }

    /// Number of rows, expired ones included.
    pub async fn len(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reputation").fetch_one(&self.pool).await
    }
}
