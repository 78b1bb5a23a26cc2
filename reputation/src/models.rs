use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `reputation` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReputationRecord {
    pub url: String,
    pub date_checked: String,
    pub score: f64,
    pub snippet: String,
}

impl ReputationRecord {
    /// When the record was written. RFC 3339 rows and naive ISO-8601 rows (taken as UTC) are both accepted.
    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.date_checked) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.date_checked, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|naive| naive.and_utc())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReputationQuery {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationResponse {
    pub url: String,
    pub score: f64,
    pub snippet: String,
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date_checked: &str) -> ReputationRecord {
        ReputationRecord { url: "http://a/".to_string(), date_checked: date_checked.to_string(), score: 0.1, snippet: String::new() }
    }

    #[test]
    fn test_parses_rfc3339() {
        let at = record("2025-03-01T10:00:00+02:00").checked_at().unwrap();
        assert_eq!(at.to_rfc3339(), "2025-03-01T08:00:00+00:00");
    }

    #[test]
    fn test_parses_naive_iso_as_utc() {
        let at = record("2025-03-01T10:00:00.123456").checked_at().unwrap();
        assert_eq!(at.timestamp(), 1_740_823_200);
        assert!(record("2025-03-01T10:00:00").checked_at().is_some());
    }

    #[test]
    fn test_garbage_date_is_none() {
        assert!(record("yesterday").checked_at().is_none());
    }
}
