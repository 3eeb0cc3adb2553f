// src/envelope.rs
use serde::Serialize;

use crate::digest::{Digest, RailItem};
use crate::ingest::types::NewsItem;

pub const TEMPORARY_ERROR: &str = "temporary_error";

/// Where a response body came from; sent as `x-cache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Bypass,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Bypass => "bypass",
        }
    }
}

/// Body of `/api/news`. Always valid JSON, even when aggregation faulted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum NewsEnvelope {
    Digest(Digest),
    Failure {
        hero: Option<NewsItem>,
        rail: Vec<RailItem>,
        error: &'static str,
        version: String,
    },
}

impl NewsEnvelope {
    pub fn failure(version: impl Into<String>) -> Self {
        NewsEnvelope::Failure {
            hero: None,
            rail: Vec::new(),
            error: TEMPORARY_ERROR,
            version: version.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, NewsEnvelope::Failure { .. })
    }
}

impl From<Digest> for NewsEnvelope {
    fn from(d: Digest) -> Self {
        NewsEnvelope::Digest(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn failure_shape() {
        let v = serde_json::to_value(NewsEnvelope::failure("2025-08-26-a")).unwrap();
        assert_eq!(
            v,
            json!({ "hero": null, "rail": [], "error": "temporary_error", "version": "2025-08-26-a" })
        );
    }

    #[test]
    fn digest_is_serialized_flat() {
        let now = Utc.timestamp_opt(0, 0).unwrap();
        let v = serde_json::to_value(NewsEnvelope::from(Digest::empty("v", now))).unwrap();
        assert_eq!(v["version"], "v");
        assert_eq!(v["count"], 0);
        assert!(v.get("error").is_none());
    }

    #[test]
    fn header_values() {
        assert_eq!(CacheStatus::Hit.as_str(), "hit");
        assert_eq!(CacheStatus::Miss.as_str(), "miss");
        assert_eq!(CacheStatus::Bypass.as_str(), "bypass");
    }
}
