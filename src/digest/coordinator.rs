// src/digest/coordinator.rs
//! Orchestrates one digest request: cache lookup, concurrent fetch of every
//! source, decode, selection, cache write-back.

use std::sync::Arc;
use std::time::Instant;

use chrono::{SubsecRound, Utc};
use futures::future::join_all;
use metrics::{counter, gauge, histogram};
use thiserror::Error;

use crate::cache::{digest_key, DigestCache};
use crate::config::DigestSettings;
use crate::digest::{assemble_digest, Digest};
use crate::envelope::{CacheStatus, NewsEnvelope};
use crate::ingest::decode::decode_document;
use crate::ingest::fetch::SourceFetcher;
use crate::ingest::types::{FeedSource, NewsItem};

/// The aggregation task itself died (panic or cancellation).
#[derive(Debug, Error)]
#[error("aggregation task failed: {0}")]
pub struct AggregationFailure(pub String);

pub struct NewsService {
    feeds: Arc<[FeedSource]>,
    fetcher: Arc<dyn SourceFetcher>,
    cache: Arc<dyn DigestCache>,
    settings: DigestSettings,
}

impl NewsService {
    pub fn new(
        feeds: Arc<[FeedSource]>,
        fetcher: Arc<dyn SourceFetcher>,
        cache: Arc<dyn DigestCache>,
        settings: DigestSettings,
    ) -> Self {
        Self {
            feeds,
            fetcher,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> &DigestSettings {
        &self.settings
    }

    pub fn feeds(&self) -> &[FeedSource] {
        &self.feeds
    }

    pub fn cache_key(&self) -> String {
        digest_key(&self.settings.version)
    }

    /// Fetch every source at once and decode the ones that answered.
    /// Output is concatenated in configured source order.
    pub async fn aggregate(&self) -> Vec<NewsItem> {
        let fetches = self.feeds.iter().map(|src| self.fetcher.fetch(src));
        let settled = join_all(fetches).await;

        let mut merged = Vec::new();
        let mut failed = 0usize;
        for res in settled {
            match res {
                Ok(doc) => merged.extend(decode_document(doc)),
                // HttpFetcher already logs and counts; this is the tally.
                Err(_) => failed += 1,
            }
        }

        tracing::info!(
            target: "news",
            sources = self.feeds.len(),
            failed,
            items = merged.len(),
            "sources settled"
        );
        merged
    }

    async fn cached_digest(&self, key: &str) -> Option<Digest> {
        let raw = match self.cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                counter!("news_cache_errors_total").increment(1);
                tracing::warn!(target: "news", key, error = %e, "cache read failed; recomputing");
                return None;
            }
        };
        match serde_json::from_str::<Digest>(&raw) {
            Ok(d) => Some(d),
            Err(e) => {
                counter!("news_cache_errors_total").increment(1);
                tracing::warn!(target: "news", key, error = %e, "cached digest unreadable; recomputing");
                None
            }
        }
    }

    async fn store(&self, key: &str, digest: &Digest) {
        let payload = match serde_json::to_string(digest) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(target: "news", error = %e, "digest serialization failed; not cached");
                return;
            }
        };
        if let Err(e) = self.cache.put(key, payload, self.settings.cache_ttl).await {
            counter!("news_cache_errors_total").increment(1);
            tracing::warn!(target: "news", key, error = %e, "cache write failed");
        }
    }

    /// Cached digest when fresh, otherwise a full recomputation.
    pub async fn current_digest(&self) -> (Digest, CacheStatus) {
        let key = self.cache_key();
        if let Some(d) = self.cached_digest(&key).await {
            counter!("news_cache_hits_total").increment(1);
            return (d, CacheStatus::Hit);
        }
        counter!("news_cache_misses_total").increment(1);

        let t0 = Instant::now();
        let items = self.aggregate().await;
        let digest = assemble_digest(
            items,
            &self.settings.version,
            self.settings.max_items,
            Utc::now().trunc_subsecs(3),
        );
        histogram!("news_aggregate_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        gauge!("news_digest_items").set(digest.count as f64);

        self.store(&key, &digest).await;
        tracing::info!(
            target: "news",
            version = %digest.version,
            count = digest.count,
            rail = digest.rail.len(),
            hero = digest.hero.is_some(),
            "digest rebuilt"
        );
        (digest, CacheStatus::Miss)
    }

    /// Run [`Self::current_digest`] on its own task so a fault anywhere in the
    /// pipeline becomes the failure envelope instead of a dropped connection.
    pub async fn guarded_digest(self: Arc<Self>) -> (NewsEnvelope, CacheStatus) {
        let svc = Arc::clone(&self);
        let joined = tokio::spawn(async move { svc.current_digest().await })
            .await
            .map_err(|e| AggregationFailure(e.to_string()));

        match joined {
            Ok((digest, status)) => (NewsEnvelope::from(digest), status),
            Err(e) => {
                counter!("news_aggregation_failures_total").increment(1);
                tracing::error!(target: "news", error = %e, "news aggregation failed");
                (NewsEnvelope::failure(&self.settings.version), CacheStatus::Bypass)
            }
        }
    }
}
