// src/config/settings.rs
use std::time::Duration;

use crate::cache::MAX_TTL;
use crate::digest::DEFAULT_MAX_ITEMS;
use crate::ingest::fetch::{DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};

pub const DEFAULT_VERSION: &str = "2025-08-26-a";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Off,
}

impl CacheBackend {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "0" | "false" => CacheBackend::Off,
            _ => CacheBackend::Memory,
        }
    }
}

/// Runtime knobs for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestSettings {
    /// Bump to invalidate every cached digest at once.
    pub version: String,
    pub cache_ttl: Duration,
    pub max_items: usize,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    pub cache: CacheBackend,
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_items: DEFAULT_MAX_ITEMS,
            fetch_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache: CacheBackend::Memory,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    let raw = env_string(key)?;
    match raw.parse::<u64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(target: "news", key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}

impl DigestSettings {
    /// Read `NEWS_*` variables; anything missing or unparseable keeps its default.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            version: env_string("NEWS_VERSION").unwrap_or(d.version),
            cache_ttl: env_u64("NEWS_CACHE_TTL_SECS")
                .map(|secs| Duration::from_secs(secs).min(MAX_TTL))
                .unwrap_or(d.cache_ttl),
            max_items: env_u64("NEWS_MAX_ITEMS")
                .map(|n| n as usize)
                .unwrap_or(d.max_items),
            fetch_timeout: env_u64("NEWS_FETCH_TIMEOUT_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(d.fetch_timeout),
            user_agent: env_string("NEWS_USER_AGENT").unwrap_or(d.user_agent),
            cache: env_string("NEWS_CACHE")
                .map(|v| CacheBackend::parse(&v))
                .unwrap_or(d.cache),
        }
    }
}
