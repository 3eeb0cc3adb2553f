// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod digest;
pub mod envelope;
pub mod ingest;
pub mod metrics;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;

use crate::api::{create_router, AppState};
use crate::cache::{DigestCache, MemoryCache, NoopCache};
use crate::config::{load_feeds_default, CacheBackend, DigestSettings};
use crate::digest::coordinator::NewsService;
use crate::ingest::fetch::{HttpFetcher, SourceFetcher};
use crate::ingest::types::FeedSource;

pub use crate::digest::{Digest, RailItem};
pub use crate::envelope::{CacheStatus, NewsEnvelope};
pub use crate::ingest::types::NewsItem;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "news=info,ingest=info,warn";

/// Install a compact fmt subscriber. A no-op when one is already set (Shuttle, tests).
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

pub fn cache_for(backend: CacheBackend) -> Arc<dyn DigestCache> {
    match backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::Off => Arc::new(NoopCache),
    }
}

/// Router over explicit collaborators. `/metrics` is mounted when `DEBUG_ROUTES=1`.
pub fn build_app(
    feeds: Vec<FeedSource>,
    fetcher: Arc<dyn SourceFetcher>,
    cache: Arc<dyn DigestCache>,
    settings: DigestSettings,
) -> anyhow::Result<Router> {
    let service = NewsService::new(feeds.into(), fetcher, cache, settings);
    let state = AppState {
        service: Arc::new(service),
    };
    let mut router = create_router(state);

    let debug_routes = std::env::var("DEBUG_ROUTES").ok().is_some_and(|v| v == "1");
    if debug_routes {
        let m = crate::metrics::Metrics::init().context("installing prometheus recorder")?;
        router = router.merge(m.router());
    }
    Ok(router)
}

/// Router wired from the environment: feed list, `NEWS_*` settings, HTTP fetcher.
pub async fn app() -> anyhow::Result<Router> {
    let feeds = load_feeds_default().context("loading feed list")?;
    let settings = DigestSettings::from_env();
    let fetcher = Arc::new(HttpFetcher::new(settings.fetch_timeout, settings.user_agent.clone()));
    let cache = cache_for(settings.cache);

    tracing::info!(
        target: "news",
        feeds = feeds.len(),
        version = %settings.version,
        ttl_secs = settings.cache_ttl.as_secs(),
        cache = ?settings.cache,
        "news service configured"
    );
    build_app(feeds, fetcher, cache, settings)
}
