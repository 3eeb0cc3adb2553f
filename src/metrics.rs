// src/metrics.rs
use axum::{http::header, response::IntoResponse, routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process; later calls share it.
    pub fn init() -> anyhow::Result<Self> {
        let handle = HANDLE.get_or_try_init(|| {
            let handle = PrometheusBuilder::new().install_recorder()?;
            describe();
            Ok::<_, anyhow::Error>(handle)
        })?;
        Ok(Self {
            handle: handle.clone(),
        })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move {
                    (
                        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                        h.render(),
                    )
                        .into_response()
                }
            }),
        )
    }
}

fn describe() {
    describe_counter!("news_fetch_errors_total", "Feed fetches that failed (transport, status, timeout, size)");
    describe_counter!("news_items_decoded_total", "Items kept by the decoder");
    describe_counter!("news_items_dropped_total", "Feed blocks dropped for missing title or link");
    describe_counter!("news_cache_hits_total", "Digest requests served from cache");
    describe_counter!("news_cache_misses_total", "Digest requests that recomputed");
    describe_counter!("news_cache_errors_total", "Cache read/write errors and unreadable entries");
    describe_counter!("news_aggregation_failures_total", "Requests answered with the failure envelope");
    describe_histogram!("news_aggregate_ms", "Wall time of one recomputation (ms)");
    describe_gauge!("news_digest_items", "Distinct items in the last digest");
}
