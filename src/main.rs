//! News digest service — binary entrypoint.
//! Loads `.env`, installs logging, and hands the Axum router to Shuttle.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    news_digest::init_tracing();

    let router = news_digest::app().await?;
    Ok(router.into())
}
