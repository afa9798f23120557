//! Market Pulse — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

mod adnet;
mod analyze;
mod api;
mod config;
mod fallback;
mod metrics;
mod pipeline;
mod sources;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::api::AppState;
use crate::metrics::Metrics;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - PULSE_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("PULSE_DEV_LOG").ok().is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("market_pulse=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments. API keys and the
    // optional config-path overrides come from here.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let state = AppState::from_env();

    // Prometheus recorder must exist before the first counter increments.
    let metrics = Metrics::init(state.ad_network_count());

    let router = api::create_router(state).merge(metrics.router());

    Ok(router.into())
}
