use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use metrics::counter;
use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::adnet::providers::build_registry;
use crate::adnet::select::{self, AdSelection};
use crate::adnet::{AdNetworksConfig, AdRequest, RegisteredNetwork};
use crate::adnet::perf::PerfLedger;
use crate::analyze::{MarketSummary, ScoredArticle, ScoringConfig};
use crate::config::ApiKeys;
use crate::pipeline;
use crate::sources::alphavantage::{AlphaVantageClient, ForexRate};
use crate::sources::cryptocompare::CryptoCompareSource;
use crate::sources::finnhub::{FinnhubSource, Quote, RecommendationPeriod};
use crate::sources::newsapi::NewsApiSource;
use crate::sources::{NewsRequest, NewsSource, RawArticle};

pub const SCORING_CONFIG_PATH: &str = "config/scoring.toml";
pub const AD_NETWORKS_CONFIG_PATH: &str = "config/ad_networks.json";

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 50;

#[derive(Clone)]
pub struct AppState {
    /// News adapters in priority order; merge keeps the first occurrence.
    news_sources: Arc<Vec<Box<dyn NewsSource>>>,
    /// Reloadable network registry. The Arc inside is cloned out before any
    /// await so the guard never crosses a suspension point.
    ad_networks: Arc<RwLock<Arc<Vec<RegisteredNetwork>>>>,
    ledger: Arc<PerfLedger>,
    scoring: Arc<ScoringConfig>,
    // Pass-through clients (single upstream, no fallback).
    newsapi: Arc<NewsApiSource>,
    finnhub: Arc<FinnhubSource>,
    alphavantage: Arc<AlphaVantageClient>,
}

impl AppState {
    /// Build the full state from the environment and config files.
    pub fn from_env() -> Self {
        let keys = ApiKeys::from_env();
        let http = crate::config::http_client();

        let news_sources: Vec<Box<dyn NewsSource>> = vec![
            Box::new(NewsApiSource::new(http.clone(), keys.newsapi.clone())),
            Box::new(FinnhubSource::new(http.clone(), keys.finnhub.clone())),
            Box::new(CryptoCompareSource::new(
                http.clone(),
                keys.cryptocompare.clone(),
            )),
        ];

        let ad_config = AdNetworksConfig::load_from_file(AD_NETWORKS_CONFIG_PATH);
        let registry = build_registry(&ad_config, &http, &keys);

        Self {
            news_sources: Arc::new(news_sources),
            ad_networks: Arc::new(RwLock::new(Arc::new(registry))),
            ledger: Arc::new(PerfLedger::new()),
            scoring: Arc::new(ScoringConfig::load_from_file(SCORING_CONFIG_PATH)),
            newsapi: Arc::new(NewsApiSource::new(http.clone(), keys.newsapi.clone())),
            finnhub: Arc::new(FinnhubSource::new(http.clone(), keys.finnhub.clone())),
            alphavantage: Arc::new(AlphaVantageClient::new(http, keys.alphavantage.clone())),
        }
    }

    pub fn ad_network_count(&self) -> usize {
        self.ad_networks.read().expect("rwlock poisoned").len()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/news", get(news))
        .route("/ad", get(ad))
        .route("/quote", get(quote))
        .route("/headlines", get(headlines))
        .route("/forex", get(forex))
        .route("/recommendations", get(recommendations))
        .route("/impression", post(impression))
        .route("/admin/reload-ad-networks", get(admin_reload_ad_networks))
        .nest_service("/static", ServeDir::new("static"))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ---- /news ----

#[derive(serde::Deserialize)]
struct NewsParams {
    category: Option<String>,
    #[serde(rename = "pageSize")]
    page_size: Option<usize>,
    /// Optional comma-separated adapter names restricting the fan-out.
    sources: Option<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct NewsResponse {
    articles: Vec<ScoredArticle>,
    total_results: usize,
    sources_used: Vec<bool>,
    analyzed_at: DateTime<Utc>,
    market_summary: MarketSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn news(State(state): State<AppState>, Query(p): Query<NewsParams>) -> Json<NewsResponse> {
    let req = NewsRequest {
        category: p.category.unwrap_or_else(|| "business".to_string()),
        page_size: p.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
    };

    // Restrict to the requested adapters when the filter names at least one
    // configured source; otherwise run the full configured list.
    let wanted: Vec<&str> = p
        .sources
        .as_deref()
        .map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let mut selected: Vec<&dyn NewsSource> = state
        .news_sources
        .iter()
        .map(|b| b.as_ref())
        .filter(|s| wanted.is_empty() || wanted.iter().any(|w| w.eq_ignore_ascii_case(s.name())))
        .collect();
    if selected.is_empty() {
        selected = state.news_sources.iter().map(|b| b.as_ref()).collect();
    }

    let agg = pipeline::run_news(&selected, &req, &state.scoring).await;
    Json(NewsResponse {
        total_results: agg.articles.len(),
        articles: agg.articles,
        sources_used: agg.sources_used,
        analyzed_at: agg.analyzed_at,
        market_summary: agg.summary,
        error: agg.degraded,
    })
}

// ---- /ad ----

#[derive(serde::Deserialize)]
struct AdParams {
    #[serde(rename = "type")]
    ad_type: Option<String>,
    placement: Option<String>,
    #[serde(rename = "userPreference")]
    user_preference: Option<String>,
}

async fn ad(State(state): State<AppState>, Query(p): Query<AdParams>) -> Json<AdSelection> {
    let req = AdRequest {
        ad_type: p.ad_type.unwrap_or_else(|| "banner".to_string()),
        placement: p.placement.unwrap_or_else(|| "sidebar".to_string()),
        user_preference: p.user_preference,
    };

    let networks = {
        let guard = state.ad_networks.read().expect("rwlock poisoned");
        Arc::clone(&guard)
    };
    Json(select::select(&networks, &state.ledger, &req).await)
}

// ---- pass-through endpoints (no fallback; upstream failure is a 502) ----

type UpstreamFailure = (StatusCode, Json<Value>);

fn bad_gateway(e: anyhow::Error) -> UpstreamFailure {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": e.to_string() })),
    )
}

#[derive(serde::Deserialize)]
struct SymbolParam {
    symbol: String,
}

async fn quote(
    State(state): State<AppState>,
    Query(p): Query<SymbolParam>,
) -> Result<Json<Quote>, UpstreamFailure> {
    state.finnhub.quote(&p.symbol).await.map(Json).map_err(bad_gateway)
}

async fn recommendations(
    State(state): State<AppState>,
    Query(p): Query<SymbolParam>,
) -> Result<Json<Vec<RecommendationPeriod>>, UpstreamFailure> {
    state
        .finnhub
        .recommendations(&p.symbol)
        .await
        .map(Json)
        .map_err(bad_gateway)
}

#[derive(serde::Deserialize)]
struct HeadlinesParams {
    category: Option<String>,
    #[serde(rename = "pageSize")]
    page_size: Option<usize>,
}

async fn headlines(
    State(state): State<AppState>,
    Query(p): Query<HeadlinesParams>,
) -> Result<Json<Vec<RawArticle>>, UpstreamFailure> {
    let category = p.category.unwrap_or_else(|| "business".to_string());
    let limit = p.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    state
        .newsapi
        .headlines(&category, limit)
        .await
        .map(Json)
        .map_err(bad_gateway)
}

#[derive(serde::Deserialize)]
struct ForexParams {
    from: String,
    to: String,
}

async fn forex(
    State(state): State<AppState>,
    Query(p): Query<ForexParams>,
) -> Result<Json<ForexRate>, UpstreamFailure> {
    state
        .alphavantage
        .forex_rate(&p.from, &p.to)
        .await
        .map(Json)
        .map_err(bad_gateway)
}

// ---- widget impression beacon ----

#[derive(serde::Deserialize)]
struct ImpressionParams {
    network: Option<String>,
}

/// Counts widget impressions. Fire-and-forget from the browser; nothing in
/// the ranking reads this.
async fn impression(Query(p): Query<ImpressionParams>) -> StatusCode {
    let network = p.network.unwrap_or_else(|| "unknown".to_string());
    counter!("ad_impressions_total", "network" => network).increment(1);
    StatusCode::NO_CONTENT
}

// ---- admin ----

async fn admin_reload_ad_networks(State(state): State<AppState>) -> String {
    let cfg = AdNetworksConfig::load_from_file(AD_NETWORKS_CONFIG_PATH);
    let keys = ApiKeys::from_env();
    let registry = build_registry(&cfg, &crate::config::http_client(), &keys);
    match state.ad_networks.write() {
        Ok(mut slot) => {
            *slot = Arc::new(registry);
            "reloaded".to_string()
        }
        Err(_) => "failed: lock poisoned".to_string(),
    }
}
