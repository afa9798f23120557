// src/config.rs
//! Process configuration: upstream API credentials and the shared HTTP client.
//!
//! Keys are read once from the environment at startup (dotenvy has already
//! loaded `.env` in dev by then). A missing key is represented as `None`, not
//! an error: adapters short-circuit to a failed outcome instead of calling
//! upstream without credentials.

use std::time::Duration;

/// Per-upstream timeout for every outbound call (connect + total).
pub const UPSTREAM_TIMEOUT_SECS: u64 = 5;

/// API keys for the upstream providers. `None` means "not configured".
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub newsapi: Option<String>,
    pub finnhub: Option<String>,
    pub cryptocompare: Option<String>,
    pub alphavantage: Option<String>,
    /// Per-network ad keys, looked up by env suffix (e.g. `AD_KEY_ADSENSE`).
    pub ad_prefix: String,
}

impl ApiKeys {
    /// Read all keys from the environment. Empty values count as missing.
    pub fn from_env() -> Self {
        Self {
            newsapi: non_empty_env("NEWSAPI_KEY"),
            finnhub: non_empty_env("FINNHUB_KEY"),
            cryptocompare: non_empty_env("CRYPTOCOMPARE_KEY"),
            alphavantage: non_empty_env("ALPHAVANTAGE_KEY"),
            ad_prefix: "AD_KEY_".to_string(),
        }
    }

    /// Ad-network key for a given network id, e.g. `adsense` → `$AD_KEY_ADSENSE`.
    pub fn ad_network_key(&self, network: &str) -> Option<String> {
        let var = format!("{}{}", self.ad_prefix, network.to_ascii_uppercase());
        non_empty_env(&var)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Shared reqwest client with the bounded per-call timeout.
/// One upstream call can never hold a request longer than this.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("market-pulse/0.1")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
        .build()
        .expect("reqwest client")
}
