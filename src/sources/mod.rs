// src/sources/mod.rs
pub mod alphavantage;
pub mod cryptocompare;
pub mod finnhub;
pub mod newsapi;

use anyhow::Result;
use chrono::{DateTime, Utc};

/// Request descriptor shared by every news adapter in one fan-out.
#[derive(Debug, Clone)]
pub struct NewsRequest {
    /// Topic/category, e.g. "business", "technology", "crypto".
    pub category: String,
    /// Page size requested by the caller. Adapters may derive their own
    /// per-source quota from it (the primary source asks for half).
    pub page_size: usize,
}

/// One normalized article as produced by an adapter. No derived scores yet;
/// scoring attaches them in a separate type so an unscored article can never
/// reach the caller.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    /// Identity key for deduplication across sources.
    pub url: String,
    pub title: String,
    pub description: String,
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

/// One upstream news API. Implementations own their endpoint, credential
/// check, and response mapping. Failures come back as `Err` and stop at the
/// fan-out collector; nothing here may panic on malformed upstream bodies.
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self, req: &NewsRequest) -> Result<Vec<RawArticle>>;
    fn name(&self) -> &'static str;
}

/// Failure reason used when an adapter has no credential configured.
/// Adapters must return this without attempting the upstream call.
pub const MISSING_CONFIG: &str = "missing_config";

/// Normalize upstream text: decode HTML entities, strip tags, collapse
/// whitespace. Keyword scoring runs on the result.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // Length cap keeps pathological bodies out of the scorer.
    if out.chars().count() > 2000 {
        out = out.chars().take(2000).collect();
    }
    out
}

/// Parse an RFC 3339 publish time; upstreams occasionally send garbage here.
pub fn parse_published(ts: Option<&str>) -> Option<DateTime<Utc>> {
    ts.and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_tags_and_entities() {
        let s = "<b>Fed&nbsp;holds</b>   rates <i>steady</i>";
        assert_eq!(normalize_text(s), "Fed holds rates steady");
    }

    #[test]
    fn normalize_caps_runaway_bodies() {
        let s = "x".repeat(5000);
        assert_eq!(normalize_text(&s).chars().count(), 2000);
    }

    #[test]
    fn published_parse_tolerates_garbage() {
        assert!(parse_published(Some("2025-11-02T10:30:00Z")).is_some());
        assert!(parse_published(Some("yesterday-ish")).is_none());
        assert!(parse_published(None).is_none());
    }
}
