// src/sources/finnhub.rs
//! Finnhub adapter: market-news source for the aggregation fan-out, plus the
//! single-upstream quote and analyst-recommendation calls used by the
//! pass-through endpoints.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};

use crate::sources::{normalize_text, NewsRequest, NewsSource, RawArticle, MISSING_CONFIG};

const BASE: &str = "https://finnhub.io/api/v1";

pub struct FinnhubSource {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl FinnhubSource {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }

    fn key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(k) => Ok(k),
            None => bail!(MISSING_CONFIG),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpstreamNews {
    headline: Option<String>,
    summary: Option<String>,
    url: Option<String>,
    image: Option<String>,
    source: Option<String>,
    /// Unix seconds.
    datetime: Option<i64>,
}

/// Finnhub buckets news by its own category names.
fn upstream_category(category: &str) -> &'static str {
    match category {
        "crypto" => "crypto",
        "forex" => "forex",
        "merger" => "merger",
        _ => "general",
    }
}

#[async_trait]
impl NewsSource for FinnhubSource {
    async fn fetch(&self, req: &NewsRequest) -> Result<Vec<RawArticle>> {
        let key = self.key()?;

        let t0 = std::time::Instant::now();
        let resp = self
            .http
            .get(format!("{BASE}/news"))
            .query(&[
                ("category", upstream_category(&req.category)),
                ("token", key),
            ])
            .send()
            .await
            .context("finnhub news request")?;

        if !resp.status().is_success() {
            bail!("finnhub status {}", resp.status());
        }
        let body: Vec<UpstreamNews> = resp.json().await.context("finnhub news body")?;

        let mut out = Vec::with_capacity(body.len().min(req.page_size));
        for n in body.into_iter().take(req.page_size) {
            let Some(url) = n.url.filter(|u| !u.is_empty()) else {
                continue;
            };
            let title = normalize_text(n.headline.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            out.push(RawArticle {
                url,
                title,
                description: normalize_text(n.summary.as_deref().unwrap_or_default()),
                source: n.source.unwrap_or_else(|| "Finnhub".to_string()),
                published_at: n.datetime.and_then(|s| DateTime::<Utc>::from_timestamp(s, 0)),
                image_url: n.image,
            });
        }

        histogram!("news_fetch_ms", "source" => "finnhub")
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("news_source_articles_total", "source" => "finnhub").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "finnhub"
    }
}

// ---- pass-through calls (single upstream, no aggregation) ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub current: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub previous_close: f64,
    pub change: f64,
    pub percent_change: f64,
}

#[derive(Debug, Deserialize)]
struct UpstreamQuote {
    c: f64,
    h: f64,
    l: f64,
    o: f64,
    pc: f64,
    #[serde(default)]
    d: f64,
    #[serde(default)]
    dp: f64,
}

impl FinnhubSource {
    /// Real-time quote for one symbol. Errors surface to the handler, which
    /// maps them to 502 (pass-throughs have no fallback).
    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        let key = self.key()?;
        let resp = self
            .http
            .get(format!("{BASE}/quote"))
            .query(&[("symbol", symbol), ("token", key)])
            .send()
            .await
            .context("finnhub quote request")?;
        if !resp.status().is_success() {
            bail!("finnhub status {}", resp.status());
        }
        let q: UpstreamQuote = resp.json().await.context("finnhub quote body")?;
        Ok(Quote {
            symbol: symbol.to_ascii_uppercase(),
            current: q.c,
            high: q.h,
            low: q.l,
            open: q.o,
            previous_close: q.pc,
            change: q.d,
            percent_change: q.dp,
        })
    }

    /// Analyst recommendation trends for one symbol.
    pub async fn recommendations(&self, symbol: &str) -> Result<Vec<RecommendationPeriod>> {
        let key = self.key()?;
        let resp = self
            .http
            .get(format!("{BASE}/stock/recommendation"))
            .query(&[("symbol", symbol), ("token", key)])
            .send()
            .await
            .context("finnhub recommendation request")?;
        if !resp.status().is_success() {
            bail!("finnhub status {}", resp.status());
        }
        resp.json().await.context("finnhub recommendation body")
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPeriod {
    pub period: String,
    #[serde(default)]
    pub strong_buy: i64,
    #[serde(default)]
    pub buy: i64,
    #[serde(default)]
    pub hold: i64,
    #[serde(default)]
    pub sell: i64,
    #[serde(default)]
    pub strong_sell: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_mapping_defaults_to_general() {
        assert_eq!(upstream_category("business"), "general");
        assert_eq!(upstream_category("crypto"), "crypto");
    }

    #[tokio::test]
    async fn missing_key_short_circuits_without_calling_upstream() {
        let src = FinnhubSource::new(crate::config::http_client(), None);
        let req = NewsRequest {
            category: "business".into(),
            page_size: 10,
        };
        let err = src.fetch(&req).await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_CONFIG);
    }
}
