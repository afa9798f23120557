// src/sources/cryptocompare.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::sources::{normalize_text, NewsRequest, NewsSource, RawArticle, MISSING_CONFIG};

/// CryptoCompare news feed. Lowest-priority source in the fan-out; anything
/// it shares with the feeds above it gets dropped by the merge.
pub struct CryptoCompareSource {
    http: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Data", default)]
    data: Vec<UpstreamNews>,
}

#[derive(Debug, Deserialize)]
struct UpstreamNews {
    title: Option<String>,
    body: Option<String>,
    url: Option<String>,
    imageurl: Option<String>,
    source: Option<String>,
    /// Unix seconds.
    published_on: Option<i64>,
}

impl CryptoCompareSource {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl NewsSource for CryptoCompareSource {
    async fn fetch(&self, req: &NewsRequest) -> Result<Vec<RawArticle>> {
        let Some(key) = self.api_key.as_deref() else {
            bail!(MISSING_CONFIG);
        };

        let t0 = std::time::Instant::now();
        let resp = self
            .http
            .get("https://min-api.cryptocompare.com/data/v2/news/")
            .query(&[("lang", "EN"), ("api_key", key)])
            .send()
            .await
            .context("cryptocompare request")?;

        if !resp.status().is_success() {
            bail!("cryptocompare status {}", resp.status());
        }
        let body: Envelope = resp.json().await.context("cryptocompare body")?;

        let mut out = Vec::with_capacity(body.data.len().min(req.page_size));
        for n in body.data.into_iter().take(req.page_size) {
            let Some(url) = n.url.filter(|u| !u.is_empty()) else {
                continue;
            };
            let title = normalize_text(n.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            out.push(RawArticle {
                url,
                title,
                description: normalize_text(n.body.as_deref().unwrap_or_default()),
                source: n.source.unwrap_or_else(|| "CryptoCompare".to_string()),
                published_at: n
                    .published_on
                    .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0)),
                image_url: n.imageurl,
            });
        }

        histogram!("news_fetch_ms", "source" => "cryptocompare")
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("news_source_articles_total", "source" => "cryptocompare")
            .increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "cryptocompare"
    }
}
