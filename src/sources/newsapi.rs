// src/sources/newsapi.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::sources::{normalize_text, parse_published, NewsRequest, NewsSource, RawArticle, MISSING_CONFIG};

/// NewsAPI.org top-headlines adapter. This is the primary source of the news
/// fan-out: it asks upstream for half the caller's page size and lets the
/// remaining sources fill the rest, so the merge is not dominated by one feed.
pub struct NewsApiSource {
    http: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    articles: Vec<UpstreamArticle>,
}

#[derive(Debug, Deserialize)]
struct UpstreamArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<UpstreamSource>,
}

#[derive(Debug, Deserialize)]
struct UpstreamSource {
    name: Option<String>,
}

impl NewsApiSource {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }

    /// Raw top-headlines call. Also used directly by the pass-through
    /// endpoint, which wants the full page rather than the fan-out quota.
    pub async fn headlines(&self, category: &str, limit: usize) -> Result<Vec<RawArticle>> {
        let Some(key) = self.api_key.as_deref() else {
            bail!(MISSING_CONFIG);
        };

        let t0 = std::time::Instant::now();
        let limit_s = limit.to_string();
        let resp = self
            .http
            .get("https://newsapi.org/v2/top-headlines")
            .query(&[
                ("category", category),
                ("pageSize", limit_s.as_str()),
                ("language", "en"),
            ])
            .header("X-Api-Key", key)
            .send()
            .await
            .context("newsapi request")?;

        if !resp.status().is_success() {
            bail!("newsapi status {}", resp.status());
        }
        let body: Envelope = resp.json().await.context("newsapi body")?;

        let mut out = Vec::with_capacity(body.articles.len());
        for a in body.articles {
            let Some(url) = a.url.filter(|u| !u.is_empty()) else {
                continue;
            };
            let title = normalize_text(a.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            out.push(RawArticle {
                url,
                title,
                description: normalize_text(a.description.as_deref().unwrap_or_default()),
                source: a
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "NewsAPI".to_string()),
                published_at: parse_published(a.published_at.as_deref()),
                image_url: a.url_to_image,
            });
        }

        histogram!("news_fetch_ms", "source" => "newsapi")
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("news_source_articles_total", "source" => "newsapi").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    async fn fetch(&self, req: &NewsRequest) -> Result<Vec<RawArticle>> {
        // Per-source quota: half the requested page, applied before merge.
        let quota = (req.page_size / 2).max(1);
        self.headlines(&req.category, quota).await
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
