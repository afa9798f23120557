// src/pipeline.rs
//! News aggregation pipeline: fan out to every configured source, merge and
//! deduplicate what came back, score, rank, summarize.
//!
//! The fan-out waits for every adapter to settle. A failed source degrades
//! completeness, never availability: its error is converted into an outcome
//! tag and the remaining batches continue through the merge. When nothing
//! usable survives (or a later stage errors), the caller substitutes the
//! fallback payload instead of surfacing a failure.

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

use crate::analyze::{self, MarketSummary, ScoredArticle, ScoringConfig};
use crate::sources::{NewsRequest, NewsSource, RawArticle};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_requests_total", "News aggregation requests served.");
        describe_counter!("news_source_errors_total", "Failed source adapter calls.");
        describe_counter!(
            "news_dedup_dropped_total",
            "Articles dropped as duplicates during merge."
        );
        describe_counter!("news_fallback_total", "Responses served from the fallback set.");
        describe_histogram!("news_fetch_ms", "Per-source fetch time in milliseconds.");
    });
}

/// Result of the full aggregation, live or fallback. `articles` always carry
/// complete score blocks; `sources_used` mirrors the adapter configuration
/// order, regardless of completion order.
#[derive(Debug)]
pub struct NewsAggregation {
    pub articles: Vec<ScoredArticle>,
    pub sources_used: Vec<bool>,
    pub summary: MarketSummary,
    pub analyzed_at: DateTime<Utc>,
    /// Set when the fallback provider supplied the articles.
    pub degraded: Option<String>,
}

/// Invoke every adapter concurrently and wait for all of them to settle.
/// No short-circuit in either direction; the returned vector is in adapter
/// configuration order, one entry per adapter.
pub async fn fan_out(
    sources: &[&dyn NewsSource],
    req: &NewsRequest,
) -> Vec<Result<Vec<RawArticle>>> {
    let results = join_all(sources.iter().map(|s| s.fetch(req))).await;
    for (source, result) in sources.iter().zip(&results) {
        if let Err(e) = result {
            tracing::warn!(source = source.name(), error = %e, "news source failed");
            counter!("news_source_errors_total").increment(1);
        }
    }
    results
}

/// Fold successful batches into one sequence, keeping the first occurrence
/// of each URL. Batches arrive in adapter priority order, so a duplicate
/// from a lower-priority source is the one that gets dropped. The page-size
/// cap applies after deduplication.
pub fn merge_dedup(batches: &[Result<Vec<RawArticle>>], page_size: usize) -> Vec<RawArticle> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::new();
    let mut dropped = 0u64;

    for batch in batches.iter().filter_map(|r| r.as_ref().ok()) {
        for article in batch {
            if seen.insert(article.url.as_str()) {
                merged.push(article.clone());
            } else {
                dropped += 1;
            }
        }
    }
    counter!("news_dedup_dropped_total").increment(dropped);

    merged.truncate(page_size);
    merged
}

/// Run the whole pipeline for one request. Degradation is handled here:
/// an empty merge (every source failed, or nothing matched) and any
/// unexpected stage error both land on the fallback payload.
pub async fn run_news(
    sources: &[&dyn NewsSource],
    req: &NewsRequest,
    cfg: &ScoringConfig,
) -> NewsAggregation {
    ensure_metrics_described();
    counter!("news_requests_total").increment(1);

    let results = fan_out(sources, req).await;
    let sources_used: Vec<bool> = results.iter().map(|r| r.is_ok()).collect();

    match aggregate(&results, req, cfg) {
        Ok(agg) if !agg.articles.is_empty() => NewsAggregation {
            sources_used,
            ..agg
        },
        Ok(_) => {
            let reason = if sources_used.iter().any(|&ok| ok) {
                "no articles matched the request"
            } else {
                "all sources unavailable"
            };
            degrade(sources_used, cfg, reason)
        }
        Err(e) => {
            tracing::warn!(error = %e, "aggregation failed; serving fallback");
            degrade(sources_used, cfg, "aggregation error")
        }
    }
}

/// Merge, score, rank. Scoring is pure and total over well-formed articles;
/// the `Result` keeps the recovery boundary in one place should a stage ever
/// grow a failure mode.
fn aggregate(
    results: &[Result<Vec<RawArticle>>],
    req: &NewsRequest,
    cfg: &ScoringConfig,
) -> Result<NewsAggregation> {
    let now = Utc::now();
    let merged = merge_dedup(results, req.page_size);

    let mut articles: Vec<ScoredArticle> = merged
        .into_iter()
        .map(|a| analyze::score_article(a, now, cfg))
        .collect();
    analyze::rank(&mut articles);

    let summary = analyze::market_summary(&articles);
    Ok(NewsAggregation {
        articles,
        sources_used: Vec::new(),
        summary,
        analyzed_at: now,
        degraded: None,
    })
}

fn degrade(sources_used: Vec<bool>, cfg: &ScoringConfig, reason: &str) -> NewsAggregation {
    counter!("news_fallback_total").increment(1);
    crate::fallback::news_fallback(sources_used, cfg, reason)
}
