// src/fallback.rs
//! Static always-available payloads used under total upstream failure.
//!
//! The fallback articles run through the live scorer at call time, so their
//! score blocks obey the same contract as real articles and callers cannot
//! structurally distinguish a degraded response from a live one.

use chrono::Utc;

use crate::analyze::{self, ScoringConfig};
use crate::pipeline::NewsAggregation;
use crate::sources::RawArticle;

/// Fixed article set served when aggregation yields nothing usable.
pub fn fallback_articles() -> Vec<RawArticle> {
    let now = Utc::now();
    let mk = |url: &str, title: &str, description: &str| RawArticle {
        url: url.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        source: "Market Pulse".to_string(),
        published_at: Some(now),
        image_url: None,
    };

    vec![
        mk(
            "https://market-pulse.example/briefs/market-overview",
            "Markets steady as investors weigh economic data",
            "Major indexes held near recent levels while traders looked ahead to upcoming earnings reports and fed commentary.",
        ),
        mk(
            "https://market-pulse.example/briefs/sector-watch",
            "Sector watch: technology and energy in focus",
            "Rotation between growth and value continued, with analyst forecasts split on the next leg of the move.",
        ),
        mk(
            "https://market-pulse.example/briefs/crypto-snapshot",
            "Crypto snapshot: bitcoin range-bound",
            "Bitcoin traded in a narrow band as volumes thinned; ethereum followed the broader crypto market.",
        ),
    ]
}

/// Build a complete degraded aggregation: static articles, scored and
/// ranked, with the caller's reason recorded in `degraded`.
pub fn news_fallback(sources_used: Vec<bool>, cfg: &ScoringConfig, reason: &str) -> NewsAggregation {
    let now = Utc::now();
    let mut articles: Vec<_> = fallback_articles()
        .into_iter()
        .map(|a| analyze::score_article(a, now, cfg))
        .collect();
    analyze::rank(&mut articles);
    let summary = analyze::market_summary(&articles);

    NewsAggregation {
        articles,
        sources_used,
        summary,
        analyzed_at: now,
        degraded: Some(reason.to_string()),
    }
}

/// House ad markup used when every network attempt fails. Never recorded in
/// the performance ledger.
pub fn house_ad() -> String {
    concat!(
        r#"<div class="mp-ad mp-ad--house">"#,
        r#"<a href="https://market-pulse.example/pro" rel="nofollow">"#,
        "Market Pulse Pro — real-time alerts, zero noise.",
        "</a></div>"
    )
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_articles_have_unique_urls() {
        let arts = fallback_articles();
        let mut urls: Vec<_> = arts.iter().map(|a| a.url.as_str()).collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), arts.len());
    }

    #[test]
    fn news_fallback_is_fully_scored_and_flagged() {
        let cfg = ScoringConfig::default_seed();
        let agg = news_fallback(vec![false, false, false], &cfg, "all sources unavailable");
        assert!(!agg.articles.is_empty());
        assert_eq!(agg.degraded.as_deref(), Some("all sources unavailable"));
        for a in &agg.articles {
            assert!(!a.analysis.trading_implications.is_empty());
            assert!((0.0..=1.0).contains(&a.analysis.urgency));
        }
    }
}
