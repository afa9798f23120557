// src/analyze/mod.rs
//! Article scoring and ranking.
//!
//! Every score is a pure, deterministic function of article content and the
//! clock value passed in, so the same input always yields the same scores.
//! The scorer consumes a `RawArticle` and produces a `ScoredArticle` whose
//! score block is not optional: a partially-scored article cannot exist as a
//! value of that type.

pub mod assets;
pub mod impact;
pub mod implications;
pub mod keywords;
pub mod sentiment;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sources::RawArticle;
pub use assets::{AssetType, RelatedAsset};
pub use impact::MarketImpact;
pub use keywords::ScoringConfig;
pub use sentiment::Sentiment;

/// The complete derived-score block attached to every returned article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleScores {
    pub market_impact: MarketImpact,
    pub sentiment: Sentiment,
    pub related_assets: Vec<RelatedAsset>,
    pub urgency: f32,
    pub trading_implications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: RawArticle,
    pub analysis: ArticleScores,
}

/// Score one article from its title + description.
pub fn score_article(article: RawArticle, now: DateTime<Utc>, cfg: &ScoringConfig) -> ScoredArticle {
    let content = format!("{} {}", article.title, article.description);
    let lower = content.to_lowercase();

    let analysis = ArticleScores {
        market_impact: impact::classify(&lower, cfg),
        sentiment: sentiment::classify(&lower, cfg),
        related_assets: assets::extract(&content),
        urgency: impact::urgency(article.published_at, &article.title, now, cfg),
        trading_implications: implications::derive(&lower, cfg),
    };

    ScoredArticle { article, analysis }
}

/// Sort descending by `impact weight + urgency`. `sort_by` is stable, so
/// equal keys keep their merge order.
pub fn rank(articles: &mut [ScoredArticle]) {
    articles.sort_by(|a, b| {
        let ka = a.analysis.market_impact.weight() + a.analysis.urgency;
        let kb = b.analysis.market_impact.weight() + b.analysis.urgency;
        kb.partial_cmp(&ka).unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Aggregate view over one scored batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub overall_sentiment: Sentiment,
    pub impact_level: MarketImpact,
    pub positive_count: usize,
    pub negative_count: usize,
    pub high_impact_count: usize,
}

/// Majority vote over per-article sentiment (tie → neutral); impact level
/// steps up with the number of high-impact stories in the batch.
pub fn market_summary(articles: &[ScoredArticle]) -> MarketSummary {
    let positive = articles
        .iter()
        .filter(|a| a.analysis.sentiment == Sentiment::Positive)
        .count();
    let negative = articles
        .iter()
        .filter(|a| a.analysis.sentiment == Sentiment::Negative)
        .count();
    let high = articles
        .iter()
        .filter(|a| a.analysis.market_impact == MarketImpact::High)
        .count();

    let overall_sentiment = if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    let impact_level = if high > 3 {
        MarketImpact::High
    } else if high > 1 {
        MarketImpact::Medium
    } else {
        MarketImpact::Low
    };

    MarketSummary {
        overall_sentiment,
        impact_level,
        positive_count: positive,
        negative_count: negative,
        high_impact_count: high,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default_seed()
    }

    fn article(title: &str, description: &str) -> RawArticle {
        RawArticle {
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            title: title.to_string(),
            description: description.to_string(),
            source: "Test".to_string(),
            published_at: Some(Utc::now()),
            image_url: None,
        }
    }

    #[test]
    fn scoring_is_idempotent() {
        let now = Utc::now();
        let a = article("Fed hints at earnings-driven rally", "Markets surge on profit beat");
        let first = score_article(a.clone(), now, &cfg());
        let second = score_article(a, now, &cfg());
        assert_eq!(first.analysis, second.analysis);
    }

    #[test]
    fn rank_orders_high_impact_first() {
        let now = Utc::now();
        let mut batch = vec![
            score_article(article("local news roundup", "nothing notable"), now, &cfg()),
            score_article(
                article("fed moves on earnings shock", "merger chatter adds fuel"),
                now,
                &cfg(),
            ),
        ];
        rank(&mut batch);
        assert_eq!(batch[0].analysis.market_impact, MarketImpact::High);
    }

    #[test]
    fn rank_is_stable_for_equal_keys() {
        let now = Utc::now();
        let mut batch = vec![
            score_article(article("first plain story", ""), now, &cfg()),
            score_article(article("second plain story", ""), now, &cfg()),
        ];
        rank(&mut batch);
        assert_eq!(batch[0].article.title, "first plain story");
    }

    #[test]
    fn summary_majority_vote_and_tie() {
        let now = Utc::now();
        let pos = score_article(article("rally", "stocks surge jump and rally strong"), now, &cfg());
        let neg = score_article(article("rout", "markets crash plunge slump on fear"), now, &cfg());
        assert_eq!(pos.analysis.sentiment, Sentiment::Positive);
        assert_eq!(neg.analysis.sentiment, Sentiment::Negative);

        let s = market_summary(&[pos.clone(), pos.clone(), neg.clone()]);
        assert_eq!(s.overall_sentiment, Sentiment::Positive);

        let tie = market_summary(&[pos, neg]);
        assert_eq!(tie.overall_sentiment, Sentiment::Neutral);
    }

    #[test]
    fn summary_impact_steps_with_high_count() {
        let now = Utc::now();
        let high = score_article(
            article("fed earnings double-header", "merger on top"),
            now,
            &cfg(),
        );
        assert_eq!(high.analysis.market_impact, MarketImpact::High);

        let two = vec![high.clone(), high.clone()];
        assert_eq!(market_summary(&two).impact_level, MarketImpact::Medium);

        let four = vec![high.clone(), high.clone(), high.clone(), high];
        assert_eq!(market_summary(&four).impact_level, MarketImpact::High);

        assert_eq!(market_summary(&[]).impact_level, MarketImpact::Low);
    }
}
