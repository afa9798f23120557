// src/analyze/sentiment.rs
use serde::{Deserialize, Serialize};

use crate::analyze::keywords::ScoringConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Classify sentiment by net keyword occurrences. `text` must already be
/// lowercased; counting is plain substring occurrence, no stemming.
pub fn classify(text: &str, cfg: &ScoringConfig) -> Sentiment {
    let pos: i64 = cfg.positive.iter().map(|w| count(text, w)).sum();
    let neg: i64 = cfg.negative.iter().map(|w| count(text, w)).sum();
    let net = pos - neg;

    if net >= cfg.sentiment_min {
        Sentiment::Positive
    } else if net <= -cfg.sentiment_min {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

fn count(text: &str, word: &str) -> i64 {
    if word.is_empty() {
        return 0;
    }
    text.matches(word).count() as i64
}
