// src/analyze/impact.rs
//! Market-impact classification and urgency decay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyze::keywords::ScoringConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketImpact {
    High,
    Medium,
    Low,
}

impl MarketImpact {
    /// Numeric rank contribution used only for sort ordering.
    pub fn weight(self) -> f32 {
        match self {
            MarketImpact::High => 3.0,
            MarketImpact::Medium => 2.0,
            MarketImpact::Low => 1.0,
        }
    }
}

/// Count how many keywords from `set` occur in the lowercased text. Each
/// keyword counts once regardless of repetition; the thresholds below are
/// about breadth of matched terms, not frequency.
fn match_count(text: &str, set: &[String]) -> usize {
    set.iter().filter(|k| !k.is_empty() && text.contains(k.as_str())).count()
}

/// Classify by keyword breadth: two high-impact hits make a high-impact
/// story; a single high hit or two medium hits make a medium one.
pub fn classify(text: &str, cfg: &ScoringConfig) -> MarketImpact {
    let high = match_count(text, &cfg.high_impact);
    let medium = match_count(text, &cfg.medium_impact);

    if high >= cfg.high_impact_min {
        MarketImpact::High
    } else if high >= 1 || medium >= cfg.medium_impact_min {
        MarketImpact::Medium
    } else {
        MarketImpact::Low
    }
}

/// Urgency in `[0, 1]`: linear decay over 24 hours since publication, plus a
/// flat bonus when the title carries a breaking-news keyword.
///
/// An article without a publish time gets no recency credit, only the
/// possible breaking bonus.
pub fn urgency(
    published_at: Option<DateTime<Utc>>,
    title: &str,
    now: DateTime<Utc>,
    cfg: &ScoringConfig,
) -> f32 {
    let base = match published_at {
        Some(ts) => {
            let hours = (now - ts).num_seconds().max(0) as f32 / 3600.0;
            (24.0 - hours).max(0.0) / 24.0
        }
        None => 0.0,
    };

    let title_lc = title.to_lowercase();
    let breaking = cfg.breaking.iter().any(|k| title_lc.contains(k.as_str()));
    let bonus = if breaking { cfg.breaking_bonus } else { 0.0 };

    (base + bonus).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default_seed()
    }

    #[test]
    fn two_high_keywords_classify_high() {
        let text = "fed reaction to blowout earnings season";
        assert_eq!(classify(text, &cfg()), MarketImpact::High);
    }

    #[test]
    fn single_high_keyword_classifies_medium() {
        let text = "earnings preview for the big banks";
        assert_eq!(classify(text, &cfg()), MarketImpact::Medium);
    }

    #[test]
    fn two_medium_keywords_classify_medium() {
        let text = "analyst issues upgrade after strong quarter";
        assert_eq!(classify(text, &cfg()), MarketImpact::Medium);
    }

    #[test]
    fn no_keywords_classify_low() {
        let text = "local bakery expands to second town";
        assert_eq!(classify(text, &cfg()), MarketImpact::Low);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        // "fed" appears three times but is still a single matched term.
        let text = "fed fed fed";
        assert_eq!(classify(text, &cfg()), MarketImpact::Medium);
    }

    #[test]
    fn urgency_fresh_article_is_one() {
        let now = Utc::now();
        let u = urgency(Some(now), "calm markets", now, &cfg());
        assert!((u - 1.0).abs() < 1e-3);
    }

    #[test]
    fn urgency_day_old_article_is_zero() {
        let now = Utc::now();
        let old = now - Duration::hours(30);
        let u = urgency(Some(old), "calm markets", now, &cfg());
        assert!(u.abs() < 1e-6);
    }

    #[test]
    fn breaking_bonus_applies_and_clamps() {
        let now = Utc::now();
        let stale = urgency(Some(now - Duration::hours(30)), "BREAKING: markets", now, &cfg());
        assert!((stale - 0.3).abs() < 1e-3);

        let fresh = urgency(Some(now), "Breaking news on rates", now, &cfg());
        assert!((fresh - 1.0).abs() < 1e-6, "must clamp to 1.0, got {fresh}");
    }

    #[test]
    fn missing_publish_time_has_no_recency_credit() {
        let now = Utc::now();
        assert!(urgency(None, "quiet day", now, &cfg()).abs() < 1e-6);
        let u = urgency(None, "Urgent: halt", now, &cfg());
        assert!((u - 0.3).abs() < 1e-6);
    }
}
