// src/analyze/keywords.rs
//! Keyword lists and thresholds driving the article scorer.
//!
//! Loads from `config/scoring.toml`; falls back to a built-in seed when the
//! file is missing or malformed. The numeric thresholds are deliberate
//! defaults carried over from the production scoring rules, not tuned values.

use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Keywords whose presence marks a story as market-moving.
    #[serde(default)]
    pub high_impact: Vec<String>,
    #[serde(default)]
    pub medium_impact: Vec<String>,
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
    /// Title keywords that add the breaking-news urgency bonus.
    #[serde(default)]
    pub breaking: Vec<String>,
    #[serde(default)]
    pub implications: Vec<ImplicationRule>,

    /// High-impact matches required for a `high` classification.
    #[serde(default = "default_high_min")]
    pub high_impact_min: usize,
    /// Medium-impact matches required for a `medium` classification.
    #[serde(default = "default_medium_min")]
    pub medium_impact_min: usize,
    /// Absolute net word count required to leave `neutral`.
    #[serde(default = "default_sentiment_min")]
    pub sentiment_min: i64,
    /// Flat urgency bonus for breaking titles.
    #[serde(default = "default_breaking_bonus")]
    pub breaking_bonus: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImplicationRule {
    pub keywords: Vec<String>,
    pub advice: String,
}

fn default_high_min() -> usize {
    2
}
fn default_medium_min() -> usize {
    2
}
fn default_sentiment_min() -> i64 {
    2
}
fn default_breaking_bonus() -> f32 {
    0.3
}

impl ScoringConfig {
    /// Load from a TOML file; fall back to `default_seed()` on any error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => toml::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Built-in keyword seed matching the shipped `config/scoring.toml`.
    pub fn default_seed() -> Self {
        fn list(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            high_impact: list(&[
                "fed",
                "interest rate",
                "earnings",
                "merger",
                "acquisition",
                "bankruptcy",
                "inflation",
                "recession",
                "sec investigation",
                "lawsuit",
            ]),
            medium_impact: list(&[
                "analyst",
                "upgrade",
                "downgrade",
                "guidance",
                "dividend",
                "buyback",
                "partnership",
                "forecast",
                "product launch",
            ]),
            positive: list(&[
                "surge", "gain", "rise", "rally", "growth", "profit", "beat", "strong", "record",
                "soar", "jump", "upgrade",
            ]),
            negative: list(&[
                "fall", "drop", "decline", "loss", "crash", "plunge", "miss", "weak", "concern",
                "slump", "fear", "downgrade",
            ]),
            breaking: list(&["breaking", "urgent", "just in", "alert", "developing"]),
            implications: vec![
                ImplicationRule {
                    keywords: list(&["fed", "interest rate", "rate hike", "rate cut"]),
                    advice: "Monitor rate-sensitive sectors; financials and real estate may react."
                        .to_string(),
                },
                ImplicationRule {
                    keywords: list(&["earnings", "guidance", "revenue"]),
                    advice: "Expect elevated volatility around the reporting window.".to_string(),
                },
                ImplicationRule {
                    keywords: list(&["merger", "acquisition", "takeover"]),
                    advice: "Deal spreads and sector peers may reprice.".to_string(),
                },
                ImplicationRule {
                    keywords: list(&["bitcoin", "ethereum", "crypto"]),
                    advice: "Crypto-correlated names may track the move.".to_string(),
                },
                ImplicationRule {
                    keywords: list(&["oil", "opec", "crude"]),
                    advice: "Energy names and transports often move on supply headlines."
                        .to_string(),
                },
            ],
            high_impact_min: default_high_min(),
            medium_impact_min: default_medium_min(),
            sentiment_min: default_sentiment_min(),
            breaking_bonus: default_breaking_bonus(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_carries_expected_thresholds() {
        let c = ScoringConfig::default_seed();
        assert_eq!(c.high_impact_min, 2);
        assert_eq!(c.sentiment_min, 2);
        assert!((c.breaking_bonus - 0.3).abs() < 1e-6);
        assert!(c.high_impact.iter().any(|k| k == "fed"));
        assert!(c.high_impact.iter().any(|k| k == "earnings"));
    }

    #[test]
    fn malformed_toml_falls_back_to_seed() {
        let c = ScoringConfig::load_from_file("/definitely/not/here.toml");
        assert_eq!(c.high_impact, ScoringConfig::default_seed().high_impact);
    }
}
