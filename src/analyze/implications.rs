// src/analyze/implications.rs
use crate::analyze::keywords::ScoringConfig;

/// Advisory shown when no topical rule matches.
pub const GENERIC_ADVICE: &str = "No immediate trading implications identified.";

/// Select advisory strings by which topical keyword sets appear in the
/// lowercased content. Rules fire independently; order follows the config.
pub fn derive(text: &str, cfg: &ScoringConfig) -> Vec<String> {
    let mut out = Vec::new();
    for rule in &cfg.implications {
        if rule.keywords.iter().any(|k| !k.is_empty() && text.contains(k.as_str())) {
            out.push(rule.advice.clone());
        }
    }
    if out.is_empty() {
        out.push(GENERIC_ADVICE.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default_seed()
    }

    #[test]
    fn rate_story_yields_rate_advice() {
        let out = derive("fed weighs another rate hike", &cfg());
        assert!(out.iter().any(|s| s.contains("rate-sensitive")));
    }

    #[test]
    fn multiple_topics_fire_multiple_advisories() {
        let out = derive("earnings beat as merger talk swirls", &cfg());
        assert!(out.len() >= 2);
        assert!(!out.contains(&GENERIC_ADVICE.to_string()));
    }

    #[test]
    fn no_topic_yields_single_generic_advisory() {
        let out = derive("quiet session ahead of the holiday", &cfg());
        assert_eq!(out, vec![GENERIC_ADVICE.to_string()]);
    }
}
