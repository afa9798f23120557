// src/analyze/assets.rs
//! Related-asset extraction against a fixed roster of tickers, crypto name
//! variants, and currency codes. Matching runs on the uppercased content;
//! confidence is a flat per-category constant.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Stock,
    Crypto,
    Forex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedAsset {
    pub symbol: String,
    pub asset_type: AssetType,
    pub confidence: f32,
}

pub const STOCK_CONFIDENCE: f32 = 0.9;
pub const CRYPTO_CONFIDENCE: f32 = 0.8;
pub const FOREX_CONFIDENCE: f32 = 0.7;

/// At most this many assets per article.
pub const MAX_ASSETS: usize = 5;

const STOCK_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "AMD", "INTC", "JPM", "GS",
    "BA", "DIS", "WMT",
];

/// `(variant, canonical symbol)` pairs; name variants map onto one symbol.
const CRYPTO_VARIANTS: &[(&str, &str)] = &[
    ("BITCOIN", "BTC"),
    ("BTC", "BTC"),
    ("ETHEREUM", "ETH"),
    ("ETH", "ETH"),
    ("SOLANA", "SOL"),
    ("DOGECOIN", "DOGE"),
    ("XRP", "XRP"),
    ("CARDANO", "ADA"),
];

const CURRENCY_CODES: &[&str] = &["USD", "EUR", "GBP", "JPY", "CHF", "CAD", "AUD", "CNY"];

/// Scan the content for known assets, in roster order: stocks, then crypto,
/// then currencies. Deduplicates by symbol and caps at `MAX_ASSETS`.
pub fn extract(content: &str) -> Vec<RelatedAsset> {
    let upper = content.to_uppercase();
    let mut out: Vec<RelatedAsset> = Vec::new();

    let mut push = |symbol: &str, asset_type: AssetType, confidence: f32| {
        if out.len() < MAX_ASSETS && !out.iter().any(|a| a.symbol == symbol) {
            out.push(RelatedAsset {
                symbol: symbol.to_string(),
                asset_type,
                confidence,
            });
        }
    };

    for t in STOCK_TICKERS {
        if upper.contains(t) {
            push(t, AssetType::Stock, STOCK_CONFIDENCE);
        }
    }
    for (variant, symbol) in CRYPTO_VARIANTS {
        if upper.contains(variant) {
            push(symbol, AssetType::Crypto, CRYPTO_CONFIDENCE);
        }
    }
    for c in CURRENCY_CODES {
        if upper.contains(c) {
            push(c, AssetType::Forex, FOREX_CONFIDENCE);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_tickers_case_insensitively() {
        let assets = extract("Aapl beats expectations while tsla slips");
        let syms: Vec<&str> = assets.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(syms, vec!["AAPL", "TSLA"]);
        assert!(assets.iter().all(|a| a.asset_type == AssetType::Stock));
        assert!(assets.iter().all(|a| (a.confidence - 0.9).abs() < 1e-6));
    }

    #[test]
    fn crypto_name_variants_collapse_to_one_symbol() {
        let assets = extract("Bitcoin rallies; BTC dominance climbs");
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].symbol, "BTC");
        assert_eq!(assets[0].asset_type, AssetType::Crypto);
        assert!((assets[0].confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn currency_codes_get_forex_confidence() {
        let assets = extract("EUR slides against the JPY");
        assert_eq!(assets.len(), 2);
        assert!(assets.iter().all(|a| a.asset_type == AssetType::Forex));
        assert!(assets.iter().all(|a| (a.confidence - 0.7).abs() < 1e-6));
    }

    #[test]
    fn caps_at_five_assets() {
        let text = "AAPL MSFT GOOGL AMZN TSLA META NVDA";
        assert_eq!(extract(text).len(), MAX_ASSETS);
    }

    #[test]
    fn nothing_matched_yields_empty() {
        assert!(extract("quiet holiday session in local markets").is_empty());
    }
}
