// src/adnet/mod.rs
//! Ad-network configuration and the adapter trait.
//!
//! Networks form a closed set (`NetworkKind`); configuration supplies the
//! static load-time and fill-rate figures per network and loads from
//! `config/ad_networks.json` with a built-in seed as fallback.

pub mod perf;
pub mod providers;
pub mod select;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Closed enumeration of supported ad networks. The registry maps each kind
/// to one adapter; configuration entries with unknown names are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    Adsense,
    Medianet,
    Propellerads,
    Adsterra,
}

impl NetworkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkKind::Adsense => "adsense",
            NetworkKind::Medianet => "medianet",
            NetworkKind::Propellerads => "propellerads",
            NetworkKind::Adsterra => "adsterra",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "adsense" => Some(NetworkKind::Adsense),
            "medianet" => Some(NetworkKind::Medianet),
            "propellerads" => Some(NetworkKind::Propellerads),
            "adsterra" => Some(NetworkKind::Adsterra),
            _ => None,
        }
    }

    /// Serving endpoint for the network's creative API.
    pub fn endpoint(self) -> &'static str {
        match self {
            NetworkKind::Adsense => "https://ads.adsense-serve.example/v1/creative",
            NetworkKind::Medianet => "https://serve.medianet.example/api/creative",
            NetworkKind::Propellerads => "https://api.propellerads.example/serve",
            NetworkKind::Adsterra => "https://serve.adsterra.example/creative",
        }
    }
}

/// Static per-network figures used by the revenue score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub name: String,
    pub load_time_ms: u32,
    pub fill_rate: f64,
}

/// Full ad configuration: networks in priority order. Ties in the revenue
/// score fall back to this order.
#[derive(Debug, Clone, Deserialize)]
pub struct AdNetworksConfig {
    pub networks: Vec<NetworkConfig>,
}

impl AdNetworksConfig {
    /// Load from a JSON file; fall back to `default_seed()` on error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Built-in network seed matching the shipped `config/ad_networks.json`.
    pub fn default_seed() -> Self {
        let mk = |name: &str, load_time_ms: u32, fill_rate: f64| NetworkConfig {
            name: name.to_string(),
            load_time_ms,
            fill_rate,
        };
        Self {
            networks: vec![
                mk("adsense", 850, 0.92),
                mk("medianet", 700, 0.85),
                mk("propellerads", 550, 0.78),
                mk("adsterra", 400, 0.70),
            ],
        }
    }
}

/// One ad slot request as forwarded to the networks.
#[derive(Debug, Clone)]
pub struct AdRequest {
    pub ad_type: String,
    pub placement: String,
    pub user_preference: Option<String>,
}

/// Creative returned by a network on success.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdCreative {
    pub html: String,
    #[serde(default)]
    pub estimated_revenue: f64,
}

/// One upstream ad network. Same isolation contract as the news sources:
/// failures are `Err`, never a panic, and a missing credential short-circuits
/// before any network traffic.
#[async_trait::async_trait]
pub trait AdNetwork: Send + Sync {
    async fn request_creative(&self, req: &AdRequest) -> Result<AdCreative>;
    fn name(&self) -> &str;
}

/// A configured network together with its adapter. Selection operates on
/// these pairs so the static figures can never drift from the adapter list.
pub struct RegisteredNetwork {
    pub config: NetworkConfig,
    pub adapter: Box<dyn AdNetwork>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_roundtrip() {
        for k in [
            NetworkKind::Adsense,
            NetworkKind::Medianet,
            NetworkKind::Propellerads,
            NetworkKind::Adsterra,
        ] {
            assert_eq!(NetworkKind::parse(k.as_str()), Some(k));
        }
        assert_eq!(NetworkKind::parse("doubleclick"), None);
    }

    #[test]
    fn seed_keeps_priority_order() {
        let cfg = AdNetworksConfig::default_seed();
        let names: Vec<_> = cfg.networks.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["adsense", "medianet", "propellerads", "adsterra"]);
    }
}
