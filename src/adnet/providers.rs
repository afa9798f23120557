// src/adnet/providers.rs
//! Concrete ad-network adapters.
//!
//! Every supported network speaks the same creative-serving shape, so one
//! REST adapter covers the whole registry; the `NetworkKind` supplies the
//! endpoint and the credential lookup key.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;

use crate::adnet::{
    AdCreative, AdNetwork, AdNetworksConfig, AdRequest, NetworkKind, RegisteredNetwork,
};
use crate::config::ApiKeys;
use crate::sources::MISSING_CONFIG;

pub struct RestAdNetwork {
    kind: NetworkKind,
    http: reqwest::Client,
    api_key: Option<String>,
}

impl RestAdNetwork {
    pub fn new(kind: NetworkKind, http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { kind, http, api_key }
    }
}

#[async_trait]
impl AdNetwork for RestAdNetwork {
    async fn request_creative(&self, req: &AdRequest) -> Result<AdCreative> {
        let Some(key) = self.api_key.as_deref() else {
            bail!(MISSING_CONFIG);
        };

        let mut query: Vec<(&str, &str)> = vec![
            ("type", req.ad_type.as_str()),
            ("placement", req.placement.as_str()),
            ("key", key),
        ];
        if let Some(pref) = req.user_preference.as_deref() {
            query.push(("pref", pref));
        }

        let resp = self
            .http
            .get(self.kind.endpoint())
            .query(&query)
            .send()
            .await
            .with_context(|| format!("{} request", self.kind.as_str()))?;

        if !resp.status().is_success() {
            bail!("{} status {}", self.kind.as_str(), resp.status());
        }
        let creative: AdCreative = resp
            .json()
            .await
            .with_context(|| format!("{} body", self.kind.as_str()))?;

        if creative.html.trim().is_empty() {
            bail!("{} returned empty creative", self.kind.as_str());
        }
        counter!("ad_creatives_total", "network" => self.kind.as_str()).increment(1);
        Ok(creative)
    }

    fn name(&self) -> &str {
        self.kind.as_str()
    }
}

/// Build the adapter registry from configuration, in configuration order.
/// Unknown network names are skipped with a warning so one typo in the
/// config file cannot take the whole ad path down.
pub fn build_registry(
    cfg: &AdNetworksConfig,
    http: &reqwest::Client,
    keys: &ApiKeys,
) -> Vec<RegisteredNetwork> {
    let mut out: Vec<RegisteredNetwork> = Vec::with_capacity(cfg.networks.len());
    for entry in &cfg.networks {
        match NetworkKind::parse(&entry.name) {
            Some(kind) => out.push(RegisteredNetwork {
                config: entry.clone(),
                adapter: Box::new(RestAdNetwork::new(
                    kind,
                    http.clone(),
                    keys.ad_network_key(kind.as_str()),
                )),
            }),
            None => tracing::warn!(network = %entry.name, "unknown ad network in config; skipped"),
        }
    }
    out
}
