// src/sources/alphavantage.rs
//! Alpha Vantage forex pass-through. Single upstream, no aggregation: the
//! handler maps any `Err` here straight to a 502.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

pub struct AlphaVantageClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForexRate {
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub refreshed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    payload: Option<Payload>,
}

// Alpha Vantage numbers its JSON keys; serde renames keep the mapping local.
#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(rename = "5. Exchange Rate")]
    exchange_rate: String,
    #[serde(rename = "6. Last Refreshed")]
    last_refreshed: Option<String>,
}

impl AlphaVantageClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }

    pub async fn forex_rate(&self, from: &str, to: &str) -> Result<ForexRate> {
        let Some(key) = self.api_key.as_deref() else {
            bail!(crate::sources::MISSING_CONFIG);
        };

        let resp = self
            .http
            .get("https://www.alphavantage.co/query")
            .query(&[
                ("function", "CURRENCY_EXCHANGE_RATE"),
                ("from_currency", from),
                ("to_currency", to),
                ("apikey", key),
            ])
            .send()
            .await
            .context("alphavantage request")?;

        if !resp.status().is_success() {
            bail!("alphavantage status {}", resp.status());
        }
        let body: Envelope = resp.json().await.context("alphavantage body")?;
        let payload = body
            .payload
            .ok_or_else(|| anyhow!("alphavantage: no exchange-rate payload"))?;
        let rate: f64 = payload
            .exchange_rate
            .parse()
            .context("alphavantage rate parse")?;

        Ok(ForexRate {
            from: from.to_ascii_uppercase(),
            to: to.to_ascii_uppercase(),
            rate,
            refreshed_at: payload.last_refreshed,
        })
    }
}
