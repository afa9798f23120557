// src/adnet/select.rs
//! Network selection: score, order, attempt in order, fall back.
//!
//! The revenue score blends recorded performance with the static per-network
//! figures. Weights are deliberate defaults carried over from the production
//! rotation rules; they have no empirical calibration behind them and are
//! reproduced as-is.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::adnet::perf::{NetworkPerf, PerfLedger, PerfSnapshot};
use crate::adnet::{AdRequest, NetworkConfig, RegisteredNetwork};

const W_REVENUE: f64 = 0.4;
const W_SUCCESS: f64 = 0.3;
const W_SPEED: f64 = 0.2;
const W_FILL: f64 = 0.1;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ad_requests_total", "Ad selection requests served.");
        describe_counter!("ad_attempts_total", "Network attempts, by network and result.");
        describe_counter!("ad_fallback_total", "House-ad responses after total failure.");
        describe_counter!("ad_creatives_total", "Creatives successfully served, by network.");
    });
}

/// Weighted candidate score for one network given its recorded performance.
pub fn revenue_score(config: &NetworkConfig, perf: &NetworkPerf) -> f64 {
    let revenue_term = (perf.total_revenue / 1000.0).min(1.0);
    let speed_term = (1000.0 - f64::from(config.load_time_ms)) / 1000.0;
    W_REVENUE * revenue_term
        + W_SUCCESS * perf.success_rate()
        + W_SPEED * speed_term
        + W_FILL * config.fill_rate
}

/// Indices of `networks` in descending score order. The sort is stable, so
/// equal scores keep configuration order.
pub fn ranked_indices(networks: &[RegisteredNetwork], ledger: &PerfLedger) -> Vec<usize> {
    let scores: Vec<f64> = networks
        .iter()
        .map(|n| revenue_score(&n.config, &ledger.get(n.adapter.name())))
        .collect();

    let mut order: Vec<usize> = (0..networks.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(std::cmp::Ordering::Equal));
    order
}

/// Final ad response, live or house fallback.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdSelection {
    pub success: bool,
    pub network: String,
    pub html: String,
    pub revenue_score: f64,
    pub load_time: u32,
    pub estimated_revenue: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_metrics: Option<PerfSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Attempt networks strictly in descending score order. Every attempt is
/// recorded in the ledger before moving to the next network; the first
/// success wins. When every network fails, serve the house ad; that path
/// is not scored and not recorded.
pub async fn select(
    networks: &[RegisteredNetwork],
    ledger: &PerfLedger,
    req: &AdRequest,
) -> AdSelection {
    ensure_metrics_described();
    counter!("ad_requests_total").increment(1);

    for idx in ranked_indices(networks, ledger) {
        let net = &networks[idx];
        let name = net.adapter.name().to_string();
        let score = revenue_score(&net.config, &ledger.get(&name));

        match net.adapter.request_creative(req).await {
            Ok(creative) => {
                ledger.record_attempt(&name, Some(creative.estimated_revenue));
                counter!("ad_attempts_total", "network" => name.clone(), "result" => "ok")
                    .increment(1);
                return AdSelection {
                    success: true,
                    html: creative.html,
                    revenue_score: score,
                    load_time: net.config.load_time_ms,
                    estimated_revenue: creative.estimated_revenue,
                    revenue_metrics: Some(ledger.snapshot(&name)),
                    error: None,
                    network: name,
                };
            }
            Err(e) => {
                ledger.record_attempt(&name, None);
                counter!("ad_attempts_total", "network" => name.clone(), "result" => "err")
                    .increment(1);
                tracing::warn!(network = %name, error = %e, "ad network failed");
            }
        }
    }

    counter!("ad_fallback_total").increment(1);
    AdSelection {
        success: false,
        network: "house".to_string(),
        html: crate::fallback::house_ad(),
        revenue_score: 0.0,
        load_time: 0,
        estimated_revenue: 0.0,
        revenue_metrics: None,
        error: Some("all ad networks unavailable".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adnet::{AdCreative, AdNetwork};
    use anyhow::{bail, Result};
    use async_trait::async_trait;

    struct StubNetwork {
        name: &'static str,
        succeed: bool,
        revenue: f64,
    }

    #[async_trait]
    impl AdNetwork for StubNetwork {
        async fn request_creative(&self, _req: &AdRequest) -> Result<AdCreative> {
            if self.succeed {
                Ok(AdCreative {
                    html: format!("<div>{}</div>", self.name),
                    estimated_revenue: self.revenue,
                })
            } else {
                bail!("stub down")
            }
        }
        fn name(&self) -> &str {
            self.name
        }
    }

    fn registered(name: &'static str, load: u32, fill: f64, succeed: bool) -> RegisteredNetwork {
        RegisteredNetwork {
            config: NetworkConfig {
                name: name.to_string(),
                load_time_ms: load,
                fill_rate: fill,
            },
            adapter: Box::new(StubNetwork {
                name,
                succeed,
                revenue: 2.0,
            }),
        }
    }

    fn req() -> AdRequest {
        AdRequest {
            ad_type: "banner".into(),
            placement: "sidebar".into(),
            user_preference: None,
        }
    }

    #[test]
    fn recorded_revenue_outranks_identical_static_figures() {
        let networks = vec![
            registered("adsense", 500, 0.8, true),
            registered("medianet", 500, 0.8, true),
        ];
        let ledger = PerfLedger::new();
        ledger.record_attempt("medianet", Some(400.0));
        ledger.record_attempt("medianet", Some(300.0));

        let order = ranked_indices(&networks, &ledger);
        assert_eq!(order[0], 1, "higher recorded revenue must be attempted first");
    }

    #[test]
    fn ties_keep_configuration_order() {
        let networks = vec![
            registered("adsense", 500, 0.8, true),
            registered("medianet", 500, 0.8, true),
        ];
        let ledger = PerfLedger::new();
        let order = ranked_indices(&networks, &ledger);
        assert_eq!(order, vec![0, 1]);
    }

    #[tokio::test]
    async fn first_success_wins_and_failures_are_recorded() {
        let networks = vec![
            registered("adsense", 300, 0.9, false),
            registered("medianet", 500, 0.8, true),
        ];
        let ledger = PerfLedger::new();
        let out = select(&networks, &ledger, &req()).await;

        assert!(out.success);
        assert_eq!(out.network, "medianet");
        assert_eq!(ledger.get("adsense").requests, 1);
        assert_eq!(ledger.get("adsense").successes, 0);
        assert_eq!(ledger.get("medianet").successes, 1);
    }

    #[tokio::test]
    async fn house_fallback_is_not_recorded() {
        let networks = vec![
            registered("adsense", 300, 0.9, false),
            registered("medianet", 500, 0.8, false),
        ];
        let ledger = PerfLedger::new();
        let out = select(&networks, &ledger, &req()).await;

        assert!(!out.success);
        assert_eq!(out.network, "house");
        assert!(out.error.is_some());
        assert!(!out.html.is_empty());
        // Both real attempts recorded; nothing for the house ad.
        assert_eq!(ledger.get("adsense").requests, 1);
        assert_eq!(ledger.get("medianet").requests, 1);
        assert_eq!(ledger.get("house").requests, 0);
    }

    #[test]
    fn revenue_score_formula_matches_weights() {
        let cfg = NetworkConfig {
            name: "adsense".into(),
            load_time_ms: 600,
            fill_rate: 0.5,
        };
        let perf = NetworkPerf {
            requests: 4,
            successes: 2,
            total_revenue: 500.0,
        };
        // 0.4*0.5 + 0.3*0.5 + 0.2*0.4 + 0.1*0.5
        let expected = 0.2 + 0.15 + 0.08 + 0.05;
        assert!((revenue_score(&cfg, &perf) - expected).abs() < 1e-9);
    }
}
