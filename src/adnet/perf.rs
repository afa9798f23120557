// src/adnet/perf.rs
//! Rolling per-network performance ledger.
//!
//! Process-lifetime, in-memory, reset on restart. The ledger is owned by the
//! app state and passed into the selection logic, never reached through a
//! module-level singleton, so tests can supply isolated instances. A single
//! mutex guards each update, which keeps `requests`/`successes` consistent
//! under concurrent handlers; slightly stale reads between updates are fine.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default, Clone)]
pub struct NetworkPerf {
    pub requests: u64,
    pub successes: u64,
    pub total_revenue: f64,
}

impl NetworkPerf {
    pub fn success_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.successes as f64 / self.requests as f64
        }
    }
}

/// Wire shape of one ledger entry (`revenueMetrics` in the ad response).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfSnapshot {
    pub requests: u64,
    pub successes: u64,
    pub success_rate: f64,
    pub total_revenue: f64,
}

#[derive(Debug, Default)]
pub struct PerfLedger {
    inner: Mutex<HashMap<String, NetworkPerf>>,
}

impl PerfLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one attempt. Every attempt bumps `requests`; a success also
    /// bumps `successes` and adds the estimated revenue.
    pub fn record_attempt(&self, network: &str, revenue: Option<f64>) {
        let mut inner = self.inner.lock().expect("perf ledger mutex poisoned");
        let entry = inner.entry(network.to_string()).or_default();
        entry.requests += 1;
        if let Some(rev) = revenue {
            entry.successes += 1;
            entry.total_revenue += rev;
        }
    }

    /// Current counters for one network (zeros when never attempted).
    pub fn get(&self, network: &str) -> NetworkPerf {
        let inner = self.inner.lock().expect("perf ledger mutex poisoned");
        inner.get(network).cloned().unwrap_or_default()
    }

    pub fn snapshot(&self, network: &str) -> PerfSnapshot {
        let perf = self.get(network);
        PerfSnapshot {
            requests: perf.requests,
            successes: perf.successes,
            success_rate: perf.success_rate(),
            total_revenue: perf.total_revenue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_failure_update_counters() {
        let ledger = PerfLedger::new();
        ledger.record_attempt("adsense", Some(2.5));
        ledger.record_attempt("adsense", None);
        ledger.record_attempt("adsense", Some(1.5));

        let p = ledger.get("adsense");
        assert_eq!(p.requests, 3);
        assert_eq!(p.successes, 2);
        assert!((p.total_revenue - 4.0).abs() < 1e-9);
        assert!((p.success_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_network_reads_as_zero() {
        let ledger = PerfLedger::new();
        let p = ledger.get("medianet");
        assert_eq!(p.requests, 0);
        assert_eq!(p.success_rate(), 0.0);
    }
}
