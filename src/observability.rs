use std::net::SocketAddr;
use std::time::Duration;

use crate::model::Slot;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: slot queries served. Labels: mode, status.
pub const SLOT_QUERIES_TOTAL: &str = "openslot_slot_queries_total";

/// Histogram: slot query latency in seconds. Labels: mode.
pub const SLOT_QUERY_DURATION_SECONDS: &str = "openslot_slot_query_duration_seconds";

/// Histogram: slots returned per query. Labels: mode.
pub const SLOTS_PER_QUERY: &str = "openslot_slots_per_query";

// ── Write-path metrics ──────────────────────────────────────────

/// Counter: reservations rejected by the ledger's overlap check.
pub const RESERVE_CONFLICTS_TOTAL: &str = "openslot_reserve_conflicts_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Record one slot query. `slots` is `None` when the directory failed.
pub(crate) fn record_query(mode: &'static str, elapsed: Duration, slots: Option<&[Slot]>) {
    let status = if slots.is_some() { "ok" } else { "error" };
    metrics::counter!(SLOT_QUERIES_TOTAL, "mode" => mode, "status" => status).increment(1);
    metrics::histogram!(SLOT_QUERY_DURATION_SECONDS, "mode" => mode).record(elapsed.as_secs_f64());
    if let Some(slots) = slots {
        metrics::histogram!(SLOTS_PER_QUERY, "mode" => mode).record(slots.len() as f64);
    }
}
