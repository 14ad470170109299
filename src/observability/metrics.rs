//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by route, status
//! - `relay_request_duration_seconds` (histogram): handler latency by route
//! - `relay_ledger_calls_total` (counter): contract calls by op, outcome
//! - `relay_ledger_call_duration_seconds` (histogram): contract call latency
//! - `relay_otp_outcomes_total` (counter): issued / valid / invalid / fault
//! - `relay_ledger_health` (gauge): 1=reachable, 0=unreachable
//!
//! Without an installed recorder every update is a no-op, so handlers and
//! tests can call these unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome of one OTP operation, as counted in `relay_otp_outcomes_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpOutcome {
    Issued,
    Valid,
    Invalid,
    Fault,
}

impl OtpOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpOutcome::Issued => "issued",
            OtpOutcome::Valid => "valid",
            OtpOutcome::Invalid => "invalid",
            OtpOutcome::Fault => "fault",
        }
    }
}

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder"),
    }
}

/// Record one handled HTTP request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    let route = route.to_string();
    metrics::counter!(
        "relay_requests_total",
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record one contract call submitted through the transactor.
pub fn record_ledger_call(op: &str, ok: bool, start: Instant) {
    let op = op.to_string();
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("relay_ledger_calls_total", "op" => op.clone(), "outcome" => outcome)
        .increment(1);
    metrics::histogram!("relay_ledger_call_duration_seconds", "op" => op)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_otp_outcome(outcome: OtpOutcome) {
    metrics::counter!("relay_otp_outcomes_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_ledger_health(reachable: bool) {
    metrics::gauge!("relay_ledger_health").set(if reachable { 1.0 } else { 0.0 });
}
