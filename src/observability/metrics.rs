//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define connectivity metrics (mode, probes, failures, transitions)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `codex_connectivity_mode` (gauge): 1=real, 0=mock, per domain
//! - `codex_probe_total` (counter): probes by domain and result
//! - `codex_probe_duration_seconds` (histogram): probe latency
//! - `codex_consecutive_failures` (gauge): current failure streak
//! - `codex_mode_transitions_total` (counter): flips by domain and target mode
//! - `codex_feed_requests_total` (counter): feed reads by domain and source
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library users
//!   and tests pay nothing
//! - Labels are domain names, never URLs

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::connectivity::Mode;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one probe. `failure` is the error kind, `None` on success.
pub fn record_probe(domain: &str, failure: Option<&'static str>, started: Instant) {
    let result = failure.unwrap_or("success");
    counter!("codex_probe_total", "domain" => domain.to_string(), "result" => result).increment(1);
    histogram!("codex_probe_duration_seconds", "domain" => domain.to_string())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_mode(domain: &str, mode: Mode) {
    let value = match mode {
        Mode::Real => 1.0,
        Mode::Mock => 0.0,
    };
    gauge!("codex_connectivity_mode", "domain" => domain.to_string()).set(value);
}

pub fn record_failures(domain: &str, failures: u32) {
    gauge!("codex_consecutive_failures", "domain" => domain.to_string()).set(f64::from(failures));
}

pub fn record_transition(domain: &str, to: Mode) {
    counter!(
        "codex_mode_transitions_total",
        "domain" => domain.to_string(),
        "to" => to.as_str()
    )
    .increment(1);
}

pub fn record_feed_request(domain: &str, source: &'static str) {
    counter!(
        "codex_feed_requests_total",
        "domain" => domain.to_string(),
        "source" => source
    )
    .increment(1);
}
