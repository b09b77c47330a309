//! Metrics collection and exposition.
//!
//! # Metrics
//! - `forward_proxy_requests_total` (counter): requests by method, status, outcome
//! - `forward_proxy_request_duration_seconds` (histogram): latency by method, outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus exporter only runs when an address is configured

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::http::response::ForwardOutcome;

pub const REQUESTS_TOTAL: &str = "forward_proxy_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "forward_proxy_request_duration_seconds";

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(method: &Method, status: StatusCode, outcome: ForwardOutcome, start: Instant) {
    let method = method.to_string();

    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "status" => status.as_u16().to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    metrics::histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method,
        "outcome" => outcome.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}
