use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: conflict checks run. Labels: status.
pub const CONFLICT_CHECKS_TOTAL: &str = "flightboard_conflict_checks_total";

/// Histogram: resources reported unavailable per conflict check.
pub const UNAVAILABLE_RESOURCES: &str = "flightboard_unavailable_resources";

/// Counter: day boards laid out.
pub const BOARDS_TOTAL: &str = "flightboard_boards_total";

// ── Allocation fetch ────────────────────────────────────────────

/// Histogram: allocation fetch duration in seconds.
pub const FETCH_DURATION_SECONDS: &str = "flightboard_fetch_duration_seconds";

/// Counter: failed allocation fetches. Labels: reason.
pub const FETCH_FAILURES_TOTAL: &str = "flightboard_fetch_failures_total";

/// Histogram: rows returned per allocation fetch.
pub const FETCH_ROWS: &str = "flightboard_fetch_rows";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Short label for a failed request, for metrics.
pub fn error_label(err: &crate::engine::EngineError) -> &'static str {
    use crate::engine::EngineError;
    match err {
        EngineError::InvalidInterval { .. } => "invalid_interval",
        EngineError::LimitExceeded(_) => "limit_exceeded",
        EngineError::FetchFailed(_) => "fetch_failed",
        EngineError::FetchTimedOut(_) => "fetch_timed_out",
    }
}
