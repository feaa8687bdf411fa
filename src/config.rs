use std::time::Duration;

use serde::Deserialize;

use crate::engine::WindowConfig;
use crate::limits::*;
use crate::model::{BookingStatus, ACTIVE_BOOKING_STATUSES};

/// Runtime settings. Read from `FLIGHTBOARD_*` environment variables, or
/// deserialized (any field may be omitted).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub window: WindowConfig,
    pub fetch_timeout_ms: u64,
    pub max_allocations: usize,
    /// Booking statuses that hold a resource.
    pub active_statuses: Vec<BookingStatus>,
    pub metrics_port: Option<u16>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            max_allocations: DEFAULT_MAX_ALLOCATIONS,
            active_statuses: ACTIVE_BOOKING_STATUSES.to_vec(),
            metrics_port: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or unparsable values keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<f64>().ok());

        let window = WindowConfig {
            start_hour: parsed("FLIGHTBOARD_START_HOUR").unwrap_or(defaults.window.start_hour),
            end_hour: parsed("FLIGHTBOARD_END_HOUR").unwrap_or(defaults.window.end_hour),
            interval_minutes: parsed("FLIGHTBOARD_INTERVAL_MINUTES")
                .unwrap_or(defaults.window.interval_minutes),
        };
        let fetch_timeout_ms = lookup("FLIGHTBOARD_FETCH_TIMEOUT_MS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.fetch_timeout_ms);
        let max_allocations = lookup("FLIGHTBOARD_MAX_ALLOCATIONS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_allocations);
        let metrics_port = lookup("FLIGHTBOARD_METRICS_PORT").and_then(|s| s.trim().parse().ok());

        Self {
            window,
            fetch_timeout_ms,
            max_allocations,
            active_statuses: defaults.active_statuses,
            metrics_port,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
