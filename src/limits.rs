use crate::model::Ms;

/// 2000-01-01T00:00:00 in ms.
pub const MIN_VALID_TIMESTAMP_MS: Ms = 946_684_800_000;

/// 2100-01-01T00:00:00 in ms.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 4_102_444_800_000;

/// A single booking may not span more than 31 days.
pub const MAX_SPAN_DURATION_MS: Ms = 31 * 24 * 3_600_000;

/// Default row cap for one allocation fetch.
pub const DEFAULT_MAX_ALLOCATIONS: usize = 10_000;

/// Default allocation fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;

/// Smallest grid step a timeline window accepts.
pub const MIN_INTERVAL_MINUTES: f64 = 5.0;

/// Longest tenant name a source accepts.
pub const MAX_TENANT_NAME_LEN: usize = 128;

/// Most roster rules one day board expands.
pub const MAX_ROSTER_RULES: usize = 10_000;
