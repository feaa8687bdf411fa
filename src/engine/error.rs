use std::time::Duration;

use crate::model::Ms;

#[derive(Debug)]
pub enum EngineError {
    /// Candidate interval with `start >= end`. Callers must surface this,
    /// never read it as "no conflicts".
    InvalidInterval { start: Ms, end: Ms },
    LimitExceeded(&'static str),
    FetchFailed(String),
    FetchTimedOut(Duration),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidInterval { start, end } => {
                write!(f, "invalid interval [{start}, {end}): end time must be after start time")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::FetchFailed(e) => write!(f, "allocation fetch failed: {e}"),
            EngineError::FetchTimedOut(after) => {
                write!(f, "allocation fetch timed out after {}ms", after.as_millis())
            }
        }
    }
}

impl std::error::Error for EngineError {}
