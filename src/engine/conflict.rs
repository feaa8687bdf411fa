use ulid::Ulid;

use crate::model::*;

use super::EngineError;

/// Reject empty or inverted candidates.
pub fn validate_interval(span: &Span) -> Result<(), EngineError> {
    if !span.is_valid() {
        return Err(EngineError::InvalidInterval {
            start: span.start,
            end: span.end,
        });
    }
    Ok(())
}

/// `validate_interval` plus the timestamp and width limits applied to caller input.
pub fn validate_span(span: &Span) -> Result<(), EngineError> {
    use crate::limits::*;
    validate_interval(span)?;
    if span.start < MIN_VALID_TIMESTAMP_MS || span.end > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::LimitExceeded("timestamp out of range"));
    }
    if span.duration_ms() > MAX_SPAN_DURATION_MS {
        return Err(EngineError::LimitExceeded("span too wide"));
    }
    Ok(())
}

/// Allocations that hold a resource during `candidate`, skipping `exclude`.
fn conflicting<'a>(
    candidate: &'a Span,
    allocations: &'a [Allocation],
    exclude: Option<Ulid>,
) -> impl Iterator<Item = &'a Allocation> {
    allocations
        .iter()
        .filter(move |a| Some(a.id) != exclude)
        .filter(move |a| a.span.overlaps(candidate))
}

/// Aircraft and instructors already committed during `candidate`.
///
/// `exclude` is the booking being edited, so it never conflicts with itself.
/// Allocations that merely touch the candidate (one ends exactly when the other
/// starts) do not conflict.
pub fn resolve_conflicts(
    candidate: &Span,
    allocations: &[Allocation],
    exclude: Option<Ulid>,
) -> Result<Unavailable, EngineError> {
    validate_interval(candidate)?;

    let mut unavailable = Unavailable::default();
    for alloc in conflicting(candidate, allocations, exclude) {
        if let Some(id) = &alloc.aircraft_id {
            unavailable.aircraft.insert(id.clone());
        }
        if let Some(id) = &alloc.instructor_id {
            unavailable.instructors.insert(id.clone());
        }
    }

    tracing::debug!(
        start = candidate.start,
        end = candidate.end,
        scanned = allocations.len(),
        aircraft = unavailable.aircraft.len(),
        instructors = unavailable.instructors.len(),
        "resolved conflicts"
    );
    Ok(unavailable)
}

/// Ids of the allocations `candidate` clashes with, in input order.
pub fn conflicting_allocations(
    candidate: &Span,
    allocations: &[Allocation],
    exclude: Option<Ulid>,
) -> Result<Vec<Ulid>, EngineError> {
    validate_interval(candidate)?;
    Ok(conflicting(candidate, allocations, exclude).map(|a| a.id).collect())
}
