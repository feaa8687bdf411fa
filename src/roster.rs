use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use ulid::Ulid;

use crate::model::*;

/// A roster rule anchored on a concrete day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterBlock {
    pub rule_id: Ulid,
    pub instructor_id: ResourceId,
    pub span: Span,
}

/// Roster blocks for `day`: every rule whose weekday matches, sorted by
/// instructor then start. Rules with `start >= end` are skipped.
pub fn expand_for_day(rules: &[RosterRule], day: NaiveDate) -> Vec<RosterBlock> {
    let weekday = day.weekday();
    let mut blocks: Vec<RosterBlock> = rules
        .iter()
        .filter(|r| r.weekday == weekday)
        .filter_map(|r| {
            let span = Span::try_new(at(day, r.start), at(day, r.end));
            if span.is_none() {
                tracing::debug!(rule = %r.id, instructor = %r.instructor_id, "skipping empty roster rule");
            }
            span.map(|span| RosterBlock {
                rule_id: r.id,
                instructor_id: r.instructor_id.clone(),
                span,
            })
        })
        .collect();
    blocks.sort_by(|a, b| {
        a.instructor_id
            .cmp(&b.instructor_id)
            .then(a.span.start.cmp(&b.span.start))
    });
    blocks
}

/// Duty spans of one instructor, in start order.
pub fn duty_spans(blocks: &[RosterBlock], instructor_id: &str) -> Vec<Span> {
    blocks
        .iter()
        .filter(|b| b.instructor_id == instructor_id)
        .map(|b| b.span)
        .collect()
}
