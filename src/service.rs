use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};
use ulid::Ulid;

use crate::config::ServiceConfig;
use crate::engine::*;
use crate::limits::MAX_ROSTER_RULES;
use crate::model::*;
use crate::observability::*;
use crate::roster::{duty_spans, expand_for_day};
use crate::source::{AllocationQuery, AllocationSource};

/// One resource row of the scheduler/roster board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardRow {
    pub kind: ResourceKind,
    pub resource_id: ResourceId,
    pub bookings: RowLayout,
    /// Rostered duty time, instructors only.
    pub duty: Vec<Placement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBoard {
    pub window: TimelineWindow,
    pub slots: Vec<Slot>,
    /// Aircraft rows first, then instructors, each sorted by id.
    pub rows: Vec<BoardRow>,
}

/// Fetch-then-compute front for the pure engine.
///
/// Every fetch is bounded by the configured row limit and timeout; a failed
/// fetch is returned as-is and the engine never runs on partial data.
pub struct SchedulingService<S> {
    source: S,
    config: ServiceConfig,
}

impl<S: AllocationSource> SchedulingService<S> {
    pub fn new(source: S, config: ServiceConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn window_for(&self, day: NaiveDate) -> TimelineWindow {
        TimelineWindow::new(day, &self.config.window)
    }

    /// Active bookings overlapping `span`.
    async fn fetch(&self, tenant: &str, span: Span) -> Result<Vec<BookingRecord>, EngineError> {
        let query = AllocationQuery {
            tenant: tenant.to_string(),
            span,
            statuses: self.config.active_statuses.clone(),
            // One extra row tells "exactly at the limit" from "over it".
            limit: self.config.max_allocations.saturating_add(1),
        };
        let timeout = self.config.fetch_timeout();

        let started = Instant::now();
        let result = tokio::time::timeout(timeout, self.source.fetch(&query)).await;
        metrics::histogram!(FETCH_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        let rows = match result {
            Err(_) => {
                warn!(tenant, "allocation fetch timed out after {}ms", timeout.as_millis());
                metrics::counter!(FETCH_FAILURES_TOTAL, "reason" => "timeout").increment(1);
                return Err(EngineError::FetchTimedOut(timeout));
            }
            Ok(Err(e)) => {
                warn!(tenant, "allocation fetch failed: {e}");
                metrics::counter!(FETCH_FAILURES_TOTAL, "reason" => "source").increment(1);
                return Err(EngineError::FetchFailed(e.to_string()));
            }
            Ok(Ok(rows)) => rows,
        };
        metrics::histogram!(FETCH_ROWS).record(rows.len() as f64);

        let fetched = rows.len();
        let records: Vec<BookingRecord> = rows.into_iter().filter(|r| query.matches(r)).collect();
        if records.len() != fetched {
            debug!(tenant, dropped = fetched - records.len(), "source returned rows outside the query");
        }
        if records.len() > self.config.max_allocations {
            return Err(EngineError::LimitExceeded("too many allocations in range"));
        }
        Ok(records)
    }

    async fn fetch_allocations(&self, tenant: &str, span: Span) -> Result<Vec<Allocation>, EngineError> {
        let records = self.fetch(tenant, span).await?;
        Ok(records.into_iter().map(|r| r.allocation).collect())
    }

    /// Aircraft and instructors a booking over `candidate` cannot use.
    pub async fn unavailable_resources(
        &self,
        tenant: &str,
        candidate: Span,
        exclude: Option<Ulid>,
    ) -> Result<Unavailable, EngineError> {
        let result = self.check_candidate(tenant, candidate, exclude).await;
        match &result {
            Ok(unavailable) => {
                metrics::counter!(CONFLICT_CHECKS_TOTAL, "status" => "ok").increment(1);
                metrics::histogram!(UNAVAILABLE_RESOURCES)
                    .record((unavailable.aircraft.len() + unavailable.instructors.len()) as f64);
            }
            Err(e) => {
                metrics::counter!(CONFLICT_CHECKS_TOTAL, "status" => error_label(e)).increment(1);
            }
        }
        result
    }

    async fn check_candidate(
        &self,
        tenant: &str,
        candidate: Span,
        exclude: Option<Ulid>,
    ) -> Result<Unavailable, EngineError> {
        validate_span(&candidate)?;
        let allocations = self.fetch_allocations(tenant, candidate).await?;
        resolve_conflicts(&candidate, &allocations, exclude)
    }

    /// Ids of the bookings a candidate clashes with.
    pub async fn clashes(
        &self,
        tenant: &str,
        candidate: Span,
        exclude: Option<Ulid>,
    ) -> Result<Vec<Ulid>, EngineError> {
        validate_span(&candidate)?;
        let allocations = self.fetch_allocations(tenant, candidate).await?;
        conflicting_allocations(&candidate, &allocations, exclude)
    }

    /// Slots plus one laid-out row per aircraft and per instructor.
    ///
    /// Instructors appear when they have a booking or a roster block that day.
    pub async fn day_board(
        &self,
        tenant: &str,
        day: NaiveDate,
        roster: &[RosterRule],
    ) -> Result<DayBoard, EngineError> {
        if roster.len() > MAX_ROSTER_RULES {
            return Err(EngineError::LimitExceeded("too many roster rules"));
        }
        let window = self.window_for(day);
        let records = self.fetch(tenant, window.span()).await?;
        let roster_blocks = expand_for_day(roster, day);

        let mut aircraft: BTreeMap<&str, Vec<Block>> = BTreeMap::new();
        let mut instructors: BTreeMap<&str, Vec<Block>> = BTreeMap::new();
        for record in &records {
            let a = &record.allocation;
            let block = Block {
                id: a.id,
                span: a.span,
                label: record.label.clone(),
            };
            if let Some(id) = a.aircraft_id.as_deref() {
                aircraft.entry(id).or_default().push(block.clone());
            }
            if let Some(id) = a.instructor_id.as_deref() {
                instructors.entry(id).or_default().push(block);
            }
        }
        for b in &roster_blocks {
            instructors.entry(b.instructor_id.as_str()).or_default();
        }

        let mut rows = Vec::with_capacity(aircraft.len() + instructors.len());
        for (id, blocks) in &aircraft {
            rows.push(BoardRow {
                kind: ResourceKind::Aircraft,
                resource_id: id.to_string(),
                bookings: layout_row(&window, blocks),
                duty: Vec::new(),
            });
        }
        for (id, blocks) in &instructors {
            rows.push(BoardRow {
                kind: ResourceKind::Instructor,
                resource_id: id.to_string(),
                bookings: layout_row(&window, blocks),
                duty: duty_spans(&roster_blocks, id)
                    .iter()
                    .filter_map(|s| window.place(s))
                    .collect(),
            });
        }

        metrics::counter!(BOARDS_TOTAL).increment(1);
        debug!(tenant, %day, bookings = records.len(), rows = rows.len(), "laid out day board");
        Ok(DayBoard {
            window,
            slots: build_slots(&window).collect(),
            rows,
        })
    }

    /// Free time of one resource within the day's window.
    ///
    /// With `roster`, an instructor is only free while rostered on.
    pub async fn free_spans(
        &self,
        tenant: &str,
        kind: ResourceKind,
        resource_id: &str,
        day: NaiveDate,
        roster: Option<&[RosterRule]>,
    ) -> Result<Vec<Span>, EngineError> {
        let window = self.window_for(day);
        let allocations = self.fetch_allocations(tenant, window.span()).await?;
        let duty = match (kind, roster) {
            (ResourceKind::Instructor, Some(rules)) => {
                Some(duty_spans(&expand_for_day(rules, day), resource_id))
            }
            _ => None,
        };
        Ok(resource_free_spans(
            kind,
            resource_id,
            &window.span(),
            &allocations,
            duty.as_deref(),
        ))
    }
}
