use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
///
/// Every instant reaching this crate is already resolved to one zone; calendar
/// values are mapped onto the timeline with naive arithmetic.
pub type Ms = i64;

pub const HOUR_MS: Ms = 3_600_000;
pub const MINUTE_MS: Ms = 60_000;

/// Instant of `time` on `day`.
pub fn at(day: NaiveDate, time: NaiveTime) -> Ms {
    NaiveDateTime::new(day, time).and_utc().timestamp_millis()
}

/// Midnight at the start of `day`.
pub fn day_start(day: NaiveDate) -> Ms {
    at(day, NaiveTime::MIN)
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    /// `None` for empty or inverted input.
    pub fn try_new(start: Ms, end: Ms) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    /// Strict overlap: spans that only touch at an endpoint do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Intersection with `bounds`, `None` when nothing is left.
    pub fn clamp_to(&self, bounds: &Span) -> Option<Span> {
        Span::try_new(self.start.max(bounds.start), self.end.min(bounds.end))
    }
}

/// Opaque aircraft or instructor identifier.
pub type ResourceId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Aircraft,
    Instructor,
}

/// A committed booking of up to one aircraft and one instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: Ulid,
    #[serde(default)]
    pub aircraft_id: Option<ResourceId>,
    #[serde(default)]
    pub instructor_id: Option<ResourceId>,
    pub span: Span,
}

impl Allocation {
    pub fn resource_id(&self, kind: ResourceKind) -> Option<&str> {
        match kind {
            ResourceKind::Aircraft => self.aircraft_id.as_deref(),
            ResourceKind::Instructor => self.instructor_id.as_deref(),
        }
    }
}

/// Booking lifecycle as stored by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Unconfirmed,
    Confirmed,
    Flying,
    Complete,
    Cancelled,
    Rejected,
}

/// Statuses that hold their resources for conflict purposes.
pub const ACTIVE_BOOKING_STATUSES: &[BookingStatus] = &[
    BookingStatus::Unconfirmed,
    BookingStatus::Confirmed,
    BookingStatus::Flying,
    BookingStatus::Complete,
];

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Rejected)
    }
}

/// A stored booking as handed over by an allocation source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(flatten)]
    pub allocation: Allocation,
    pub status: BookingStatus,
    #[serde(default)]
    pub label: Option<String>,
}

/// Resources already committed during a candidate interval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Unavailable {
    pub aircraft: HashSet<ResourceId>,
    pub instructors: HashSet<ResourceId>,
}

impl Unavailable {
    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty() && self.instructors.is_empty()
    }

    pub fn contains(&self, kind: ResourceKind, id: &str) -> bool {
        match kind {
            ResourceKind::Aircraft => self.aircraft.contains(id),
            ResourceKind::Instructor => self.instructors.contains(id),
        }
    }
}

/// Start of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start: Ms,
}

impl Slot {
    /// Header label, `HH:MM`.
    pub fn label(&self) -> String {
        DateTime::from_timestamp_millis(self.start)
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_default()
    }
}

/// Position of an interval inside a window, as fractions of the window length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub left_fraction: f64,
    pub width_fraction: f64,
}

/// Weekly duty period for an instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRule {
    pub id: Ulid,
    pub instructor_id: ResourceId,
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let s = Span::new(100, 200);
        assert_eq!(s.duration_ms(), 100);
        assert!(s.contains_instant(100));
        assert!(s.contains_instant(199));
        assert!(!s.contains_instant(200)); // half-open
    }

    #[test]
    fn span_overlap() {
        let a = Span::new(100, 200);
        let b = Span::new(150, 250);
        let c = Span::new(200, 300);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn span_contains_span() {
        let outer = Span::new(100, 400);
        let inner = Span::new(150, 300);
        let partial = Span::new(50, 200);
        assert!(outer.contains_span(&inner));
        assert!(outer.contains_span(&outer));
        assert!(!outer.contains_span(&partial));
    }

    #[test]
    fn try_new_rejects_empty_and_inverted() {
        assert!(Span::try_new(100, 100).is_none());
        assert!(Span::try_new(200, 100).is_none());
        assert_eq!(Span::try_new(100, 101), Some(Span::new(100, 101)));
    }

    #[test]
    fn clamp_to_bounds() {
        let bounds = Span::new(100, 200);
        assert_eq!(Span::new(50, 150).clamp_to(&bounds), Some(Span::new(100, 150)));
        assert_eq!(Span::new(0, 100).clamp_to(&bounds), None);
        assert_eq!(Span::new(0, 1000).clamp_to(&bounds), Some(bounds));
    }

    #[test]
    fn terminal_statuses_are_not_active() {
        for status in ACTIVE_BOOKING_STATUSES {
            assert!(!status.is_terminal());
        }
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Rejected.is_terminal());
    }

    #[test]
    fn slot_label_is_hours_and_minutes() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let slot = Slot {
            start: day_start(day) + 9 * HOUR_MS + 30 * MINUTE_MS,
        };
        assert_eq!(slot.label(), "09:30");
    }

    #[test]
    fn allocation_resource_lookup() {
        let a = Allocation {
            id: Ulid::new(),
            aircraft_id: Some("VH-ABC".into()),
            instructor_id: None,
            span: Span::new(0, 100),
        };
        assert_eq!(a.resource_id(ResourceKind::Aircraft), Some("VH-ABC"));
        assert_eq!(a.resource_id(ResourceKind::Instructor), None);
    }

    #[test]
    fn booking_record_json_shape() {
        let json = r#"{
            "id": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "aircraft_id": "VH-ABC",
            "span": {"start": 0, "end": 3600000},
            "status": "confirmed"
        }"#;
        let record: BookingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, BookingStatus::Confirmed);
        assert_eq!(record.allocation.aircraft_id.as_deref(), Some("VH-ABC"));
        assert!(record.allocation.instructor_id.is_none());
        assert!(record.label.is_none());
    }
}
