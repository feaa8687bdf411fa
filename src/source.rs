use async_trait::async_trait;
use dashmap::DashMap;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

/// One bounded fetch of bookings for a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationQuery {
    pub tenant: String,
    /// Rows must overlap this span.
    pub span: Span,
    /// Rows must have one of these statuses.
    pub statuses: Vec<BookingStatus>,
    /// Return at most this many rows.
    pub limit: usize,
}

impl AllocationQuery {
    pub fn matches(&self, record: &BookingRecord) -> bool {
        self.statuses.contains(&record.status) && record.allocation.span.overlaps(&self.span)
    }
}

#[derive(Debug)]
pub enum SourceError {
    Unavailable(String),
    InvalidQuery(&'static str),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Unavailable(e) => write!(f, "source unavailable: {e}"),
            SourceError::InvalidQuery(msg) => write!(f, "invalid query: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// The storage collaborator: executes a filtered query and returns rows or fails.
#[async_trait]
pub trait AllocationSource: Send + Sync {
    async fn fetch(&self, query: &AllocationQuery) -> Result<Vec<BookingRecord>, SourceError>;
}

/// Tenant-scoped bookings held in memory. Each tenant's rows are kept sorted
/// by start so a fetch can stop at the first row starting past the query.
pub struct InMemorySource {
    tenants: DashMap<String, Vec<BookingRecord>>,
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySource {
    pub fn new() -> Self {
        Self {
            tenants: DashMap::new(),
        }
    }

    /// Insert or replace a booking (matched by allocation id).
    pub fn insert(&self, tenant: &str, record: BookingRecord) {
        let mut rows = self.tenants.entry(tenant.to_string()).or_default();
        rows.retain(|r| r.allocation.id != record.allocation.id);
        let pos = rows.partition_point(|r| r.allocation.span.start <= record.allocation.span.start);
        rows.insert(pos, record);
    }

    pub fn remove(&self, tenant: &str, id: Ulid) -> Option<BookingRecord> {
        let mut rows = self.tenants.get_mut(tenant)?;
        let pos = rows.iter().position(|r| r.allocation.id == id)?;
        Some(rows.remove(pos))
    }

    pub fn len(&self, tenant: &str) -> usize {
        self.tenants.get(tenant).map_or(0, |rows| rows.len())
    }

    pub fn is_empty(&self, tenant: &str) -> bool {
        self.len(tenant) == 0
    }
}

#[async_trait]
impl AllocationSource for InMemorySource {
    async fn fetch(&self, query: &AllocationQuery) -> Result<Vec<BookingRecord>, SourceError> {
        if query.tenant.is_empty() {
            return Err(SourceError::InvalidQuery("empty tenant name"));
        }
        if query.tenant.len() > MAX_TENANT_NAME_LEN {
            return Err(SourceError::InvalidQuery("tenant name too long"));
        }
        let Some(rows) = self.tenants.get(&query.tenant) else {
            return Ok(Vec::new());
        };
        // Everything at index >= right_bound starts at or after query.end.
        let right_bound = rows.partition_point(|r| r.allocation.span.start < query.span.end);
        Ok(rows[..right_bound]
            .iter()
            .filter(|r| query.matches(r))
            .take(query.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: Ms = HOUR_MS;

    fn record(aircraft: &str, start: Ms, end: Ms, status: BookingStatus) -> BookingRecord {
        BookingRecord {
            allocation: Allocation {
                id: Ulid::new(),
                aircraft_id: Some(aircraft.into()),
                instructor_id: None,
                span: Span::new(start, end),
            },
            status,
            label: None,
        }
    }

    fn query(tenant: &str, start: Ms, end: Ms) -> AllocationQuery {
        AllocationQuery {
            tenant: tenant.into(),
            span: Span::new(start, end),
            statuses: ACTIVE_BOOKING_STATUSES.to_vec(),
            limit: 100,
        }
    }

    #[tokio::test]
    async fn fetch_filters_span_and_status() {
        let source = InMemorySource::new();
        source.insert("club", record("P1", 9 * H, 10 * H, BookingStatus::Confirmed));
        source.insert("club", record("P2", 10 * H, 11 * H, BookingStatus::Cancelled));
        source.insert("club", record("P3", 11 * H, 12 * H, BookingStatus::Unconfirmed));
        source.insert("club", record("P4", 12 * H, 13 * H, BookingStatus::Confirmed));

        let rows = source.fetch(&query("club", 9 * H + 30 * 60_000, 12 * H)).await.unwrap();
        let ids: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.allocation.aircraft_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["P1", "P3"]);
    }

    #[tokio::test]
    async fn tenants_are_isolated() {
        let source = InMemorySource::new();
        source.insert("club_a", record("P1", 9 * H, 10 * H, BookingStatus::Confirmed));

        let rows = source.fetch(&query("club_b", 0, 24 * H)).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(source.len("club_a"), 1);
        assert!(source.is_empty("club_b"));
    }

    #[tokio::test]
    async fn fetch_respects_limit() {
        let source = InMemorySource::new();
        for i in 0..10 {
            source.insert("club", record("P1", i * H, i * H + H, BookingStatus::Confirmed));
        }
        let mut q = query("club", 0, 24 * H);
        q.limit = 3;
        let rows = source.fetch(&q).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].allocation.span.start, 0);
    }

    #[tokio::test]
    async fn insert_replaces_same_id_and_keeps_order() {
        let source = InMemorySource::new();
        let mut r = record("P1", 12 * H, 13 * H, BookingStatus::Confirmed);
        source.insert("club", r.clone());
        source.insert("club", record("P2", 10 * H, 11 * H, BookingStatus::Confirmed));

        r.allocation.span = Span::new(8 * H, 9 * H);
        source.insert("club", r.clone());
        assert_eq!(source.len("club"), 2);

        let rows = source.fetch(&query("club", 0, 24 * H)).await.unwrap();
        assert_eq!(rows[0].allocation.id, r.allocation.id);

        assert!(source.remove("club", r.allocation.id).is_some());
        assert!(source.remove("club", r.allocation.id).is_none());
        assert_eq!(source.len("club"), 1);
    }

    #[tokio::test]
    async fn empty_tenant_name_rejected() {
        let source = InMemorySource::new();
        let result = source.fetch(&query("", 0, H)).await;
        assert!(matches!(result, Err(SourceError::InvalidQuery(_))));
    }
}
