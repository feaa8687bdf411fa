use crate::model::*;

// ── Free-time algebra ─────────────────────────────────────────────

/// Merge sorted overlapping/adjacent intervals into disjoint intervals.
pub fn merge_overlapping(sorted: &[Span]) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::new();
    for &span in sorted {
        if let Some(last) = merged.last_mut()
            && span.start <= last.end {
                last.end = last.end.max(span.end);
                continue;
            }
        merged.push(span);
    }
    merged
}

/// Remove `to_remove` from `base`. Both inputs sorted by start and disjoint.
pub fn subtract_intervals(base: &[Span], to_remove: &[Span]) -> Vec<Span> {
    let mut result = Vec::new();
    let mut ri = 0;

    for &b in base {
        let mut current_start = b.start;
        let current_end = b.end;

        while ri < to_remove.len() && to_remove[ri].end <= current_start {
            ri += 1;
        }

        let mut j = ri;
        while j < to_remove.len() && to_remove[j].start < current_end {
            let r = &to_remove[j];
            if r.start > current_start {
                result.push(Span::new(current_start, r.start));
            }
            current_start = current_start.max(r.end);
            j += 1;
        }

        if current_start < current_end {
            result.push(Span::new(current_start, current_end));
        }
    }

    result
}

/// Gaps inside `window` not covered by any of `busy`.
///
/// `busy` may be unsorted and may stick out of the window; invalid spans are ignored.
pub fn free_spans(window: &Span, busy: &[Span]) -> Vec<Span> {
    free_within(&[*window], window, busy)
}

/// Free time of one resource inside `window`.
///
/// With `duty` (an instructor's rostered spans) the resource is only free while
/// on duty; without it the whole window is the base.
pub fn resource_free_spans(
    kind: ResourceKind,
    resource_id: &str,
    window: &Span,
    allocations: &[Allocation],
    duty: Option<&[Span]>,
) -> Vec<Span> {
    let busy: Vec<Span> = allocations
        .iter()
        .filter(|a| a.resource_id(kind) == Some(resource_id))
        .map(|a| a.span)
        .collect();

    match duty {
        Some(duty) => free_within(duty, window, &busy),
        None => free_spans(window, &busy),
    }
}

fn free_within(base: &[Span], window: &Span, busy: &[Span]) -> Vec<Span> {
    let mut base: Vec<Span> = base.iter().filter_map(|s| s.clamp_to(window)).collect();
    base.sort_by_key(|s| s.start);
    let base = merge_overlapping(&base);

    let mut blocked: Vec<Span> = busy.iter().filter_map(|s| s.clamp_to(window)).collect();
    if blocked.is_empty() {
        return base;
    }
    blocked.sort_by_key(|s| s.start);
    subtract_intervals(&base, &merge_overlapping(&blocked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    const H: Ms = HOUR_MS;
    const M: Ms = MINUTE_MS;

    fn booking(aircraft: Option<&str>, instructor: Option<&str>, start: Ms, end: Ms) -> Allocation {
        Allocation {
            id: Ulid::new(),
            aircraft_id: aircraft.map(String::from),
            instructor_id: instructor.map(String::from),
            span: Span::new(start, end),
        }
    }

    // ── subtract_intervals ────────────────────────────────

    #[test]
    fn subtract_no_overlap() {
        let base = vec![Span::new(100, 200), Span::new(300, 400)];
        let remove = vec![Span::new(200, 300)];
        let result = subtract_intervals(&base, &remove);
        assert_eq!(result, base);
    }

    #[test]
    fn subtract_full_overlap() {
        let base = vec![Span::new(100, 200)];
        let remove = vec![Span::new(50, 250)];
        let result = subtract_intervals(&base, &remove);
        assert!(result.is_empty());
    }

    #[test]
    fn subtract_middle_punch() {
        let base = vec![Span::new(100, 300)];
        let remove = vec![Span::new(150, 200)];
        let result = subtract_intervals(&base, &remove);
        assert_eq!(result, vec![Span::new(100, 150), Span::new(200, 300)]);
    }

    #[test]
    fn subtract_multiple_punches() {
        let base = vec![Span::new(0, 1000)];
        let remove = vec![
            Span::new(100, 200),
            Span::new(400, 500),
            Span::new(800, 900),
        ];
        let result = subtract_intervals(&base, &remove);
        assert_eq!(
            result,
            vec![
                Span::new(0, 100),
                Span::new(200, 400),
                Span::new(500, 800),
                Span::new(900, 1000),
            ]
        );
    }

    // ── merge_overlapping ────────────────────────────────

    #[test]
    fn merge_overlapping_basic() {
        let spans = vec![
            Span::new(100, 300),
            Span::new(200, 400),
            Span::new(500, 600),
        ];
        let merged = merge_overlapping(&spans);
        assert_eq!(merged, vec![Span::new(100, 400), Span::new(500, 600)]);
    }

    #[test]
    fn merge_overlapping_adjacent() {
        let spans = vec![Span::new(100, 200), Span::new(200, 300)];
        let merged = merge_overlapping(&spans);
        assert_eq!(merged, vec![Span::new(100, 300)]);
    }

    // ── free_spans ───────────────────────────────────────

    #[test]
    fn free_spans_without_busy_is_whole_window() {
        let window = Span::new(8 * H, 17 * H);
        assert_eq!(free_spans(&window, &[]), vec![window]);
    }

    #[test]
    fn free_spans_unsorted_busy_outside_window() {
        let window = Span::new(8 * H, 17 * H);
        let busy = vec![
            Span::new(16 * H, 18 * H),
            Span::new(7 * H, 9 * H),
            Span::new(12 * H, 13 * H),
        ];
        assert_eq!(
            free_spans(&window, &busy),
            vec![Span::new(9 * H, 12 * H), Span::new(13 * H, 16 * H)]
        );
    }

    #[test]
    fn back_to_back_bookings_leave_no_gap() {
        let window = Span::new(8 * H, 12 * H);
        let busy = vec![Span::new(9 * H, 10 * H), Span::new(10 * H, 11 * H)];
        assert_eq!(
            free_spans(&window, &busy),
            vec![Span::new(8 * H, 9 * H), Span::new(11 * H, 12 * H)]
        );
    }

    #[test]
    fn resource_free_spans_filters_by_resource() {
        let window = Span::new(8 * H, 12 * H);
        let allocs = vec![
            booking(Some("VH-ABC"), Some("I1"), 9 * H, 10 * H),
            booking(Some("VH-XYZ"), Some("I2"), 10 * H, 11 * H),
        ];
        let free = resource_free_spans(ResourceKind::Aircraft, "VH-ABC", &window, &allocs, None);
        assert_eq!(free, vec![Span::new(8 * H, 9 * H), Span::new(10 * H, 12 * H)]);

        let free = resource_free_spans(ResourceKind::Instructor, "I2", &window, &allocs, None);
        assert_eq!(free, vec![Span::new(8 * H, 10 * H), Span::new(11 * H, 12 * H)]);
    }

    #[test]
    fn instructor_only_free_while_on_duty() {
        let window = Span::new(8 * H, 18 * H);
        let duty = vec![Span::new(9 * H, 13 * H), Span::new(14 * H, 17 * H)];
        let allocs = vec![booking(Some("VH-ABC"), Some("I1"), 10 * H, 11 * H + 30 * M)];
        let free =
            resource_free_spans(ResourceKind::Instructor, "I1", &window, &allocs, Some(&duty));
        assert_eq!(
            free,
            vec![
                Span::new(9 * H, 10 * H),
                Span::new(11 * H + 30 * M, 13 * H),
                Span::new(14 * H, 17 * H),
            ]
        );
    }

    #[test]
    fn empty_duty_means_never_free() {
        let window = Span::new(8 * H, 18 * H);
        let free = resource_free_spans(ResourceKind::Instructor, "I1", &window, &[], Some(&[]));
        assert!(free.is_empty());
    }
}
