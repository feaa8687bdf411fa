use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::limits::MIN_INTERVAL_MINUTES;
use crate::model::*;

/// Raw window configuration, usually from static config. Never rejected;
/// `TimelineWindow::new` normalizes whatever it gets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub start_hour: f64,
    pub end_hour: f64,
    pub interval_minutes: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start_hour: 6.0,
            end_hour: 22.0,
            interval_minutes: 30.0,
        }
    }
}

/// Visible range of one day: `[start_hour:00, end_hour:00)` stepped by `step_ms`.
///
/// Invariant: `start_hour <= 23`, `start_hour < end_hour <= 24`,
/// `5 minutes <= step_ms <= window length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineWindow {
    day: NaiveDate,
    start_hour: u32,
    end_hour: u32,
    step_ms: Ms,
}

impl TimelineWindow {
    pub fn new(day: NaiveDate, config: &WindowConfig) -> Self {
        let start_hour = if config.start_hour.is_finite() {
            config.start_hour.floor().clamp(0.0, 23.0)
        } else {
            0.0
        };
        let end_hour = if config.end_hour.is_finite() {
            config.end_hour.ceil().clamp(start_hour + 1.0, 24.0)
        } else {
            24.0
        };
        let minutes = if config.interval_minutes.is_finite() {
            config.interval_minutes.max(MIN_INTERVAL_MINUTES)
        } else {
            MIN_INTERVAL_MINUTES
        };

        // A step past the window end still yields the single first slot.
        let window_ms = (end_hour - start_hour) * HOUR_MS as f64;
        let window = Self {
            day,
            start_hour: start_hour as u32,
            end_hour: end_hour as u32,
            step_ms: (minutes * MINUTE_MS as f64).round().min(window_ms) as Ms,
        };
        if window.start_hour as f64 != config.start_hour
            || window.end_hour as f64 != config.end_hour
            || minutes != config.interval_minutes
        {
            tracing::debug!(?config, ?window, "normalized timeline window");
        }
        window
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    pub fn step_ms(&self) -> Ms {
        self.step_ms
    }

    pub fn start_ms(&self) -> Ms {
        day_start(self.day) + self.start_hour as Ms * HOUR_MS
    }

    /// `end_hour == 24` lands on midnight of the following day.
    pub fn end_ms(&self) -> Ms {
        day_start(self.day) + self.end_hour as Ms * HOUR_MS
    }

    pub fn span(&self) -> Span {
        Span::new(self.start_ms(), self.end_ms())
    }

    pub fn place(&self, interval: &Span) -> Option<Placement> {
        compute_placement(interval, self.start_ms(), self.end_ms())
    }
}

/// Grid cells of a window, from its start (inclusive) to its end (exclusive).
///
/// Cloning restarts the sequence from wherever the clone was taken.
#[derive(Debug, Clone)]
pub struct Slots {
    next: Ms,
    end: Ms,
    step: Ms,
}

impl Iterator for Slots {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        if self.next >= self.end {
            return None;
        }
        let slot = Slot { start: self.next };
        self.next = self.next.saturating_add(self.step);
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.next >= self.end {
            0
        } else {
            ((self.end - self.next - 1) / self.step + 1) as usize
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Slots {}

pub fn build_slots(window: &TimelineWindow) -> Slots {
    Slots {
        next: window.start_ms(),
        end: window.end_ms(),
        step: window.step_ms,
    }
}

/// Where `interval` sits inside `[window_start, window_end)`.
///
/// `None` when the window is empty or the interval misses it (touching the
/// window boundary counts as a miss). Fractions are of the window length;
/// `left + width <= 1` by construction.
pub fn compute_placement(interval: &Span, window_start: Ms, window_end: Ms) -> Option<Placement> {
    let duration = window_end.checked_sub(window_start).filter(|d| *d > 0)?;
    let clipped_start = interval.start.max(window_start);
    let clipped_end = interval.end.min(window_end);
    if clipped_end <= clipped_start {
        return None;
    }
    let duration = duration as f64;
    Some(Placement {
        left_fraction: (clipped_start - window_start) as f64 / duration,
        width_fraction: (clipped_end - clipped_start) as f64 / duration,
    })
}

// ── Lanes ─────────────────────────────────────────────────────────

/// Stack overlapping spans into lanes, lowest free lane first.
///
/// Returns one lane index per input span. Spans that only touch share a lane;
/// equal starts are taken in input order.
pub fn assign_lanes(spans: &[Span]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..spans.len()).collect();
    order.sort_by_key(|&i| (spans[i].start, i));

    let mut lane_ends: Vec<Ms> = Vec::new();
    let mut lanes = vec![0; spans.len()];
    for i in order {
        let span = spans[i];
        let lane = match lane_ends.iter().position(|&end| end <= span.start) {
            Some(lane) => {
                lane_ends[lane] = span.end;
                lane
            }
            None => {
                lane_ends.push(span.end);
                lane_ends.len() - 1
            }
        };
        lanes[i] = lane;
    }
    lanes
}

/// Something drawn on a board row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub id: Ulid,
    pub span: Span,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBlock {
    pub id: Ulid,
    pub label: Option<String>,
    pub placement: Placement,
    pub lane: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowLayout {
    pub blocks: Vec<PlacedBlock>,
    pub lane_count: usize,
}

/// Place every visible block of a row and stack the overlapping ones.
pub fn layout_row(window: &TimelineWindow, blocks: &[Block]) -> RowLayout {
    let visible: Vec<(&Block, Placement)> = blocks
        .iter()
        .filter_map(|b| window.place(&b.span).map(|p| (b, p)))
        .collect();
    let spans: Vec<Span> = visible.iter().map(|(b, _)| b.span).collect();
    let lanes = assign_lanes(&spans);
    let lane_count = lanes.iter().max().map_or(0, |l| l + 1);

    let placed = visible
        .into_iter()
        .zip(lanes)
        .map(|((block, placement), lane)| PlacedBlock {
            id: block.id,
            label: block.label.clone(),
            placement,
            lane,
        })
        .collect();

    RowLayout {
        blocks: placed,
        lane_count,
    }
}
