//! Pure scheduling core: conflict resolution, free-time algebra and timeline layout.
//!
//! Nothing in here does I/O or holds state between calls.

mod availability;
mod conflict;
mod error;
mod layout;

pub use availability::{free_spans, merge_overlapping, resource_free_spans, subtract_intervals};
pub use conflict::{conflicting_allocations, resolve_conflicts, validate_interval, validate_span};
pub use error::EngineError;
pub use layout::{
    assign_lanes, build_slots, compute_placement, layout_row, Block, PlacedBlock, RowLayout,
    Slots, TimelineWindow, WindowConfig,
};
