//! Pixel-delta position updates for a single region.

use serde::{Deserialize, Serialize};

use crate::gesture::LockSide;
use crate::overlap::{self, Neighbors};
use crate::region::{Region, Span};

/// What part of a region a drag acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragSide {
    Move,
    ResizeStart,
    ResizeEnd,
}

impl DragSide {
    /// Directional lock for the gesture driving this side.
    pub fn lock_side(self) -> Option<LockSide> {
        match self {
            DragSide::Move => None,
            DragSide::ResizeStart => Some(LockSide::Start),
            DragSide::ResizeEnd => Some(LockSide::End),
        }
    }

    pub fn is_resize(self) -> bool {
        !matches!(self, DragSide::Move)
    }

    /// Whether the region's flags allow dragging this side.
    pub fn permitted_for(self, region: &Region) -> bool {
        match self {
            DragSide::Move => region.drag,
            DragSide::ResizeStart => region.resize && region.resize_start,
            DragSide::ResizeEnd => region.resize && region.resize_end,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    pub min_length: f64,
    pub max_length: f64,
    pub total_duration: f64,
}

impl Limits {
    pub fn of(region: &Region) -> Self {
        Self {
            min_length: region.min_length,
            max_length: region.max_length,
            total_duration: region.total_duration(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolution {
    /// The sample is dropped; nothing changes.
    Rejected,
    Accepted { span: Span, overlapped: bool },
}

/// Convert a pixel delta to seconds and work out the span it produces.
///
/// Out-of-bounds or length-violating candidates are rejected unless a
/// neighbor clamp happened; a clamp always wins, then the result is pinned
/// into `[0, total]` with `start <= end`.
pub fn resolve(
    current: Span,
    limits: &Limits,
    delta_px: f64,
    side: DragSide,
    content_width_px: f64,
    neighbors: &Neighbors,
    epsilon: f64,
) -> Resolution {
    if delta_px == 0.0 || !delta_px.is_finite() || content_width_px <= 0.0 {
        return Resolution::Rejected;
    }

    let total = limits.total_duration;
    let delta_s = delta_px / content_width_px * total;

    let candidate = match side {
        DragSide::Move => Span::new(current.start + delta_s, current.end + delta_s),
        DragSide::ResizeStart => Span::new(current.start + delta_s, current.end),
        DragSide::ResizeEnd => Span::new(current.start, current.end + delta_s),
    };
    let length = candidate.length();

    let clamped = overlap::clamp(candidate, current, side, neighbors, epsilon);
    if clamped.overlapped {
        let start = clamped.span.start.clamp(0.0, total);
        let end = clamped.span.end.clamp(start, total);
        return Resolution::Accepted { span: Span::new(start, end), overlapped: true };
    }

    let in_bounds = candidate.start >= 0.0 && candidate.end <= total && candidate.start <= candidate.end;
    let length_ok = length >= limits.min_length && length <= limits.max_length;
    if in_bounds && length_ok {
        Resolution::Accepted { span: candidate, overlapped: false }
    } else {
        log::trace!("rejected {side:?} candidate {:.4}..{:.4}", candidate.start, candidate.end);
        Resolution::Rejected
    }
}
