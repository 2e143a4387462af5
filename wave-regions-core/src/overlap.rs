//! Neighbor clamping for in-progress drags.

use crate::position::DragSide;
use crate::region::Span;

/// The spans immediately before and after a region in collection order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Neighbors {
    pub before: Option<Span>,
    pub after: Option<Span>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clamped {
    pub span: Span,
    pub overlapped: bool,
}

/// Pull a candidate span back so it does not cross either neighbor.
///
/// The start is checked against the previous neighbor first; the end is only
/// checked when the start did not collide. A clamped move keeps the length of
/// `current`; a clamped resize only touches the edge being dragged. When the
/// clamped span has no room (a move that would then cross the other
/// neighbor, or an edge that would be pushed against the drag) `current` is
/// returned unchanged, still flagged as overlapped.
pub fn clamp(
    candidate: Span,
    current: Span,
    side: DragSide,
    neighbors: &Neighbors,
    epsilon: f64,
) -> Clamped {
    let length = current.length();
    let Span { mut start, mut end } = candidate;
    let moves_start = side != DragSide::ResizeEnd;
    let moves_end = side != DragSide::ResizeStart;

    if let Some(prev) = neighbors.before.filter(|prev| start < prev.end) {
        start = prev.end + epsilon;
        if side == DragSide::Move {
            end = start + length;
        }
        let blocked = (moves_start && start > current.start)
            || (side == DragSide::Move && neighbors.after.is_some_and(|next| end > next.start));
        return overlapped(blocked, current, Span::new(start, end));
    }

    if let Some(next) = neighbors.after.filter(|next| end > next.start) {
        end = next.start - epsilon;
        if side == DragSide::Move {
            start = end - length;
        }
        let blocked = (moves_end && end < current.end)
            || (side == DragSide::Move && neighbors.before.is_some_and(|prev| start < prev.end));
        return overlapped(blocked, current, Span::new(start, end));
    }

    Clamped { span: candidate, overlapped: false }
}

fn overlapped(blocked: bool, current: Span, clamped: Span) -> Clamped {
    if blocked {
        log::trace!("no room between neighbors, keeping {:.4}..{:.4}", current.start, current.end);
    }
    Clamped { span: if blocked { current } else { clamped }, overlapped: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OVERLAP_EPSILON;

    #[test]
    fn test_no_neighbors_passes_through() {
        let c = clamp(Span::new(1.0, 2.0), Span::new(0.5, 1.5), DragSide::Move, &Neighbors::default(), OVERLAP_EPSILON);
        assert!(!c.overlapped);
        assert_eq!(c.span, Span::new(1.0, 2.0));
    }

    #[test]
    fn test_move_into_previous_keeps_length() {
        let n = Neighbors { before: Some(Span::new(0.0, 10.0)), after: None };
        let c = clamp(Span::new(8.0, 13.0), Span::new(12.0, 17.0), DragSide::Move, &n, OVERLAP_EPSILON);
        assert!(c.overlapped);
        assert_eq!(c.span.start, 10.0 + OVERLAP_EPSILON);
        assert!((c.span.length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_resize_end_into_next_leaves_start() {
        let n = Neighbors { before: None, after: Some(Span::new(20.0, 30.0)) };
        let c = clamp(Span::new(5.0, 24.0), Span::new(5.0, 19.0), DragSide::ResizeEnd, &n, OVERLAP_EPSILON);
        assert!(c.overlapped);
        assert_eq!(c.span, Span::new(5.0, 20.0 - OVERLAP_EPSILON));
    }

    #[test]
    fn test_move_into_next_keeps_length() {
        let n = Neighbors { before: None, after: Some(Span::new(20.0, 30.0)) };
        let c = clamp(Span::new(17.0, 22.0), Span::new(14.0, 19.0), DragSide::Move, &n, OVERLAP_EPSILON);
        assert!(c.overlapped);
        assert_eq!(c.span.end, 20.0 - OVERLAP_EPSILON);
        assert!((c.span.start - (15.0 - OVERLAP_EPSILON)).abs() < 1e-12);
    }

    #[test]
    fn test_move_between_touching_neighbors_stays_put() {
        let n = Neighbors { before: Some(Span::new(0.0, 10.0)), after: Some(Span::new(20.0, 30.0)) };
        let current = Span::new(10.0, 20.0);

        let left = clamp(Span::new(9.8, 19.8), current, DragSide::Move, &n, OVERLAP_EPSILON);
        assert!(left.overlapped);
        assert_eq!(left.span, current);

        let right = clamp(Span::new(10.2, 20.2), current, DragSide::Move, &n, OVERLAP_EPSILON);
        assert!(right.overlapped);
        assert_eq!(right.span, current);
    }

    #[test]
    fn test_flush_resize_start_does_not_move_backwards() {
        let n = Neighbors { before: Some(Span::new(0.0, 10.0)), after: None };
        let c = clamp(Span::new(9.0, 15.0), Span::new(10.0, 15.0), DragSide::ResizeStart, &n, OVERLAP_EPSILON);
        assert!(c.overlapped);
        assert_eq!(c.span, Span::new(10.0, 15.0));
    }
}
