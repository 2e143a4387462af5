//! Played / unplayed mask derived from region coverage.

use std::fmt::Write as _;

use crate::region::Region;

/// Percent boundaries closer than this are treated as touching.
const TOUCH_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coverage {
    /// Inside a region (light).
    Covered,
    /// Outside every region (dark).
    Uncovered,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlaySegment {
    pub from: f64,
    pub to: f64,
    pub coverage: Coverage,
}

impl OverlaySegment {
    pub fn new(from: f64, to: f64, coverage: Coverage) -> Self {
        Self { from, to, coverage }
    }
}

/// Walk regions left to right and emit contiguous covered / uncovered
/// segments in percent of `total_duration`. Markers cover nothing and
/// overlapping or touching regions merge into one covered segment. No
/// regions (or no duration) yields no mask at all.
pub fn compute<'a>(regions: impl IntoIterator<Item = &'a Region>, total_duration: f64) -> Vec<OverlaySegment> {
    if total_duration <= 0.0 {
        return Vec::new();
    }

    let mut spans: Vec<(f64, f64)> = regions
        .into_iter()
        .filter(|r| !r.is_marker())
        .map(|r| (r.start_percent(), r.end_percent()))
        .collect();
    if spans.is_empty() {
        return Vec::new();
    }
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 + TOUCH_TOLERANCE => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut segments = Vec::with_capacity(merged.len() * 2 + 1);
    let mut cursor = 0.0;
    for (start, end) in merged {
        if start > cursor + TOUCH_TOLERANCE {
            segments.push(OverlaySegment::new(cursor, start, Coverage::Uncovered));
            cursor = start;
        }
        segments.push(OverlaySegment::new(cursor, end, Coverage::Covered));
        cursor = end;
    }
    if cursor < 100.0 - TOUCH_TOLERANCE {
        segments.push(OverlaySegment::new(cursor, 100.0, Coverage::Uncovered));
    }
    segments
}

/// Render segments as a hard-stop CSS `linear-gradient`.
pub fn to_css_gradient(segments: &[OverlaySegment], covered: &str, uncovered: &str) -> Option<String> {
    if segments.is_empty() {
        return None;
    }
    let mut css = String::from("linear-gradient(to right");
    for seg in segments {
        let color = match seg.coverage {
            Coverage::Covered => covered,
            Coverage::Uncovered => uncovered,
        };
        let _ = write!(css, ", {color} {:.4}%, {color} {:.4}%", seg.from, seg.to);
    }
    css.push(')');
    Some(css)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionParams;

    fn region(id: &str, start: f64, end: f64) -> Region {
        Region::from_params(id.into(), RegionParams::span(start, end), 100.0, "red")
    }

    #[test]
    fn test_edges_reaching_timeline_bounds() {
        let regions = [region("a", 0.0, 10.0), region("b", 40.0, 100.0)];
        let segs = compute(&regions, 100.0);
        assert_eq!(
            segs,
            vec![
                OverlaySegment::new(0.0, 10.0, Coverage::Covered),
                OverlaySegment::new(10.0, 40.0, Coverage::Uncovered),
                OverlaySegment::new(40.0, 100.0, Coverage::Covered),
            ]
        );
    }

    #[test]
    fn test_leading_and_trailing_gaps() {
        let regions = [region("a", 20.0, 30.0)];
        let segs = compute(&regions, 100.0);
        let kinds: Vec<_> = segs.iter().map(|s| (s.from, s.to, s.coverage)).collect();
        assert_eq!(
            kinds,
            vec![
                (0.0, 20.0, Coverage::Uncovered),
                (20.0, 30.0, Coverage::Covered),
                (30.0, 100.0, Coverage::Uncovered),
            ]
        );
    }

    #[test]
    fn test_clamp_gap_counts_as_touching() {
        let regions = [region("a", 10.0, 20.0), region("b", 20.0 + 1e-9, 30.0)];
        let segs = compute(&regions, 100.0);
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[1].coverage, Coverage::Covered);
        assert_eq!(segs[1].from, 10.0);
        assert_eq!(segs[1].to, 30.0);
    }

    #[test]
    fn test_markers_and_empty() {
        let regions = [region("m", 50.0, 50.0)];
        assert!(compute(&regions, 100.0).is_empty());
        assert!(compute(&[] as &[Region], 100.0).is_empty());
        assert!(compute(&[region("a", 1.0, 2.0)], 0.0).is_empty());
    }

    #[test]
    fn test_css_gradient() {
        let segs = compute(&[region("a", 0.0, 50.0)], 100.0);
        let css = to_css_gradient(&segs, "L", "D").unwrap();
        assert_eq!(css, "linear-gradient(to right, L 0.0000%, L 50.0000%, D 50.0000%, D 100.0000%)");
        assert_eq!(to_css_gradient(&[], "L", "D"), None);
    }
}
