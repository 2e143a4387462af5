//! Ordered region storage and neighbor lookup.
//!
//! Regions are kept sorted by start time (stable for equal starts). The
//! neighbors a drag is clamped against are simply the entries on either side
//! in that order, looked up fresh for every update, so there is no adjacency
//! state to keep in sync beyond re-sorting when membership or a span changes.

use crate::overlap::Neighbors;
use crate::position::{self, DragSide, Limits, Resolution};
use crate::region::{Region, RegionId, RegionUpdate, Span};

/// Result of applying one drag delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragOutcome {
    /// The committed span differs from the previous one.
    pub changed: bool,
    /// A neighbor clamp happened.
    pub overlapped: bool,
}

#[derive(Debug, Default)]
pub struct RegionCollection {
    regions: Vec<Region>,
}

impl RegionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn get(&self, id: &RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &RegionId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn position_of(&self, id: &RegionId) -> Option<usize> {
        self.regions.iter().position(|r| &r.id == id)
    }

    /// Insert keeping start order; equal starts go after existing ones.
    /// Returns the index the region landed at.
    pub fn add(&mut self, region: Region) -> usize {
        let idx = self.regions.partition_point(|r| r.start <= region.start);
        self.regions.insert(idx, region);
        idx
    }

    pub fn remove(&mut self, id: &RegionId) -> Option<Region> {
        let idx = self.position_of(id)?;
        Some(self.regions.remove(idx))
    }

    pub fn clear(&mut self) -> Vec<Region> {
        std::mem::take(&mut self.regions)
    }

    pub fn neighbors(&self, id: &RegionId) -> Neighbors {
        match self.position_of(id) {
            Some(idx) => self.neighbors_at(idx),
            None => Neighbors::default(),
        }
    }

    fn neighbors_at(&self, idx: usize) -> Neighbors {
        Neighbors {
            before: idx.checked_sub(1).and_then(|i| self.regions.get(i)).map(Region::span),
            after: self.regions.get(idx + 1).map(Region::span),
        }
    }

    /// Whether `span` would intersect any stored region other than `except`.
    pub fn overlaps(&self, span: Span, except: Option<&RegionId>) -> bool {
        self.regions
            .iter()
            .filter(|r| Some(&r.id) != except)
            .any(|r| span.start < r.end && r.start < span.end)
    }

    /// First region (in order) whose `[start, end]` contains `time`.
    pub fn region_at(&self, time: f64) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(time))
    }

    pub fn set_total_duration(&mut self, total_duration: f64) {
        for region in &mut self.regions {
            region.set_total_duration(total_duration);
        }
        self.resort();
    }

    /// Resolve and commit one drag delta against the current neighbors.
    /// `None` when the id is unknown.
    pub fn apply_drag(
        &mut self,
        id: &RegionId,
        delta_px: f64,
        side: DragSide,
        content_width_px: f64,
        epsilon: f64,
    ) -> Option<DragOutcome> {
        let idx = self.position_of(id)?;
        let neighbors = self.neighbors_at(idx);
        let region = &mut self.regions[idx];
        let current = region.span();

        let outcome = match position::resolve(
            current,
            &Limits::of(region),
            delta_px,
            side,
            content_width_px,
            &neighbors,
            epsilon,
        ) {
            Resolution::Rejected => DragOutcome { changed: false, overlapped: false },
            Resolution::Accepted { span, overlapped } => {
                let changed = span != current;
                if changed {
                    region.set_span(span);
                }
                DragOutcome { changed, overlapped }
            }
        };
        if outcome.changed {
            self.resort();
        }
        Some(outcome)
    }

    /// Apply an option update. `None` for an unknown id, otherwise whether
    /// the span changed.
    pub fn apply_update(&mut self, id: &RegionId, update: RegionUpdate) -> Option<bool> {
        let idx = self.position_of(id)?;
        let changed = self.regions[idx].apply(update);
        if changed {
            self.resort();
        }
        Some(changed)
    }

    fn resort(&mut self) {
        self.regions.sort_by(|a, b| a.start.total_cmp(&b.start));
    }
}
