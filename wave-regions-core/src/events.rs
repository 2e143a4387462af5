use crate::position::DragSide;
use crate::region::RegionId;

/// Notifications queued by [`crate::Regions`] and drained by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum RegionEvent {
    Created(RegionId),
    /// Span or options changed. `side` is `None` for programmatic updates.
    Updated { id: RegionId, side: Option<DragSide>, delta_px: f64 },
    /// A drag or resize gesture on the region finished.
    UpdateEnd(RegionId),
    Removed(RegionId),
    Clicked(RegionId),
    DoubleClicked(RegionId),
    MouseUp(RegionId),
    /// Playback entered the region.
    In(RegionId),
    /// Playback left the region.
    Out(RegionId),
}

impl RegionEvent {
    pub fn region_id(&self) -> &RegionId {
        match self {
            RegionEvent::Created(id)
            | RegionEvent::UpdateEnd(id)
            | RegionEvent::Removed(id)
            | RegionEvent::Clicked(id)
            | RegionEvent::DoubleClicked(id)
            | RegionEvent::MouseUp(id)
            | RegionEvent::In(id)
            | RegionEvent::Out(id) => id,
            RegionEvent::Updated { id, .. } => id,
        }
    }
}
