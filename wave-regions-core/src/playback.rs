//! Which region, if any, the playhead is currently inside.

use crate::events::RegionEvent;
use crate::region::{Region, RegionId};

#[derive(Debug, Default)]
pub struct PlaybackTracker {
    active: Option<RegionId>,
    /// End of a region started with "play region"; playback pauses here.
    stop_at: Option<f64>,
}

impl PlaybackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&RegionId> {
        self.active.as_ref()
    }

    /// Feed a playback time. The first region in collection order that
    /// contains `time` is the one playback is "in".
    pub fn time_update<'a>(&mut self, time: f64, regions: impl IntoIterator<Item = &'a Region>) -> Vec<RegionEvent> {
        let current = regions.into_iter().find(|r| r.contains(time)).map(|r| r.id.clone());
        if current == self.active {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(2);
        if let Some(prev) = self.active.take() {
            events.push(RegionEvent::Out(prev));
        }
        if let Some(id) = current {
            events.push(RegionEvent::In(id.clone()));
            self.active = Some(id);
        }
        events
    }

    pub fn play_until(&mut self, end: f64) {
        self.stop_at = Some(end);
    }

    /// True once `time` has reached the pending stop point; the stop point
    /// is consumed.
    pub fn should_stop(&mut self, time: f64) -> bool {
        match self.stop_at {
            Some(end) if time >= end => {
                self.stop_at = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any reference to a removed region without emitting `Out`.
    pub fn forget(&mut self, id: &RegionId) {
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
    }

    pub fn reset(&mut self) {
        self.active = None;
        self.stop_at = None;
    }
}
