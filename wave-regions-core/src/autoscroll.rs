//! Viewport autoscroll while a region edge is dragged near the border.
//!
//! Whole-region moves scroll once per sample by however far the leading
//! edge has intruded into the edge zone. Edge resizes start a repeating
//! task instead: every tick scrolls the viewport and hands back a pixel
//! delta that the caller feeds through the normal position update, so the
//! edge keeps advancing while the pointer sits still at the border.

use std::collections::HashMap;

use crate::config::AutoscrollConfig;
use crate::position::DragSide;
use crate::region::{Region, RegionId};
use crate::scheduler::{ScheduledTask, TaskHandle, TaskScheduler};

/// Scroll geometry of the timeline's scroll container, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub scroll_left: f64,
    pub client_width: f64,
    pub scroll_width: f64,
}

impl Viewport {
    pub fn new(scroll_left: f64, client_width: f64, scroll_width: f64) -> Self {
        Self { scroll_left, client_width, scroll_width }
    }

    /// A viewport that shows the whole content.
    pub fn fixed(width: f64) -> Self {
        Self::new(0.0, width, width)
    }

    pub fn is_scrollable(&self) -> bool {
        self.scroll_width > self.client_width
    }

    pub fn max_scroll(&self) -> f64 {
        (self.scroll_width - self.client_width).max(0.0)
    }

    /// Scroll by `px`, clamped to the content. Returns the distance moved.
    pub fn scroll_by(&mut self, px: f64) -> f64 {
        let before = self.scroll_left;
        self.scroll_left = (self.scroll_left + px).clamp(0.0, self.max_scroll());
        self.scroll_left - before
    }

    /// Position of a timeline instant relative to the viewport's left edge.
    pub fn to_viewport_x(&self, time: f64, total_duration: f64) -> f64 {
        if total_duration <= 0.0 {
            return 0.0;
        }
        time / total_duration * self.scroll_width - self.scroll_left
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn of(dx: f64) -> Option<Self> {
        if dx > 0.0 {
            Some(Direction::Right)
        } else if dx < 0.0 {
            Some(Direction::Left)
        } else {
            None
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

#[derive(Clone, Debug)]
struct AutoscrollState {
    direction: Direction,
    side: DragSide,
    speed: f64,
    handle: TaskHandle,
}

/// One tick's worth of autoscroll: the viewport has already been scrolled,
/// `delta_px` still has to go through the position update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoscrollStep {
    pub delta_px: f64,
    pub side: DragSide,
}

#[derive(Debug, Default)]
pub struct AutoscrollController {
    config: AutoscrollConfig,
    active: HashMap<RegionId, AutoscrollState>,
}

impl AutoscrollController {
    pub fn new(config: AutoscrollConfig) -> Self {
        Self { config, active: HashMap::new() }
    }

    pub fn is_active(&self, id: &RegionId) -> bool {
        self.active.contains_key(id)
    }

    /// Current per-tick speed for a running edge autoscroll.
    pub fn speed(&self, id: &RegionId) -> Option<f64> {
        self.active.get(id).map(|s| s.speed)
    }

    /// Distance (px) from the viewport border the region is travelling
    /// toward, measured at the edge that leads the drag.
    fn distance_to_border(&self, region: &Region, side: DragSide, direction: Direction, viewport: &Viewport) -> f64 {
        let edge_time = match (side, direction) {
            (DragSide::ResizeStart, _) | (DragSide::Move, Direction::Left) => region.start,
            (DragSide::ResizeEnd, _) | (DragSide::Move, Direction::Right) => region.end,
        };
        let x = viewport.to_viewport_x(edge_time, region.total_duration());
        match direction {
            Direction::Left => x,
            Direction::Right => viewport.client_width - x,
        }
    }

    /// Look at one real drag sample (after its position update) and scroll
    /// or start / retune / stop the repeating task accordingly.
    pub fn observe(
        &mut self,
        region: &Region,
        side: DragSide,
        dx: f64,
        viewport: &mut Viewport,
        scheduler: &mut dyn TaskScheduler,
    ) {
        let Some(direction) = Direction::of(dx) else { return };
        if !viewport.is_scrollable() {
            self.stop(&region.id, scheduler);
            return;
        }

        let distance = self.distance_to_border(region, side, direction, viewport);
        let edge = self.config.edge_px;
        if distance >= edge {
            self.stop(&region.id, scheduler);
            return;
        }

        if side == DragSide::Move {
            let scrolled = viewport.scroll_by(direction.sign() * (edge - distance));
            log::trace!("move autoscroll by {scrolled:.1}px");
            return;
        }

        let max = self.config.max_speed;
        let speed = (edge - distance).clamp(-max, max);
        if let Some(state) = self.active.get_mut(&region.id) {
            if state.direction == direction && state.side == side {
                state.speed = speed;
                return;
            }
        }

        self.stop(&region.id, scheduler);
        let handle = scheduler.schedule_repeating(
            self.config.interval_ms,
            ScheduledTask::Autoscroll { region: region.id.clone() },
        );
        log::debug!("autoscroll started for {} ({direction:?}, {speed:.1}px/tick)", region.id);
        self.active.insert(region.id.clone(), AutoscrollState { direction, side, speed, handle });
    }

    /// Run one timer tick. Scrolls `viewport` and returns the synthetic
    /// position delta, or stops the task when there is nothing left to do.
    pub fn tick(
        &mut self,
        region: &Region,
        viewport: &mut Viewport,
        scheduler: &mut dyn TaskScheduler,
    ) -> Option<AutoscrollStep> {
        let state = self.active.get(&region.id)?;
        let (direction, side) = (state.direction, state.side);

        let max = self.config.max_speed;
        let distance = self.distance_to_border(region, side, direction, viewport);
        let speed = (self.config.edge_px - distance).clamp(-max, max);
        if speed <= 0.0 {
            self.stop(&region.id, scheduler);
            return None;
        }

        let scrolled = viewport.scroll_by(direction.sign() * speed);
        if scrolled == 0.0 {
            log::debug!("autoscroll for {} reached the scroll bound", region.id);
            self.stop(&region.id, scheduler);
            return None;
        }
        if let Some(state) = self.active.get_mut(&region.id) {
            state.speed = speed;
        }
        Some(AutoscrollStep { delta_px: scrolled, side })
    }

    /// Cancel the task for one region. Returns whether one was running.
    pub fn stop(&mut self, id: &RegionId, scheduler: &mut dyn TaskScheduler) -> bool {
        match self.active.remove(id) {
            Some(state) => {
                scheduler.cancel(state.handle);
                log::debug!("autoscroll stopped for {id}");
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&mut self, scheduler: &mut dyn TaskScheduler) {
        for (_, state) in self.active.drain() {
            scheduler.cancel(state.handle);
        }
    }
}
