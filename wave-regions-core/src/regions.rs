//! The regions facade: public operations, event queue, and the glue
//! between gestures, position updates, autoscroll and playback.

use crate::autoscroll::{AutoscrollController, Viewport};
use crate::collection::RegionCollection;
use crate::config::RegionsConfig;
use crate::error::RegionError;
use crate::events::RegionEvent;
use crate::overlay::{self, OverlaySegment};
use crate::playback::PlaybackTracker;
use crate::position::DragSide;
use crate::region::{Region, RegionId, RegionParams, RegionUpdate};
use crate::scheduler::{ScheduledTask, TaskScheduler};

/// The timeline player the regions sit on top of.
pub trait HostPlayer {
    /// Total duration in seconds, once known.
    fn duration(&self) -> Option<f64>;

    fn channel_count(&self) -> u32 {
        1
    }

    fn seek_to(&mut self, time: f64);
    fn play(&mut self);
    fn pause(&mut self);
}

pub struct Regions<S: TaskScheduler> {
    config: RegionsConfig,
    collection: RegionCollection,
    autoscroll: AutoscrollController,
    playback: PlaybackTracker,
    scheduler: S,
    host_ready: bool,
    duration: Option<f64>,
    /// Creation requests waiting for the duration to become known.
    pending: Vec<(RegionId, RegionParams)>,
    /// Region being drawn by drag-to-create; its events are held back.
    drafting: Option<RegionId>,
    next_id: u64,
    /// Bumped on every change to the stored regions, drafts included.
    revision: u64,
    events: Vec<RegionEvent>,
}

impl<S: TaskScheduler> Regions<S> {
    pub fn new(config: RegionsConfig, scheduler: S) -> Self {
        let autoscroll = AutoscrollController::new(config.autoscroll.clone());
        Self {
            config,
            collection: RegionCollection::new(),
            autoscroll,
            playback: PlaybackTracker::new(),
            scheduler,
            host_ready: false,
            duration: None,
            pending: Vec::new(),
            drafting: None,
            next_id: 0,
            revision: 0,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &RegionsConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn is_ready(&self) -> bool {
        self.host_ready
    }

    /// Changes whenever anything a renderer shows may have changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// The host player is ready. A known duration flushes deferred
    /// creations immediately.
    pub fn host_ready(&mut self, duration: Option<f64>) {
        self.host_ready = true;
        if let Some(duration) = duration {
            self.set_duration(duration);
        }
    }

    pub fn set_duration(&mut self, duration: f64) {
        if !duration.is_finite() || duration <= 0.0 {
            log::warn!("ignoring unusable duration {duration}");
            return;
        }
        self.duration = Some(duration);
        self.collection.set_total_duration(duration);
        self.touch();

        for (id, params) in std::mem::take(&mut self.pending) {
            self.insert(id, params, duration);
        }
    }

    fn next_region_id(&mut self) -> RegionId {
        loop {
            self.next_id += 1;
            let id = RegionId::new(format!("region-{}", self.next_id));
            let pending = self.pending.iter().any(|(p, _)| p == &id);
            if !pending && !self.collection.contains(&id) {
                return id;
            }
        }
    }

    fn ensure_ready(&self, operation: &str) -> Result<(), RegionError> {
        if self.host_ready {
            Ok(())
        } else {
            log::error!("{operation} called before the host player was ready");
            Err(RegionError::HostNotReady)
        }
    }

    /// Create a region. With the duration still unknown the region is queued
    /// and appears (with a `Created` event) once the duration arrives; the id
    /// is returned either way.
    pub fn create_region(&mut self, params: RegionParams) -> Result<RegionId, RegionError> {
        self.ensure_ready("create_region")?;
        let id = match params.id.as_deref() {
            Some(id) => RegionId::new(id),
            None => self.next_region_id(),
        };
        match self.duration {
            Some(duration) => self.insert(id.clone(), params, duration),
            None => {
                log::debug!("duration unknown, deferring creation of {id}");
                self.pending.push((id.clone(), params));
            }
        }
        Ok(id)
    }

    fn insert(&mut self, id: RegionId, params: RegionParams, duration: f64) {
        let region = Region::from_params(id.clone(), params, duration, &self.config.default_color);
        if self.collection.remove(&id).is_some() {
            log::warn!("region {id} already existed and was replaced");
        }
        if self.collection.overlaps(region.span(), None) {
            log::warn!("region {id} overlaps an existing region");
        }
        log::info!("created region {id} [{:.3}, {:.3}]", region.start, region.end);
        self.collection.add(region);
        self.touch();
        self.events.push(RegionEvent::Created(id));
    }

    pub fn update_region(&mut self, id: &RegionId, update: RegionUpdate) -> Result<(), RegionError> {
        self.collection
            .apply_update(id, update)
            .ok_or_else(|| RegionError::UnknownRegion(id.clone()))?;
        self.touch();
        self.events.push(RegionEvent::Updated { id: id.clone(), side: None, delta_px: 0.0 });
        Ok(())
    }

    /// Remove a region, stopping anything still running on its behalf.
    pub fn remove_region(&mut self, id: &RegionId) -> Result<Region, RegionError> {
        let region = self
            .collection
            .remove(id)
            .ok_or_else(|| RegionError::UnknownRegion(id.clone()))?;
        self.autoscroll.stop(id, &mut self.scheduler);
        self.playback.forget(id);
        if self.drafting.as_ref() == Some(id) {
            self.drafting = None;
        }
        self.touch();
        self.events.push(RegionEvent::Removed(id.clone()));
        Ok(region)
    }

    pub fn clear_all(&mut self) {
        self.autoscroll.stop_all(&mut self.scheduler);
        self.playback.reset();
        self.pending.clear();
        self.drafting = None;
        self.touch();
        for region in self.collection.clear() {
            self.events.push(RegionEvent::Removed(region.id));
        }
    }

    pub fn regions(&self) -> &[Region] {
        self.collection.as_slice()
    }

    pub fn region(&self, id: &RegionId) -> Option<&Region> {
        self.collection.get(id)
    }

    pub fn is_autoscrolling(&self, id: &RegionId) -> bool {
        self.autoscroll.is_active(id)
    }

    /// One real drag sample on a region. Returns whether the span changed.
    pub fn drag(&mut self, id: &RegionId, delta_px: f64, side: DragSide, viewport: &mut Viewport) -> bool {
        let permitted = self.collection.get(id).is_some_and(|r| side.permitted_for(r));
        if !permitted {
            return false;
        }
        self.drag_unchecked(id, delta_px, side, viewport)
    }

    fn drag_unchecked(&mut self, id: &RegionId, delta_px: f64, side: DragSide, viewport: &mut Viewport) -> bool {
        let Some((changed, overlapped)) = self.apply_delta(id, delta_px, side, viewport) else {
            return false;
        };
        if !overlapped {
            if let Some(region) = self.collection.get(id) {
                self.autoscroll.observe(region, side, delta_px, viewport, &mut self.scheduler);
            }
        }
        changed
    }

    /// Shared by real samples and autoscroll ticks.
    fn apply_delta(
        &mut self,
        id: &RegionId,
        delta_px: f64,
        side: DragSide,
        viewport: &Viewport,
    ) -> Option<(bool, bool)> {
        let outcome = self.collection.apply_drag(
            id,
            delta_px,
            side,
            viewport.scroll_width,
            self.config.overlap_epsilon,
        )?;
        if outcome.overlapped {
            self.autoscroll.stop(id, &mut self.scheduler);
        }
        if outcome.changed {
            self.touch();
        }
        if outcome.changed && self.drafting.as_ref() != Some(id) {
            self.events.push(RegionEvent::Updated { id: id.clone(), side: Some(side), delta_px });
        }
        Some((outcome.changed, outcome.overlapped))
    }

    /// The pointer was released after dragging a region.
    pub fn end_drag(&mut self, id: &RegionId) {
        self.autoscroll.stop(id, &mut self.scheduler);
        if self.collection.contains(id) && self.drafting.as_ref() != Some(id) {
            self.events.push(RegionEvent::UpdateEnd(id.clone()));
        }
    }

    /// Fire a task previously handed to the scheduler. Returns whether a
    /// region changed.
    pub fn run_task(&mut self, task: &ScheduledTask, viewport: &mut Viewport) -> bool {
        match task {
            ScheduledTask::Autoscroll { region: id } => {
                let Some(region) = self.collection.get(id) else {
                    self.autoscroll.stop(id, &mut self.scheduler);
                    return false;
                };
                let Some(step) = self.autoscroll.tick(region, viewport, &mut self.scheduler) else {
                    return false;
                };
                log::trace!("autoscroll tick for {id}: {:.1}px", step.delta_px);
                self.apply_delta(id, step.delta_px, step.side, viewport)
                    .is_some_and(|(changed, _)| changed)
            }
        }
    }

    /// Adopt the player's duration when it reports a usable one we do not
    /// have yet (or a different one, after the media changed).
    fn sync_duration(&mut self, player: &dyn HostPlayer) {
        let reported = player.duration().filter(|d| d.is_finite() && *d > 0.0);
        if let Some(duration) = reported.filter(|d| Some(*d) != self.duration) {
            log::debug!("player reports duration {duration:.3}s");
            self.set_duration(duration);
        }
    }

    /// Playback time moved; emits `In` / `Out` and honors a pending
    /// play-region stop.
    pub fn time_update(&mut self, time: f64, player: &mut dyn HostPlayer) {
        self.sync_duration(player);
        let events = self.playback.time_update(time, self.collection.iter());
        self.events.extend(events);
        if self.playback.should_stop(time) {
            player.pause();
        }
    }

    /// Play a region from its start, pausing at its end.
    pub fn play_region(&mut self, id: &RegionId, player: &mut dyn HostPlayer) -> Result<(), RegionError> {
        let region = self
            .collection
            .get(id)
            .ok_or_else(|| RegionError::UnknownRegion(id.clone()))?;
        let (start, end) = (region.start, region.end);
        player.seek_to(start);
        player.play();
        if end > start {
            self.playback.play_until(end);
        }
        Ok(())
    }

    pub fn click(&mut self, id: &RegionId) {
        self.push_if_known(id, RegionEvent::Clicked(id.clone()));
    }

    pub fn double_click(&mut self, id: &RegionId) {
        self.push_if_known(id, RegionEvent::DoubleClicked(id.clone()));
    }

    pub fn mouse_up(&mut self, id: &RegionId) {
        self.push_if_known(id, RegionEvent::MouseUp(id.clone()));
    }

    fn push_if_known(&mut self, id: &RegionId, event: RegionEvent) {
        if self.collection.contains(id) {
            self.events.push(event);
        }
    }

    pub fn take_events(&mut self) -> Vec<RegionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn overlay(&self) -> Vec<OverlaySegment> {
        overlay::compute(self.collection.iter(), self.duration.unwrap_or(0.0))
    }

    /// Enter drag-to-create mode. Dropping or disposing the returned creator
    /// ends it.
    pub fn enable_drag_to_create(&mut self, template: RegionParams) -> Result<DragCreator, RegionError> {
        self.ensure_ready("enable_drag_to_create")?;
        Ok(DragCreator { template, active: None })
    }
}

/// Draws a new region with a drag on the empty timeline.
#[derive(Debug)]
pub struct DragCreator {
    template: RegionParams,
    /// Draft region id and the pointer x (px) where the drag started.
    active: Option<(RegionId, f64)>,
}

impl DragCreator {
    pub fn is_drafting(&self) -> bool {
        self.active.is_some()
    }

    /// Gesture start at `x` px into a timeline `width` px wide. Returns the
    /// draft id, or `None` if the press landed inside an existing region or
    /// the duration is not known yet.
    pub fn start<S: TaskScheduler>(
        &mut self,
        regions: &mut Regions<S>,
        x: f64,
        width: f64,
    ) -> Result<Option<RegionId>, RegionError> {
        if width <= 0.0 {
            return Err(RegionError::InvalidContainer);
        }
        self.discard(regions);
        let Some(duration) = regions.duration else {
            log::debug!("drag-to-create ignored: duration unknown");
            return Ok(None);
        };

        let at = (x / width * duration).clamp(0.0, duration);
        if regions.collection.region_at(at).is_some() {
            return Ok(None);
        }

        let id = regions.next_region_id();
        let params = RegionParams { id: None, start: at, end: Some(at), ..self.template.clone() };
        let region = Region::from_params(id.clone(), params, duration, &regions.config.default_color);
        regions.collection.add(region);
        regions.touch();
        regions.drafting = Some(id.clone());
        self.active = Some((id.clone(), x));
        Ok(Some(id))
    }

    /// A drag sample; `x` is the pointer position relative to the timeline.
    pub fn drag<S: TaskScheduler>(
        &mut self,
        regions: &mut Regions<S>,
        dx: f64,
        x: f64,
        viewport: &mut Viewport,
    ) -> bool {
        let Some((id, start_x)) = self.active.as_ref() else { return false };
        let side = if x > *start_x { DragSide::ResizeEnd } else { DragSide::ResizeStart };
        let id = id.clone();
        regions.drag_unchecked(&id, dx, side, viewport)
    }

    /// Gesture end: keep the draft if it has any length and announce it.
    pub fn end<S: TaskScheduler>(&mut self, regions: &mut Regions<S>) -> Option<RegionId> {
        let (id, _) = self.active.take()?;
        regions.autoscroll.stop(&id, &mut regions.scheduler);
        regions.drafting = None;

        let keep = regions.collection.get(&id).is_some_and(|r| !r.is_marker());
        if !keep {
            regions.collection.remove(&id);
            regions.touch();
            return None;
        }
        if let Some(region) = regions.collection.get(&id) {
            log::info!("created region {id} [{:.3}, {:.3}] by drag", region.start, region.end);
        }
        regions.events.push(RegionEvent::Created(id.clone()));
        regions.events.push(RegionEvent::UpdateEnd(id.clone()));
        Some(id)
    }

    /// Leave drag-to-create mode, discarding a half-drawn region.
    pub fn dispose<S: TaskScheduler>(mut self, regions: &mut Regions<S>) {
        self.discard(regions);
    }

    fn discard<S: TaskScheduler>(&mut self, regions: &mut Regions<S>) {
        if let Some((id, _)) = self.active.take() {
            regions.autoscroll.stop(&id, &mut regions.scheduler);
            regions.collection.remove(&id);
            regions.drafting = None;
            regions.touch();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OVERLAP_EPSILON;
    use crate::scheduler::ManualScheduler;

    #[derive(Default)]
    struct FakePlayer {
        seeks: Vec<f64>,
        playing: bool,
    }

    impl HostPlayer for FakePlayer {
        fn duration(&self) -> Option<f64> {
            Some(100.0)
        }
        fn seek_to(&mut self, time: f64) {
            self.seeks.push(time);
        }
        fn play(&mut self) {
            self.playing = true;
        }
        fn pause(&mut self) {
            self.playing = false;
        }
    }

    fn ready() -> Regions<ManualScheduler> {
        let mut regions = Regions::new(RegionsConfig::default(), ManualScheduler::new());
        regions.host_ready(Some(100.0));
        regions
    }

    fn assert_invariants(regions: &Regions<ManualScheduler>) {
        for r in regions.regions() {
            assert!(0.0 <= r.start && r.start <= r.end && r.end <= 100.0, "{} out of bounds", r.id);
        }
        for pair in regions.regions().windows(2) {
            assert!(pair[0].end <= pair[1].start, "{} crosses {}", pair[0].id, pair[1].id);
        }
    }

    #[test]
    fn test_create_before_ready_fails_loudly() {
        let mut regions = Regions::new(RegionsConfig::default(), ManualScheduler::new());
        assert!(matches!(regions.create_region(RegionParams::span(1.0, 2.0)), Err(RegionError::HostNotReady)));
        assert!(matches!(
            regions.enable_drag_to_create(RegionParams::default()),
            Err(RegionError::HostNotReady)
        ));
    }

    #[test]
    fn test_creation_deferred_until_duration() {
        let mut regions = Regions::new(RegionsConfig::default(), ManualScheduler::new());
        regions.host_ready(None);
        let id = regions.create_region(RegionParams::span(5.0, 10.0)).unwrap();
        assert!(regions.regions().is_empty());
        assert!(regions.take_events().is_empty());

        regions.set_duration(60.0);
        assert_eq!(regions.region(&id).unwrap().end, 10.0);
        assert_eq!(regions.take_events(), vec![RegionEvent::Created(id)]);
    }

    #[test]
    fn test_generated_ids_skip_taken_ones() {
        let mut regions = ready();
        let a = regions
            .create_region(RegionParams { id: Some("region-1".into()), ..RegionParams::marker(1.0) })
            .unwrap();
        let b = regions.create_region(RegionParams::marker(2.0)).unwrap();
        assert_eq!(a.as_str(), "region-1");
        assert_eq!(b.as_str(), "region-2");
    }

    #[test]
    fn test_move_without_neighbors() {
        let mut regions = ready();
        let id = regions.create_region(RegionParams::span(5.0, 10.0)).unwrap();
        regions.take_events();

        let mut vp = Viewport::fixed(500.0);
        assert!(regions.drag(&id, 50.0, DragSide::Move, &mut vp));
        let r = regions.region(&id).unwrap();
        assert!((r.start - 15.0).abs() < 1e-9);
        assert!((r.end - 20.0).abs() < 1e-9);
        assert_eq!(
            regions.take_events(),
            vec![RegionEvent::Updated { id, side: Some(DragSide::Move), delta_px: 50.0 }]
        );
    }

    #[test]
    fn test_move_between_touching_neighbors_keeps_order() {
        let mut regions = ready();
        regions.create_region(RegionParams::span(0.0, 10.0)).unwrap();
        let b = regions.create_region(RegionParams::span(10.0, 20.0)).unwrap();
        regions.create_region(RegionParams::span(20.0, 30.0)).unwrap();
        regions.take_events();

        let mut vp = Viewport::fixed(500.0);
        assert!(!regions.drag(&b, -1.0, DragSide::Move, &mut vp));
        assert!(!regions.drag(&b, 1.0, DragSide::Move, &mut vp));
        assert_eq!(regions.region(&b).unwrap().span(), crate::region::Span::new(10.0, 20.0));
        assert!(regions.take_events().is_empty());
        assert_invariants(&regions);
    }

    #[test]
    fn test_zero_update_is_idempotent() {
        let mut regions = ready();
        let id = regions.create_region(RegionParams::span(5.0, 10.0)).unwrap();
        regions.take_events();
        let mut vp = Viewport::fixed(500.0);
        for side in [DragSide::Move, DragSide::ResizeStart, DragSide::ResizeEnd] {
            assert!(!regions.drag(&id, 0.0, side, &mut vp));
        }
        assert_eq!(regions.region(&id).unwrap().span(), crate::region::Span::new(5.0, 10.0));
        assert!(regions.take_events().is_empty());
    }

    #[test]
    fn test_disabled_drag_is_ignored() {
        let mut regions = ready();
        let params = RegionParams { drag: false, resize: false, ..RegionParams::span(5.0, 10.0) };
        let id = regions.create_region(params).unwrap();
        let mut vp = Viewport::fixed(500.0);
        assert!(!regions.drag(&id, 10.0, DragSide::Move, &mut vp));
        assert!(!regions.drag(&id, 10.0, DragSide::ResizeEnd, &mut vp));
        assert_eq!(regions.region(&id).unwrap().start, 5.0);
    }

    #[test]
    fn test_resize_start_clamp_stops_autoscroll() {
        let mut regions = ready();
        let a = regions.create_region(RegionParams::span(0.0, 20.0)).unwrap();
        let b = regions.create_region(RegionParams::span(22.0, 30.0)).unwrap();

        // 2000 px of content, scrolled so b's start (440 px) sits 40 px
        // inside the left border of a 500 px viewport.
        let mut vp = Viewport::new(400.0, 500.0, 2000.0);
        assert!(regions.drag(&b, -10.0, DragSide::ResizeStart, &mut vp));
        assert!(regions.is_autoscrolling(&b));
        assert_eq!(regions.scheduler().len(), 1);

        // Drag well past a's end.
        regions.drag(&b, -200.0, DragSide::ResizeStart, &mut vp);
        let rb = regions.region(&b).unwrap();
        assert_eq!(rb.start, 20.0 + OVERLAP_EPSILON);
        assert_eq!(rb.end, 30.0);
        assert!(!regions.is_autoscrolling(&b));
        assert!(regions.scheduler().is_empty());
        assert_eq!(regions.region(&a).unwrap().end, 20.0);
        assert_invariants(&regions);
    }

    #[test]
    fn test_autoscroll_tick_cancelled_by_clamp() {
        let mut regions = ready();
        regions.create_region(RegionParams::span(0.0, 20.0)).unwrap();
        let b = regions.create_region(RegionParams::span(20.5, 30.0)).unwrap();

        // b's start: 410 px content, 10 px into the viewport.
        let mut vp = Viewport::new(400.0, 500.0, 2000.0);
        regions.drag(&b, -1.0, DragSide::ResizeStart, &mut vp);
        let task = regions.scheduler().live_tasks().pop().unwrap();

        // First tick: 15 px = 0.75 s left, runs into the neighbor at 20 s.
        let scroll_before = vp.scroll_left;
        regions.run_task(&task, &mut vp);
        assert_eq!(regions.region(&b).unwrap().start, 20.0 + OVERLAP_EPSILON);
        assert!(regions.scheduler().is_empty());

        // A stale tick after cancellation changes nothing.
        let scroll_after = vp.scroll_left;
        assert!(scroll_after < scroll_before);
        assert!(!regions.run_task(&task, &mut vp));
        assert_eq!(vp.scroll_left, scroll_after);
        assert_invariants(&regions);
    }

    #[test]
    fn test_autoscroll_tick_advances_edge() {
        let mut regions = ready();
        let id = regions.create_region(RegionParams::span(10.0, 23.0)).unwrap();
        // End at 460 px: 40 px from the right border.
        let mut vp = Viewport::new(0.0, 500.0, 2000.0);
        regions.drag(&id, 1.0, DragSide::ResizeEnd, &mut vp);
        let end_before = regions.region(&id).unwrap().end;
        let task = regions.scheduler().live_tasks().pop().unwrap();
        regions.take_events();

        assert!(regions.run_task(&task, &mut vp));
        assert_eq!(vp.scroll_left, 15.0);
        // 15 px of 2000 px over 100 s = 0.75 s.
        assert!((regions.region(&id).unwrap().end - (end_before + 0.75)).abs() < 1e-9);
        assert!(matches!(
            regions.take_events().as_slice(),
            [RegionEvent::Updated { side: Some(DragSide::ResizeEnd), .. }]
        ));

        regions.end_drag(&id);
        assert!(regions.scheduler().is_empty());
        assert_eq!(regions.take_events(), vec![RegionEvent::UpdateEnd(id)]);
    }

    #[test]
    fn test_remove_tears_down_autoscroll() {
        let mut regions = ready();
        let id = regions.create_region(RegionParams::span(10.0, 23.0)).unwrap();
        let mut vp = Viewport::new(0.0, 500.0, 2000.0);
        regions.drag(&id, 1.0, DragSide::ResizeEnd, &mut vp);
        assert_eq!(regions.scheduler().len(), 1);
        regions.remove_region(&id).unwrap();
        assert!(regions.scheduler().is_empty());
        assert!(matches!(regions.remove_region(&id), Err(RegionError::UnknownRegion(_))));
    }

    #[test]
    fn test_overlay_follows_regions() {
        let mut regions = ready();
        regions.create_region(RegionParams::span(40.0, 100.0)).unwrap();
        regions.create_region(RegionParams::span(0.0, 10.0)).unwrap();
        let segs = regions.overlay();
        let bounds: Vec<_> = segs.iter().map(|s| (s.from, s.to)).collect();
        assert_eq!(bounds, vec![(0.0, 10.0), (10.0, 40.0), (40.0, 100.0)]);
    }

    #[test]
    fn test_play_region_pauses_at_end() {
        let mut regions = ready();
        let id = regions.create_region(RegionParams::span(10.0, 12.0)).unwrap();
        regions.take_events();
        let mut player = FakePlayer::default();

        regions.play_region(&id, &mut player).unwrap();
        assert_eq!(player.seeks, vec![10.0]);
        assert!(player.playing);

        regions.time_update(10.0, &mut player);
        assert_eq!(regions.take_events(), vec![RegionEvent::In(id.clone())]);
        regions.time_update(12.1, &mut player);
        assert!(!player.playing);
        assert_eq!(regions.take_events(), vec![RegionEvent::Out(id)]);
    }

    #[test]
    fn test_time_update_reads_player_duration() {
        let mut regions = Regions::new(RegionsConfig::default(), ManualScheduler::new());
        regions.host_ready(None);
        let id = regions.create_region(RegionParams::span(5.0, 10.0)).unwrap();
        assert!(regions.regions().is_empty());

        let mut player = FakePlayer::default();
        regions.time_update(0.0, &mut player);
        assert_eq!(regions.duration(), Some(100.0));
        assert_eq!(regions.take_events(), vec![RegionEvent::Created(id)]);

        // Same duration again: nothing to flush, no extra revision.
        let revision = regions.revision();
        regions.time_update(1.0, &mut player);
        assert_eq!(regions.revision(), revision);
    }

    #[test]
    fn test_clear_all_emits_removed() {
        let mut regions = ready();
        let a = regions.create_region(RegionParams::span(1.0, 2.0)).unwrap();
        let b = regions.create_region(RegionParams::span(3.0, 4.0)).unwrap();
        regions.take_events();
        regions.clear_all();
        assert!(regions.regions().is_empty());
        assert_eq!(regions.take_events(), vec![RegionEvent::Removed(a), RegionEvent::Removed(b)]);
    }

    #[test]
    fn test_click_events_only_for_known_regions() {
        let mut regions = ready();
        let id = regions.create_region(RegionParams::span(1.0, 2.0)).unwrap();
        regions.take_events();
        regions.click(&id);
        regions.double_click(&id);
        regions.mouse_up(&"nope".into());
        assert_eq!(
            regions.take_events(),
            vec![RegionEvent::Clicked(id.clone()), RegionEvent::DoubleClicked(id)]
        );
    }

    #[test]
    fn test_drag_to_create() {
        let mut regions = ready();
        regions.create_region(RegionParams::span(50.0, 60.0)).unwrap();
        regions.take_events();
        let mut creator = regions.enable_drag_to_create(RegionParams::default()).unwrap();
        let mut vp = Viewport::fixed(500.0);

        // Press at 100 px = 20 s, drag right 50 px = +10 s.
        let id = creator.start(&mut regions, 100.0, 500.0).unwrap().unwrap();
        let before = regions.revision();
        assert!(creator.drag(&mut regions, 50.0, 150.0, &mut vp));
        assert!(regions.take_events().is_empty());
        assert_ne!(regions.revision(), before);

        // Keep dragging right, into the existing region: clamped.
        creator.drag(&mut regions, 200.0, 350.0, &mut vp);
        assert_eq!(creator.end(&mut regions), Some(id.clone()));
        let r = regions.region(&id).unwrap();
        assert_eq!(r.start, 20.0);
        assert_eq!(r.end, 50.0 - OVERLAP_EPSILON);
        assert_eq!(regions.take_events(), vec![RegionEvent::Created(id.clone()), RegionEvent::UpdateEnd(id)]);
        assert_invariants(&regions);
    }

    #[test]
    fn test_drag_to_create_draft_shrinks_back() {
        use crate::gesture::{Bounds, GestureEvent, GestureRecognizer, PointerSample};

        let mut regions = ready();
        let mut creator = regions.enable_drag_to_create(RegionParams::default()).unwrap();
        let mut recognizer = GestureRecognizer::new(regions.config().create_gesture());
        let timeline = Bounds::new(0.0, 0.0, 500.0, 80.0);
        let mut vp = Viewport::fixed(500.0);

        // Press at 100 px (20 s), sweep right to 150 px, then back to 120 px.
        recognizer.press(0, PointerSample::mouse(100.0, 40.0, 0.0), timeline);
        let mut gestures = Vec::new();
        for (i, x) in [110.0, 150.0, 120.0].into_iter().enumerate() {
            recognizer.pointer_move(PointerSample::mouse(x, 40.0, i as f64 + 1.0), timeline, |ev| gestures.push(ev));
        }
        let mut draft = None;
        for ev in gestures {
            match ev {
                GestureEvent::Start { x, .. } => draft = creator.start(&mut regions, x, 500.0).unwrap(),
                GestureEvent::Drag { dx, x, .. } => {
                    creator.drag(&mut regions, dx, x, &mut vp);
                }
                GestureEvent::End { .. } => {}
            }
        }
        let id = draft.unwrap();
        assert_eq!(creator.end(&mut regions), Some(id.clone()));

        // 20 px past the press: 4 s.
        let r = regions.region(&id).unwrap();
        assert!((r.start - 20.0).abs() < 1e-9);
        assert!((r.end - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_to_create_discards_empty_and_inside_presses() {
        let mut regions = ready();
        regions.create_region(RegionParams::span(50.0, 60.0)).unwrap();
        let mut creator = regions.enable_drag_to_create(RegionParams::default()).unwrap();

        // Inside an existing region.
        assert_eq!(creator.start(&mut regions, 275.0, 500.0).unwrap(), None);

        // Press and release without movement.
        assert!(creator.start(&mut regions, 10.0, 500.0).unwrap().is_some());
        assert_eq!(creator.end(&mut regions), None);
        assert_eq!(regions.regions().len(), 1);

        assert!(matches!(creator.start(&mut regions, 10.0, 0.0), Err(RegionError::InvalidContainer)));
        creator.dispose(&mut regions);
    }
}
