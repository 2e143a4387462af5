use std::cell::RefCell;
use std::collections::HashMap;

use leptos::prelude::*;
use wave_regions_core::autoscroll::Viewport;
use wave_regions_core::gesture::GestureEvent;
use wave_regions_core::regions::DragCreator;
use wave_regions_core::scheduler::ScheduledTask;
use wave_regions_core::{
    DragSide, HostPlayer, RegionError, RegionEvent, RegionId, RegionParams, RegionUpdate, Regions,
    RegionsConfig,
};
use web_sys::{HtmlCanvasElement, HtmlElement};

use crate::canvas::overlay_renderer;
use crate::dom::draggable::{make_draggable, Detach};
use crate::dom::region_view::RegionView;
use crate::dom::scheduler::IntervalScheduler;

/// Reactive side of the regions layer, shared through leptos context.
#[derive(Clone, Copy)]
pub struct RegionsState {
    /// Media duration in seconds, `None` until the player knows it.
    pub duration: RwSignal<Option<f64>>,
    /// Set by the host player once it can accept regions.
    pub player_ready: RwSignal<bool>,
    pub current_time: RwSignal<f64>,
    pub is_playing: RwSignal<bool>,
    pub channel_count: RwSignal<u32>,
    /// Last seek asked for by the regions layer; the player consumes it.
    pub seek_request: RwSignal<Option<f64>>,
    pub drag_to_create: RwSignal<bool>,
    /// Bumped whenever the region set or a span changed.
    pub revision: RwSignal<u32>,
    pub events: RwSignal<Vec<RegionEvent>>,
}

impl RegionsState {
    pub fn new() -> Self {
        Self {
            duration: RwSignal::new(None),
            player_ready: RwSignal::new(false),
            current_time: RwSignal::new(0.0),
            is_playing: RwSignal::new(false),
            channel_count: RwSignal::new(1),
            seek_request: RwSignal::new(None),
            drag_to_create: RwSignal::new(false),
            revision: RwSignal::new(0),
            events: RwSignal::new(Vec::new()),
        }
    }
}

impl Default for RegionsState {
    fn default() -> Self {
        Self::new()
    }
}

/// `HostPlayer` over the layer's signals. Seeks and play/pause become signal
/// writes the page's audio element follows.
pub struct SignalPlayer(pub RegionsState);

impl HostPlayer for SignalPlayer {
    fn duration(&self) -> Option<f64> {
        self.0.duration.get_untracked()
    }

    fn channel_count(&self) -> u32 {
        self.0.channel_count.get_untracked().max(1)
    }

    fn seek_to(&mut self, time: f64) {
        self.0.seek_request.set(Some(time));
        self.0.current_time.set(time);
    }

    fn play(&mut self) {
        self.0.is_playing.set(true);
    }

    fn pause(&mut self) {
        self.0.is_playing.set(false);
    }
}

// ── Runtime ──────────────────────────────────────────────────────────────────

/// DOM pieces the runtime draws into.
pub struct Surface {
    /// Scroll container; its geometry is the autoscroll viewport.
    pub scroll: HtmlElement,
    /// Full-width timeline content, parent of the region elements.
    pub content: HtmlElement,
    pub overlay: Option<HtmlCanvasElement>,
}

pub struct Runtime {
    pub regions: Regions<IntervalScheduler>,
    surface: Surface,
    state: RegionsState,
    views: HashMap<RegionId, RegionView>,
    creator: Option<(DragCreator, Detach)>,
    /// Core revision the views and overlay were last drawn at.
    rendered: Option<u64>,
}

thread_local! {
    static RUNTIME: RefCell<Option<Runtime>> = RefCell::new(None);
}

/// Install the runtime for a mounted layer, replacing any previous one.
pub fn install(config: RegionsConfig, surface: Surface, state: RegionsState) {
    let runtime = Runtime {
        regions: Regions::new(config, IntervalScheduler::new()),
        surface,
        state,
        views: HashMap::new(),
        creator: None,
        rendered: None,
    };
    let previous = RUNTIME.with(|r| r.borrow_mut().replace(runtime));
    if let Some(mut previous) = previous {
        previous.shutdown();
    }
    log::debug!("regions runtime installed");
}

pub fn uninstall() {
    let previous = RUNTIME.with(|r| r.borrow_mut().take());
    if let Some(mut previous) = previous {
        previous.shutdown();
        log::debug!("regions runtime removed");
    }
}

/// Run `f` against the installed runtime and flush the events it produced.
/// `None` when no layer is mounted or the runtime is already borrowed
/// further up the stack.
pub fn with_runtime<R>(f: impl FnOnce(&mut Runtime) -> R) -> Option<R> {
    // Views and creators are dropped outside the borrow: dropping a Detach
    // must not run while the runtime is held.
    let mut retired = Vec::new();
    let out = RUNTIME.with(|r| {
        let Ok(mut slot) = r.try_borrow_mut() else {
            log::warn!("regions runtime busy, call dropped");
            return None;
        };
        let rt = slot.as_mut()?;
        let out = f(rt);
        rt.flush(&mut retired);
        Some(out)
    });
    drop(retired);
    out
}

fn not_mounted() -> RegionError {
    log::error!("no regions layer is mounted");
    RegionError::HostNotReady
}

// ── Operations used by the DOM bindings and the component ────────────────────

pub fn host_ready(duration: Option<f64>) {
    with_runtime(|rt| rt.regions.host_ready(duration));
}

pub fn set_duration(duration: f64) {
    with_runtime(|rt| rt.regions.set_duration(duration));
}

pub fn create_region(params: RegionParams) -> Result<RegionId, RegionError> {
    with_runtime(|rt| rt.regions.create_region(params)).unwrap_or_else(|| Err(not_mounted()))
}

pub fn update_region(id: &RegionId, update: RegionUpdate) -> Result<(), RegionError> {
    with_runtime(|rt| rt.regions.update_region(id, update)).unwrap_or_else(|| Err(not_mounted()))
}

pub fn remove_region(id: &RegionId) -> Result<(), RegionError> {
    with_runtime(|rt| rt.regions.remove_region(id).map(|_| ())).unwrap_or_else(|| Err(not_mounted()))
}

pub fn clear_all() {
    with_runtime(|rt| rt.regions.clear_all());
}

pub fn play_region(id: &RegionId) -> Result<(), RegionError> {
    with_runtime(|rt| {
        let mut player = SignalPlayer(rt.state);
        rt.regions.play_region(id, &mut player)
    })
    .unwrap_or_else(|| Err(not_mounted()))
}

pub fn time_update(time: f64) {
    with_runtime(|rt| {
        let mut player = SignalPlayer(rt.state);
        rt.regions.time_update(time, &mut player);
    });
}

pub fn drag(id: &RegionId, dx: f64, side: DragSide) {
    with_runtime(|rt| {
        let mut viewport = rt.viewport();
        rt.regions.drag(id, dx, side, &mut viewport);
        rt.apply_viewport(&viewport);
    });
}

pub fn end_drag(id: &RegionId) {
    with_runtime(|rt| rt.regions.end_drag(id));
}

pub fn run_task(task: &ScheduledTask) {
    with_runtime(|rt| {
        let mut viewport = rt.viewport();
        rt.regions.run_task(task, &mut viewport);
        rt.apply_viewport(&viewport);
    });
}

pub fn click(id: &RegionId) {
    with_runtime(|rt| rt.regions.click(id));
}

pub fn double_click(id: &RegionId) {
    with_runtime(|rt| rt.regions.double_click(id));
}

pub fn mouse_up(id: &RegionId) {
    with_runtime(|rt| rt.regions.mouse_up(id));
}

/// Redraw views and overlay on the next flush, e.g. after a layout change.
pub fn refresh() {
    with_runtime(|rt| rt.rendered = None);
}

/// Switch drag-to-create on or off.
pub fn set_drag_to_create(enabled: bool) -> Result<(), RegionError> {
    if !enabled {
        // Detach is dropped by with_runtime after the borrow ends.
        with_runtime(|rt| rt.disable_creator());
        return Ok(());
    }
    with_runtime(|rt| rt.enable_creator()).unwrap_or_else(|| Err(not_mounted()))
}

// ── Drag-to-create callbacks ─────────────────────────────────────────────────

fn creator_start(x: f64) {
    with_runtime(|rt| {
        let width = rt.viewport().scroll_width;
        let Some((creator, _)) = rt.creator.as_mut() else { return };
        match creator.start(&mut rt.regions, x, width) {
            Ok(Some(id)) => log::debug!("drafting region {id}"),
            Ok(None) => {}
            Err(e) => log::warn!("drag-to-create start failed: {e}"),
        }
    });
}

fn creator_drag(dx: f64, x: f64) {
    with_runtime(|rt| {
        let mut viewport = rt.viewport();
        let Some((creator, _)) = rt.creator.as_mut() else { return };
        creator.drag(&mut rt.regions, dx, x, &mut viewport);
        rt.apply_viewport(&viewport);
    });
}

fn creator_end() {
    with_runtime(|rt| {
        let Some((creator, _)) = rt.creator.as_mut() else { return };
        creator.end(&mut rt.regions);
    });
}

impl Runtime {
    pub fn state(&self) -> RegionsState {
        self.state
    }

    fn viewport(&self) -> Viewport {
        let scroll = &self.surface.scroll;
        Viewport::new(
            scroll.scroll_left() as f64,
            scroll.client_width() as f64,
            scroll.scroll_width() as f64,
        )
    }

    fn apply_viewport(&self, viewport: &Viewport) {
        let scroll = &self.surface.scroll;
        let target = viewport.scroll_left.round() as i32;
        if scroll.scroll_left() != target {
            scroll.set_scroll_left(target);
        }
    }

    fn enable_creator(&mut self) -> Result<(), RegionError> {
        if self.creator.is_some() {
            return Ok(());
        }
        let creator = self.regions.enable_drag_to_create(RegionParams::default())?;
        let gesture = self.regions.config().create_gesture();
        let detach = make_draggable(Some(&self.surface.content), gesture, |ev| match ev {
            GestureEvent::Start { x, .. } => creator_start(x),
            GestureEvent::Drag { dx, x, .. } => creator_drag(dx, x),
            GestureEvent::End { .. } => creator_end(),
        });
        self.creator = Some((creator, detach));
        log::debug!("drag-to-create enabled");
        Ok(())
    }

    fn disable_creator(&mut self) -> Option<Detach> {
        let (creator, detach) = self.creator.take()?;
        creator.dispose(&mut self.regions);
        log::debug!("drag-to-create disabled");
        Some(detach)
    }

    /// Drain queued events into views, the overlay and the event signal.
    fn flush(&mut self, retired: &mut Vec<RegionView>) {
        let revision = self.regions.revision();
        if self.rendered != Some(revision) {
            self.sync_views(retired);
            self.draw_overlay();
            self.rendered = Some(revision);
            self.state.revision.update(|n| *n = n.wrapping_add(1));
        }
        let events = self.regions.take_events();
        if !events.is_empty() {
            self.state.events.update(|queue| queue.extend(events));
        }
    }

    fn sync_views(&mut self, retired: &mut Vec<RegionView>) {
        let gone: Vec<RegionId> = self
            .views
            .keys()
            .filter(|id| self.regions.region(id).is_none())
            .cloned()
            .collect();
        for id in gone {
            if let Some(view) = self.views.remove(&id) {
                view.unmount();
                retired.push(view);
            }
        }

        let config = self.regions.config();
        let channels = SignalPlayer(self.state).channel_count();
        for region in self.regions.regions() {
            match self.views.get(&region.id) {
                Some(view) => view.render(region, channels),
                None => match RegionView::mount(&self.surface.content, region, config, channels) {
                    Some(view) => {
                        self.views.insert(region.id.clone(), view);
                    }
                    None => log::warn!("could not create element for region {}", region.id),
                },
            }
        }
    }

    fn draw_overlay(&self) {
        let Some(canvas) = self.surface.overlay.as_ref() else { return };
        let overlay = &self.regions.config().overlay;
        overlay_renderer::draw(canvas, &self.regions.overlay(), &overlay.covered_color, &overlay.uncovered_color);
    }

    fn shutdown(&mut self) {
        if let Some((creator, _detach)) = self.creator.take() {
            creator.dispose(&mut self.regions);
        }
        self.regions.clear_all();
        for (_, view) in self.views.drain() {
            view.unmount();
        }
    }
}
