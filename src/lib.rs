//! Browser binding for `wave-regions-core`: DOM input, timers, region
//! elements and the overlay canvas, plus a small JS-facing API.

pub mod canvas;
pub mod components;
pub mod dom;
pub mod state;

use std::cell::RefCell;

use leptos::prelude::*;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wave_regions_core::{DragSide, RegionEvent, RegionId, RegionParams, RegionsConfig};

use crate::components::regions_layer::RegionsLayer;
use crate::state::RegionsState;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}

// ── JS API ───────────────────────────────────────────────────────────────────

thread_local! {
    /// Signals of the layer mounted through [`mount_regions`].
    static HOST: RefCell<Option<RegionsState>> = RefCell::new(None);
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

fn host() -> Result<RegionsState, JsValue> {
    HOST.with(|h| *h.borrow())
        .ok_or_else(|| js_error("regions layer not mounted; call mount_regions first"))
}

#[derive(Serialize)]
struct RegionRecord<'a> {
    id: &'a str,
    start: f64,
    end: f64,
    color: &'a str,
    content: Option<&'a str>,
}

#[derive(Serialize)]
struct EventRecord<'a> {
    event: &'static str,
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    side: Option<&'static str>,
}

fn event_record(event: &RegionEvent) -> EventRecord<'_> {
    let (name, side) = match event {
        RegionEvent::Created(_) => ("region-created", None),
        RegionEvent::Updated { side, .. } => (
            "region-updated",
            side.map(|s| match s {
                DragSide::Move => "move",
                DragSide::ResizeStart => "start",
                DragSide::ResizeEnd => "end",
            }),
        ),
        RegionEvent::UpdateEnd(_) => ("region-update-end", None),
        RegionEvent::Removed(_) => ("region-removed", None),
        RegionEvent::Clicked(_) => ("region-click", None),
        RegionEvent::DoubleClicked(_) => ("region-dblclick", None),
        RegionEvent::MouseUp(_) => ("region-mouseup", None),
        RegionEvent::In(_) => ("region-in", None),
        RegionEvent::Out(_) => ("region-out", None),
    };
    EventRecord { event: name, id: event.region_id().as_str(), side }
}

/// Mount a regions layer into the page body. `config_json` overrides any
/// subset of the defaults.
#[wasm_bindgen]
pub fn mount_regions(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(json) => RegionsConfig::from_json(json).map_err(js_error)?,
        None => RegionsConfig::default(),
    };
    let state = RegionsState::new();
    HOST.with(|h| *h.borrow_mut() = Some(state));

    leptos::mount::mount_to_body(move || {
        provide_context(state);
        view! { <RegionsLayer config=config /> }
    });
    Ok(())
}

/// The player can take regions now; `duration` may still be unknown.
#[wasm_bindgen]
pub fn player_ready(duration: Option<f64>) -> Result<(), JsValue> {
    let state = host()?;
    if duration.is_some() {
        state.duration.set(duration);
    }
    state.player_ready.set(true);
    Ok(())
}

#[wasm_bindgen]
pub fn set_duration(duration: f64) -> Result<(), JsValue> {
    host()?.duration.set(Some(duration));
    Ok(())
}

#[wasm_bindgen]
pub fn set_channel_count(channels: u32) -> Result<(), JsValue> {
    host()?.channel_count.set(channels.max(1));
    Ok(())
}

/// Feed the player's current time (seconds).
#[wasm_bindgen]
pub fn time_update(time: f64) -> Result<(), JsValue> {
    host()?.current_time.set(time);
    Ok(())
}

/// Seek the layer asked for since the last call, if any.
#[wasm_bindgen]
pub fn take_seek_request() -> Result<Option<f64>, JsValue> {
    let state = host()?;
    let request = state.seek_request.get_untracked();
    if request.is_some() {
        state.seek_request.set(None);
    }
    Ok(request)
}

#[wasm_bindgen]
pub fn is_playing() -> Result<bool, JsValue> {
    Ok(host()?.is_playing.get_untracked())
}

#[wasm_bindgen]
pub fn set_playing(playing: bool) -> Result<(), JsValue> {
    host()?.is_playing.set(playing);
    Ok(())
}

#[wasm_bindgen]
pub fn set_drag_to_create(enabled: bool) -> Result<(), JsValue> {
    host()?.drag_to_create.set(enabled);
    Ok(())
}

/// Create a region from JSON parameters. Returns its id.
#[wasm_bindgen]
pub fn add_region(params_json: &str) -> Result<String, JsValue> {
    let params: RegionParams = serde_json::from_str(params_json).map_err(js_error)?;
    state::create_region(params).map(|id| id.to_string()).map_err(js_error)
}

#[wasm_bindgen]
pub fn update_region(id: &str, update_json: &str) -> Result<(), JsValue> {
    let update = serde_json::from_str(update_json).map_err(js_error)?;
    state::update_region(&RegionId::new(id), update).map_err(js_error)
}

#[wasm_bindgen]
pub fn remove_region(id: &str) -> Result<(), JsValue> {
    state::remove_region(&RegionId::new(id)).map_err(js_error)
}

#[wasm_bindgen]
pub fn play_region(id: &str) -> Result<(), JsValue> {
    state::play_region(&RegionId::new(id)).map_err(js_error)
}

#[wasm_bindgen]
pub fn clear_regions() {
    state::clear_all();
}

/// All regions in timeline order, as a JSON array.
#[wasm_bindgen]
pub fn regions_json() -> Result<String, JsValue> {
    state::with_runtime(|rt| {
        let records: Vec<RegionRecord> = rt
            .regions
            .regions()
            .iter()
            .map(|r| RegionRecord {
                id: r.id.as_str(),
                start: r.start,
                end: r.end,
                color: &r.color,
                content: r.content.as_deref(),
            })
            .collect();
        serde_json::to_string(&records)
    })
    .ok_or_else(|| js_error("regions layer not mounted"))?
    .map_err(js_error)
}

/// Drain queued region events as a JSON array.
#[wasm_bindgen]
pub fn take_events() -> Result<String, JsValue> {
    let state = host()?;
    let mut events = Vec::new();
    state.events.update(|queue| events = std::mem::take(queue));
    let records: Vec<EventRecord> = events.iter().map(event_record).collect();
    serde_json::to_string(&records).map_err(js_error)
}
