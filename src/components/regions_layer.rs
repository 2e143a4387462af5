use leptos::prelude::*;
use wave_regions_core::{RegionParams, RegionsConfig};
use web_sys::{HtmlCanvasElement, HtmlElement};

use crate::dom::dispatcher;
use crate::state::{self, RegionsState, Surface};

/// Scrollable timeline surface hosting the regions and their overlay.
///
/// Expects a [`RegionsState`] in context; the host player drives
/// `duration`, `player_ready` and `current_time` and follows
/// `seek_request` / `is_playing`.
#[component]
pub fn RegionsLayer(
    #[prop(optional)] config: Option<RegionsConfig>,
    /// Created as soon as the player is ready.
    #[prop(optional)] initial: Vec<RegionParams>,
    /// Content width as a multiple of the visible width.
    #[prop(into, default = Signal::stored(1.0))] zoom: Signal<f64>,
) -> impl IntoView {
    let state = expect_context::<RegionsState>();
    let scroll_ref = NodeRef::<leptos::html::Div>::new();
    let content_ref = NodeRef::<leptos::html::Div>::new();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let config = config.unwrap_or_default();
    let click_guard_ms = config.click_guard_ms;
    let config = StoredValue::new(config);
    let initial = StoredValue::new(initial);
    let mounted = RwSignal::new(false);

    // Install the runtime once the nodes exist
    Effect::new(move || {
        let (Some(scroll), Some(content)) = (scroll_ref.get(), content_ref.get()) else { return };
        if mounted.get_untracked() {
            return;
        }
        let overlay: Option<HtmlCanvasElement> = canvas_ref.get();
        let surface = Surface {
            scroll: HtmlElement::from(scroll),
            content: HtmlElement::from(content),
            overlay,
        };
        dispatcher::install(click_guard_ms);
        state::install(config.get_value(), surface, state);
        mounted.set(true);
    });
    on_cleanup(move || state::uninstall());

    // Player readiness and duration
    Effect::new(move || {
        let ready = state.player_ready.get();
        let duration = state.duration.get();
        if !mounted.get() || !ready {
            return;
        }
        state::host_ready(duration);

        let mut pending = Vec::new();
        initial.update_value(|v| pending = std::mem::take(v));
        for params in pending {
            if let Err(e) = state::create_region(params) {
                log::error!("initial region rejected: {e}");
            }
        }
    });

    // Playhead
    Effect::new(move || {
        let t = state.current_time.get();
        if mounted.get_untracked() {
            state::time_update(t);
        }
    });

    Effect::new(move || {
        let enabled = state.drag_to_create.get();
        if !mounted.get() {
            return;
        }
        if let Err(e) = state::set_drag_to_create(enabled) {
            log::error!("drag-to-create unavailable: {e}");
        }
    });

    // Layout changes: canvas size and channel rows
    Effect::new(move || {
        let _ = zoom.get();
        let _ = state.channel_count.get();
        if mounted.get_untracked() {
            state::refresh();
        }
    });

    let content_style = move || {
        format!(
            "position: relative; height: 100%; width: {:.2}%;",
            zoom.get().max(1.0) * 100.0
        )
    };

    view! {
        <div
            class="regions-scroll"
            node_ref=scroll_ref
            style="position: relative; overflow-x: auto; overflow-y: hidden; height: 100%;"
        >
            <div class="regions-content" node_ref=content_ref style=content_style>
                <canvas
                    class="regions-overlay"
                    node_ref=canvas_ref
                    style="position: absolute; left: 0; top: 0; width: 100%; height: 100%; pointer-events: none;"
                />
            </div>
        </div>
    }
}
