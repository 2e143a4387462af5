use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wave_regions_core::gesture::{GestureEvent, LockSide};
use wave_regions_core::{Channel, DragSide, Region, RegionId, RegionsConfig};
use web_sys::{HtmlElement, MouseEvent};

use super::draggable::{make_draggable, Detach};
use crate::state;

const HANDLE_WIDTH_PX: u32 = 2;

/// The element showing one region, with its handles and listeners.
pub struct RegionView {
    element: HtmlElement,
    handles: [HtmlElement; 2],
    _drags: Vec<Detach>,
    listeners: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
}

fn create_div(class: &str) -> Option<HtmlElement> {
    let document = web_sys::window()?.document()?;
    let el = document.create_element("div").ok()?.dyn_into::<HtmlElement>().ok()?;
    el.set_class_name(class);
    Some(el)
}

fn set_styles(el: &HtmlElement, styles: &[(&str, &str)]) {
    let style = el.style();
    for (name, value) in styles {
        let _ = style.set_property(name, value);
    }
}

/// Gesture callback forwarding one side of a region drag to the runtime.
fn drag_callback(id: RegionId, side: DragSide) -> impl FnMut(GestureEvent) + 'static {
    move |ev| match ev {
        GestureEvent::Start { .. } => {}
        GestureEvent::Drag { dx, .. } => state::drag(&id, dx, side),
        GestureEvent::End { .. } => state::end_drag(&id),
    }
}

impl RegionView {
    /// Build the element for `region` and append it to `parent`.
    pub fn mount(parent: &HtmlElement, region: &Region, config: &RegionsConfig, channels: u32) -> Option<Self> {
        let element = create_div("wave-region")?;
        let _ = element.set_attribute("data-id", region.id.as_str());
        set_styles(&element, &[
            ("position", "absolute"),
            ("top", "0"),
            ("height", "100%"),
            ("cursor", "move"),
            ("touch-action", "pan-y"),
            ("box-sizing", "border-box"),
        ]);

        let width = format!("{HANDLE_WIDTH_PX}px");
        let start = create_div("wave-region-handle wave-region-handle-start")?;
        let end = create_div("wave-region-handle wave-region-handle-end")?;
        for (handle, edge) in [(&start, "left"), (&end, "right")] {
            set_styles(handle, &[
                ("position", "absolute"),
                ("top", "0"),
                (edge, "0"),
                ("width", width.as_str()),
                ("height", "100%"),
                ("cursor", "ew-resize"),
                ("background", "rgba(0, 0, 0, 0.5)"),
                ("touch-action", "none"),
            ]);
            let _ = element.append_child(handle);
        }

        let id = region.id.clone();
        let drags = vec![
            make_draggable(Some(&element), config.move_gesture(), drag_callback(id.clone(), DragSide::Move)),
            make_draggable(
                Some(&start),
                config.handle_gesture(LockSide::Start),
                drag_callback(id.clone(), DragSide::ResizeStart),
            ),
            make_draggable(
                Some(&end),
                config.handle_gesture(LockSide::End),
                drag_callback(id.clone(), DragSide::ResizeEnd),
            ),
        ];

        let mut listeners = Vec::new();
        let events: [(&'static str, fn(&RegionId)); 3] = [
            ("click", state::click),
            ("dblclick", state::double_click),
            ("mouseup", state::mouse_up),
        ];
        for (name, forward) in events {
            let closure_id = id.clone();
            let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
                ev.stop_propagation();
                forward(&closure_id);
            });
            if let Err(e) = element.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref()) {
                log::error!("failed to bind {name} on region {id}: {:?}", e);
            }
            listeners.push((name, closure));
        }

        if let Err(e) = parent.append_child(&element) {
            log::error!("failed to attach region {}: {:?}", region.id, e);
            return None;
        }

        let view = Self { element, handles: [start, end], _drags: drags, listeners };
        view.render(region, channels);
        Some(view)
    }

    /// Sync position and appearance with `region`. Channel rows split the
    /// height evenly across `channels`.
    pub fn render(&self, region: &Region, channels: u32) {
        let left = format!("{:.4}%", region.start_percent());
        let right = format!("{:.4}%", region.right_percent());
        let (top, height) = match region.channel {
            Channel::Index(n) if channels > 1 && n < channels => {
                let row = 100.0 / channels as f64;
                (format!("{:.4}%", row * n as f64), format!("{row:.4}%"))
            }
            _ => ("0".to_string(), "100%".to_string()),
        };

        let marker = region.is_marker();
        let background = if marker { "none" } else { region.color.as_str() };
        let border = if marker { format!("2px solid {}", region.color) } else { "none".to_string() };
        set_styles(&self.element, &[
            ("left", left.as_str()),
            ("right", right.as_str()),
            ("top", top.as_str()),
            ("height", height.as_str()),
            ("background", background),
            ("border-left", border.as_str()),
            ("cursor", if region.drag { "move" } else { "default" }),
        ]);
        let _ = self.element.class_list().toggle_with_force("wave-region-marker", marker);
        match region.content.as_deref() {
            Some(content) => self.element.set_title(content),
            None => self.element.set_title(""),
        }

        let flags = [region.resize && region.resize_start, region.resize && region.resize_end];
        for (handle, enabled) in self.handles.iter().zip(flags) {
            let display = if enabled && !marker { "block" } else { "none" };
            let _ = handle.style().set_property("display", display);
        }
    }

    /// Take the element out of the page. Listeners go with the view.
    pub fn unmount(&self) {
        self.element.remove();
    }
}

impl Drop for RegionView {
    fn drop(&mut self) {
        for (name, closure) in &self.listeners {
            let _ = self
                .element
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}
