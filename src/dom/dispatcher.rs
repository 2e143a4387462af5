//! One set of document-level input listeners shared by every draggable.
//!
//! Elements only listen for the press. Moves and releases are caught on the
//! document so a drag keeps tracking after the pointer leaves the element.
//! Only open sessions are subscribed; a draggable joins on an accepted press
//! and leaves on release.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wave_regions_core::gesture::{Bounds, PointerKind, PointerSample};
use wave_regions_core::RegionsConfig;
use web_sys::{AddEventListenerOptions, Event, HtmlElement, PointerEvent, TouchEvent};

pub enum DocumentInput {
    Move(PointerSample),
    /// Pointer released, cancelled, or gone out of the window.
    Release(PointerSample),
    /// Raw touchmove, so an active drag can block page scrolling.
    TouchMove(TouchEvent),
}

type Handler = Rc<dyn Fn(&DocumentInput)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription(u64);

/// Handlers of the currently open gesture sessions.
pub struct Subscribers<H> {
    entries: Vec<(Subscription, H)>,
    next_id: u64,
}

impl<H: Clone> Subscribers<H> {
    pub fn new() -> Self {
        Self { entries: Vec::new(), next_id: 0 }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subscribe(&mut self, handler: H) -> Subscription {
        self.next_id += 1;
        let id = Subscription(self.next_id);
        self.entries.push((id, handler));
        id
    }

    /// Returns whether `id` was still subscribed.
    pub fn unsubscribe(&mut self, id: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(s, _)| *s != id);
        self.entries.len() != before
    }

    /// Handlers to run for one input. Taken up front so a handler can
    /// subscribe or unsubscribe while the input is being dispatched.
    pub fn snapshot(&self) -> Vec<H> {
        self.entries.iter().map(|(_, h)| h.clone()).collect()
    }
}

impl<H: Clone> Default for Subscribers<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a `pointerout` sent the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerOutTarget {
    /// Out of the window.
    Nothing,
    /// Onto the page root element.
    PageRoot,
    Element,
}

impl PointerOutTarget {
    pub fn ends_session(self) -> bool {
        !matches!(self, PointerOutTarget::Element)
    }
}

struct Dispatcher {
    /// Kept alive for as long as the page lives.
    _listeners: Vec<Closure<dyn FnMut(Event)>>,
    subscribers: Subscribers<Handler>,
    click_guard_ms: u32,
    /// Swallow clicks until the guard timeout fires.
    guarding: bool,
}

thread_local! {
    static DISPATCHER: RefCell<Option<Dispatcher>> = RefCell::new(None);
}

pub fn pointer_sample(ev: &PointerEvent) -> PointerSample {
    PointerSample {
        x: ev.client_x() as f64,
        y: ev.client_y() as f64,
        time_ms: ev.time_stamp(),
        kind: PointerKind::from_pointer_type(&ev.pointer_type()),
    }
}

pub fn bounds_of(el: &HtmlElement) -> Bounds {
    let rect = el.get_bounding_client_rect();
    Bounds::new(rect.left(), rect.top(), rect.width(), rect.height())
}

/// Install the document listeners. Later calls only update the click guard.
pub fn install(click_guard_ms: u32) {
    let installed = DISPATCHER.with(|d| {
        let mut d = d.borrow_mut();
        if let Some(d) = d.as_mut() {
            d.click_guard_ms = click_guard_ms;
            true
        } else {
            false
        }
    });
    if installed {
        return;
    }

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        log::error!("no document, input dispatcher not installed");
        return;
    };

    let mut listeners = Vec::new();
    let mut listen = |name: &str, options: &AddEventListenerOptions, f: Box<dyn FnMut(Event)>| {
        let closure = Closure::wrap(f);
        let added = document.add_event_listener_with_callback_and_add_event_listener_options(
            name,
            closure.as_ref().unchecked_ref(),
            options,
        );
        if let Err(e) = added {
            log::error!("failed to listen for {name}: {:?}", e);
        }
        listeners.push(closure);
    };

    let plain = AddEventListenerOptions::new();
    let active = AddEventListenerOptions::new();
    active.set_passive(false);
    let capture = AddEventListenerOptions::new();
    capture.set_capture(true);

    listen("pointermove", &plain, Box::new(|ev: Event| {
        if let Some(ev) = ev.dyn_ref::<PointerEvent>() {
            dispatch(&DocumentInput::Move(pointer_sample(ev)));
        }
    }));
    for name in ["pointerup", "pointercancel"] {
        listen(name, &plain, Box::new(|ev: Event| {
            if let Some(ev) = ev.dyn_ref::<PointerEvent>() {
                dispatch(&DocumentInput::Release(pointer_sample(ev)));
            }
        }));
    }
    listen("pointerout", &plain, Box::new(|ev: Event| {
        if let Some(ev) = ev.dyn_ref::<PointerEvent>() {
            if pointer_out_target(ev).ends_session() {
                dispatch(&DocumentInput::Release(pointer_sample(ev)));
            }
        }
    }));
    listen("touchmove", &active, Box::new(|ev: Event| {
        if let Ok(ev) = ev.dyn_into::<TouchEvent>() {
            dispatch(&DocumentInput::TouchMove(ev));
        }
    }));
    listen("click", &capture, Box::new(|ev: Event| {
        if is_guarding() {
            ev.stop_propagation();
            ev.prevent_default();
        }
    }));

    DISPATCHER.with(|d| {
        *d.borrow_mut() = Some(Dispatcher {
            _listeners: listeners,
            subscribers: Subscribers::new(),
            click_guard_ms,
            guarding: false,
        });
    });
    log::debug!("input dispatcher installed");
}

fn pointer_out_target(ev: &PointerEvent) -> PointerOutTarget {
    let Some(target) = ev.related_target() else { return PointerOutTarget::Nothing };
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element());
    if root.is_some_and(|root| JsValue::from(root) == JsValue::from(target)) {
        PointerOutTarget::PageRoot
    } else {
        PointerOutTarget::Element
    }
}

pub fn subscribe(handler: Handler) -> Subscription {
    install_default();
    DISPATCHER.with(|d| {
        let mut d = d.borrow_mut();
        match d.as_mut() {
            Some(d) => d.subscribers.subscribe(handler),
            None => Subscription(0),
        }
    })
}

pub fn unsubscribe(id: Subscription) {
    DISPATCHER.with(|d| {
        if let Some(d) = d.borrow_mut().as_mut() {
            d.subscribers.unsubscribe(id);
        }
    });
}

fn install_default() {
    let missing = DISPATCHER.with(|d| d.borrow().is_none());
    if missing {
        install(RegionsConfig::default().click_guard_ms);
    }
}

fn dispatch(input: &DocumentInput) {
    let handlers: Vec<Handler> =
        DISPATCHER.with(|d| d.borrow().as_ref().map(|d| d.subscribers.snapshot()).unwrap_or_default());
    for handler in handlers {
        handler(input);
    }
}

fn is_guarding() -> bool {
    DISPATCHER.with(|d| d.borrow().as_ref().is_some_and(|d| d.guarding))
}

/// A drag just ended: swallow the click the browser is about to fire.
pub fn arm_click_guard() {
    let ms = DISPATCHER.with(|d| {
        let mut d = d.borrow_mut();
        let d = d.as_mut()?;
        d.guarding = true;
        Some(d.click_guard_ms)
    });
    let Some(ms) = ms else { return };
    let Some(win) = web_sys::window() else { return };
    let cb = Closure::once_into_js(move || {
        DISPATCHER.with(|d| {
            if let Some(d) = d.borrow_mut().as_mut() {
                d.guarding = false;
            }
        });
    });
    let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms as i32);
}
