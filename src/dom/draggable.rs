use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wave_regions_core::gesture::{GestureConfig, GestureEvent, GestureRecognizer};
use web_sys::{HtmlElement, PointerEvent};

use super::dispatcher::{self, bounds_of, pointer_sample, DocumentInput, Subscription};

/// Detaches a draggable binding when dropped.
pub struct Detach {
    inner: Option<Attached>,
}

struct Attached {
    binding: Rc<Binding>,
    on_down: Closure<dyn FnMut(PointerEvent)>,
}

impl Detach {
    pub fn is_attached(&self) -> bool {
        self.inner.is_some()
    }

    /// Same as dropping the handle.
    pub fn detach(self) {}
}

impl Drop for Detach {
    fn drop(&mut self) {
        let Some(attached) = self.inner.take() else { return };
        let binding = &attached.binding;
        let _ = binding
            .element
            .remove_event_listener_with_callback("pointerdown", attached.on_down.as_ref().unchecked_ref());
        if let Ok(mut recognizer) = binding.recognizer.try_borrow_mut() {
            recognizer.cancel();
        }
        binding.end_session();
    }
}

/// State shared by the press listener and the session's document handler.
struct Binding {
    element: HtmlElement,
    recognizer: RefCell<GestureRecognizer>,
    on_event: RefCell<Box<dyn FnMut(GestureEvent)>>,
    /// Dispatcher subscription held while a press is open.
    session: Cell<Option<Subscription>>,
}

impl Binding {
    fn emit(&self, event: GestureEvent) {
        (&mut *self.on_event.borrow_mut())(event);
    }

    fn begin_session(self: &Rc<Self>) {
        self.end_session();
        let binding = Rc::clone(self);
        let id = dispatcher::subscribe(Rc::new(move |input: &DocumentInput| binding.handle(input)));
        self.session.set(Some(id));
    }

    fn end_session(&self) {
        if let Some(id) = self.session.take() {
            dispatcher::unsubscribe(id);
        }
    }

    fn handle(&self, input: &DocumentInput) {
        match input {
            DocumentInput::Move(sample) => {
                let mut events = Vec::new();
                self.recognizer
                    .borrow_mut()
                    .pointer_move(*sample, bounds_of(&self.element), |e| events.push(e));
                for e in events {
                    self.emit(e);
                }
            }
            DocumentInput::Release(sample) => {
                let end = self.recognizer.borrow_mut().release(*sample, bounds_of(&self.element));
                self.end_session();
                if let Some(e) = end {
                    dispatcher::arm_click_guard();
                    self.emit(e);
                }
            }
            DocumentInput::TouchMove(ev) => {
                if self.recognizer.borrow().is_dragging() {
                    ev.prevent_default();
                }
            }
        }
    }
}

/// Turn presses on `element` into gesture events. A missing element gives
/// an inert binding. Document moves are only followed between an accepted
/// press and its release.
pub fn make_draggable(
    element: Option<&HtmlElement>,
    config: GestureConfig,
    on_event: impl FnMut(GestureEvent) + 'static,
) -> Detach {
    let Some(element) = element else {
        log::warn!("make_draggable: no element to bind");
        return Detach { inner: None };
    };

    let binding = Rc::new(Binding {
        element: element.clone(),
        recognizer: RefCell::new(GestureRecognizer::new(config)),
        on_event: RefCell::new(Box::new(on_event)),
        session: Cell::new(None),
    });

    let b = Rc::clone(&binding);
    let on_down = Closure::<dyn FnMut(PointerEvent)>::new(move |ev: PointerEvent| {
        let accepted = b.recognizer.borrow_mut().press(ev.button(), pointer_sample(&ev), bounds_of(&b.element));
        if accepted {
            // Nested draggables (resize handles inside a region) win.
            ev.stop_propagation();
            b.begin_session();
        }
    });
    if let Err(e) = element.add_event_listener_with_callback("pointerdown", on_down.as_ref().unchecked_ref()) {
        log::error!("failed to bind pointerdown: {:?}", e);
        return Detach { inner: None };
    }

    Detach { inner: Some(Attached { binding, on_down }) }
}
