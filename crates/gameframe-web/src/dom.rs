#![forbid(unsafe_code)]

//! Small DOM helpers shared by the wiring modules.

use std::time::Duration;

use gameframe_core::focus::Timer;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, EventTarget, Window};

pub(crate) fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global `window`"))
}

pub(crate) fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no `document` on window"))
}

/// Look up an element by id and cast it. Missing or mistyped elements yield
/// `None`.
pub(crate) fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    let element = document.get_element_by_id(id)?;
    match element.dyn_into::<T>() {
        Ok(typed) => Some(typed),
        Err(_) => {
            warn!(id, "element has an unexpected type");
            None
        }
    }
}

/// Event listener removed from its target on drop.
pub(crate) struct EventListener {
    target: EventTarget,
    event: String,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl EventListener {
    pub(crate) fn new(
        target: &EventTarget,
        event: &str,
        callback: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(callback);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event: event.to_string(),
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback(
            &self.event,
            self.callback.as_ref().unchecked_ref(),
        );
    }
}

/// [`Timer`] backed by `window.setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WindowTimer;

impl Timer for WindowTimer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let Ok(window) = window() else {
            warn!("no window; scheduled task dropped");
            return;
        };
        let callback = Closure::once_into_js(move || task());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            warn!(error = ?err, "setTimeout failed; scheduled task dropped");
        }
    }
}
