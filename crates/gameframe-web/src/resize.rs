#![forbid(unsafe_code)]

//! `ResizeObserver` binding that keeps the surface at 16:9 inside its
//! container.

use std::cell::RefCell;
use std::rc::Rc;

use gameframe_core::resize::{ResizeController, css_px};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, ResizeObserver};

fn apply_fit(
    container: &HtmlElement,
    surface: &HtmlElement,
    controller: &RefCell<ResizeController>,
) {
    let fit = controller.borrow_mut().recompute(
        f64::from(container.client_width()),
        f64::from(container.client_height()),
    );
    let style = surface.style();
    if let Err(err) = style
        .set_property("width", &css_px(fit.width))
        .and_then(|()| style.set_property("height", &css_px(fit.height)))
    {
        warn!(error = ?err, "failed to apply surface size");
    }
}

/// Live observation of one container. Disconnects on drop.
pub(crate) struct ResizeBinding {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, ResizeObserver)>,
}

impl ResizeBinding {
    /// Fit once immediately, then on every observed container resize.
    pub(crate) fn attach(container: HtmlElement, surface: HtmlElement) -> Result<Self, JsValue> {
        let controller = Rc::new(RefCell::new(ResizeController::default()));
        apply_fit(&container, &surface, &controller);

        let observed = container.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array, ResizeObserver)>::new(
            move |_entries: js_sys::Array, _observer: ResizeObserver| {
                apply_fit(&observed, &surface, &controller);
            },
        );
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(&container);

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for ResizeBinding {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
