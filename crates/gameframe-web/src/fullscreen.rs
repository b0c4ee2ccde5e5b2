#![forbid(unsafe_code)]

//! Browser implementation of [`FullscreenAdapter`].
//!
//! Method and property names are probed through `Reflect` in
//! [`VENDOR_APIS`] order rather than through typed bindings, since the
//! prefixed variants have no `web-sys` bindings.

use std::rc::Rc;

use gameframe_core::error::HarnessError;
use gameframe_core::fullscreen::{FullscreenAdapter, RequestFuture, VENDOR_APIS, probe_first};
use js_sys::{Function, Promise, Reflect};
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element};

use crate::dom::EventListener;

fn js_error_message(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"))
}

/// Fullscreen primitives of one document.
#[derive(Debug, Clone)]
pub(crate) struct DomFullscreenAdapter {
    document: Document,
}

impl DomFullscreenAdapter {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }

    /// Register `handler` for every vendor change event. Dropping the returned
    /// listeners unsubscribes.
    pub(crate) fn on_change(
        &self,
        handler: Rc<dyn Fn()>,
    ) -> Result<Vec<EventListener>, JsValue> {
        VENDOR_APIS
            .iter()
            .map(|api| {
                let handler = Rc::clone(&handler);
                EventListener::new(&self.document, api.change_event, move |_event| handler())
            })
            .collect()
    }
}

impl FullscreenAdapter for DomFullscreenAdapter {
    type Element = Element;

    fn request_fullscreen(&self, element: &Element) -> RequestFuture {
        let method = probe_first(|api| {
            Reflect::get(element, &JsValue::from_str(api.request_method))
                .ok()
                .and_then(|value| value.dyn_into::<Function>().ok())
                .map(|function| (api.request_method, function))
        });

        let Some((name, function)) = method else {
            return Box::pin(async { Err(HarnessError::FullscreenUnsupported) });
        };
        debug!(method = name, "invoking fullscreen request");

        let returned = match function.call0(element) {
            Ok(value) => value,
            Err(err) => {
                let msg = js_error_message(&err);
                return Box::pin(async move { Err(HarnessError::FullscreenRequestRejected(msg)) });
            }
        };

        // Legacy prefixed methods return `undefined` instead of a Promise.
        match returned.dyn_into::<Promise>() {
            Ok(promise) => Box::pin(async move {
                JsFuture::from(promise)
                    .await
                    .map(|_| ())
                    .map_err(|err| HarnessError::FullscreenRequestRejected(js_error_message(&err)))
            }),
            Err(_) => Box::pin(async { Ok(()) }),
        }
    }

    fn current_fullscreen_element(&self) -> Option<Element> {
        probe_first(|api| {
            Reflect::get(&self.document, &JsValue::from_str(api.element_property))
                .ok()
                .and_then(|value| value.dyn_into::<Element>().ok())
        })
    }
}
