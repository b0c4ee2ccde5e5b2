#![forbid(unsafe_code)]

//! Browser [`FocusTarget`] for the embedded rendering surface.

use gameframe_core::error::HarnessError;
use gameframe_core::focus::FocusTarget;
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlIFrameElement};

/// The iframe or canvas that should own keyboard input.
#[derive(Debug, Clone)]
pub(crate) struct DomFocusTarget {
    element: HtmlElement,
}

impl DomFocusTarget {
    pub(crate) fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl FocusTarget for DomFocusTarget {
    fn focus_outer(&self) {
        if let Err(err) = self.element.focus() {
            warn!(error = ?err, "failed to focus surface element");
        }
    }

    fn focus_nested(&self) -> Option<Result<(), HarnessError>> {
        let iframe = self.element.dyn_ref::<HtmlIFrameElement>()?;
        let window = iframe.content_window()?;
        Some(
            window
                .focus()
                .map_err(|err| HarnessError::FocusDenied(format!("{err:?}"))),
        )
    }
}
