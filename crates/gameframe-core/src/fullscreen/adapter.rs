#![forbid(unsafe_code)]

//! One capability surface over the four vendor fullscreen APIs.
//!
//! Browsers expose the same three things under different names: a request
//! method on the element, a document property naming the current fullscreen
//! element, and a change event. [`VENDOR_APIS`] lists them in probe order;
//! the first one present wins.

use core::future::Future;
use core::pin::Pin;

use tracing::trace;

use crate::error::HarnessError;

/// Names of one vendor's fullscreen API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorApi {
    /// Method on the element that requests fullscreen.
    pub request_method: &'static str,
    /// Document property holding the current fullscreen element.
    pub element_property: &'static str,
    /// Document event fired after a transition.
    pub change_event: &'static str,
}

/// Probe order: unprefixed first, then WebKit, Gecko, Trident.
pub const VENDOR_APIS: [VendorApi; 4] = [
    VendorApi {
        request_method: "requestFullscreen",
        element_property: "fullscreenElement",
        change_event: "fullscreenchange",
    },
    VendorApi {
        request_method: "webkitRequestFullscreen",
        element_property: "webkitFullscreenElement",
        change_event: "webkitfullscreenchange",
    },
    VendorApi {
        request_method: "mozRequestFullScreen",
        element_property: "mozFullScreenElement",
        change_event: "mozfullscreenchange",
    },
    VendorApi {
        request_method: "msRequestFullscreen",
        element_property: "msFullscreenElement",
        change_event: "MSFullscreenChange",
    },
];

/// Run `probe` over [`VENDOR_APIS`] in order and return the first hit.
pub fn probe_first<T>(mut probe: impl FnMut(&VendorApi) -> Option<T>) -> Option<T> {
    VENDOR_APIS.iter().find_map(|api| probe(api))
}

/// Future returned by a fullscreen request.
///
/// Owns everything it needs so the caller can release any borrow of the
/// lifecycle while the platform decides.
pub type RequestFuture = Pin<Box<dyn Future<Output = Result<(), HarnessError>>>>;

/// Platform fullscreen primitives.
pub trait FullscreenAdapter {
    /// Element handle; compared by identity.
    type Element: Clone + PartialEq + core::fmt::Debug;

    /// Ask the platform to make `element` fullscreen.
    ///
    /// Resolves to `Err(HarnessError::FullscreenUnsupported)` when no vendor
    /// method exists, and to `FullscreenRequestRejected` when the platform
    /// refuses.
    fn request_fullscreen(&self, element: &Self::Element) -> RequestFuture;

    /// Element currently fullscreen, if any.
    fn current_fullscreen_element(&self) -> Option<Self::Element>;
}

/// Collapses the per-vendor change events into one logical event.
///
/// Engines that implement both a prefixed and the unprefixed API fire both
/// events for a single transition. Events are level-triggered, so an event
/// whose observed fullscreen element matches the previous observation carries
/// no new information and is suppressed.
#[derive(Debug, Clone)]
pub struct ChangeNormalizer<E> {
    last: Option<Option<E>>,
}

impl<E> Default for ChangeNormalizer<E> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<E: PartialEq + core::fmt::Debug> ChangeNormalizer<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation. Returns `true` if it differs from the last one.
    pub fn observe(&mut self, current: Option<E>) -> bool {
        if self.last.as_ref() == Some(&current) {
            trace!(?current, "duplicate fullscreen change suppressed");
            return false;
        }
        self.last = Some(current);
        true
    }

    /// Forget the previous observation.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
