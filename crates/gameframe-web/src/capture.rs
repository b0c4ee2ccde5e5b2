#![forbid(unsafe_code)]

//! Browser side of the screenshot pipeline: canvas encoding, the
//! animation-frame driver and the object-URL download.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use gameframe_core::capture::CaptureSurface;
use gameframe_core::data_url::decode_data_url;
use gameframe_core::error::HarnessError;
use gameframe_core::export::{
    CaptureArtifact, DownloadSink, ImageFormat, WallClock, with_released_handle,
};
use gameframe_core::focus::Timer;
use gameframe_core::screenshot::Screenshotter;
use js_sys::{Array, Date, Uint8Array};
use time::{Date as CalendarDate, Month, PrimitiveDateTime, Time};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlCanvasElement, Url};

use crate::dom::{WindowTimer, document, window};

pub(crate) type WebScreenshotter = Screenshotter<BlobDownloadSink, LocalClock>;

/// Canvas sampled with the synchronous `toDataURL` encoder.
#[derive(Debug, Clone)]
pub(crate) struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    pub(crate) fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }
}

impl CaptureSurface for CanvasSurface {
    fn encode(&self, format: ImageFormat, quality: f32) -> Option<Vec<u8>> {
        let quality = JsValue::from_f64(f64::from(quality));
        let url = match self
            .canvas
            .to_data_url_with_type_and_encoder_options(format.mime(), &quality)
        {
            Ok(url) => url,
            Err(err) => {
                // Tainted (cross-origin) canvases refuse to export.
                warn!(error = ?err, "canvas refused to encode");
                return None;
            }
        };
        match decode_data_url(&url) {
            Ok(decoded) => {
                if decoded.mime != format.mime() {
                    warn!(
                        requested = format.mime(),
                        produced = %decoded.mime,
                        "encoder fell back to a different format"
                    );
                }
                Some(decoded.bytes)
            }
            Err(err) => {
                debug!(error = %err, "canvas produced no image data");
                None
            }
        }
    }
}

/// Browser local clock.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LocalClock;

impl LocalClock {
    fn read() -> Option<PrimitiveDateTime> {
        let now = Date::new_0();
        let year = i32::try_from(now.get_full_year()).ok()?;
        let month = Month::try_from(u8::try_from(now.get_month() + 1).ok()?).ok()?;
        let day = u8::try_from(now.get_date()).ok()?;
        let date = CalendarDate::from_calendar_date(year, month, day).ok()?;
        let time = Time::from_hms(
            u8::try_from(now.get_hours()).ok()?,
            u8::try_from(now.get_minutes()).ok()?,
            u8::try_from(now.get_seconds()).ok()?,
        )
        .ok()?;
        Some(PrimitiveDateTime::new(date, time))
    }
}

impl WallClock for LocalClock {
    fn now_local(&self) -> PrimitiveDateTime {
        Self::read().unwrap_or(PrimitiveDateTime::MIN)
    }
}

/// Saves artifacts through a temporary object URL and an `<a download>`
/// click. The URL is revoked after `revoke_delay`; revoking immediately can
/// abort the download in some browsers.
#[derive(Debug, Clone)]
pub(crate) struct BlobDownloadSink {
    revoke_delay: Duration,
}

impl BlobDownloadSink {
    pub(crate) fn new(revoke_delay: Duration) -> Self {
        Self { revoke_delay }
    }

    fn try_save(&self, artifact: &CaptureArtifact) -> Result<(), JsValue> {
        let parts = Array::of1(&Uint8Array::from(artifact.bytes.as_slice()));
        let options = BlobPropertyBag::new();
        options.set_type(artifact.format.mime());
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;

        with_released_handle(
            || Url::create_object_url_with_blob(&blob),
            |url| {
                let document = document()?;
                let body = document
                    .body()
                    .ok_or_else(|| JsValue::from_str("document has no body"))?;
                let link = document
                    .create_element("a")?
                    .dyn_into::<HtmlAnchorElement>()?;
                link.set_href(url);
                link.set_download(&artifact.filename);

                let clicked = body.append_child(&link).map(|_| link.click());
                link.remove();
                clicked
            },
            |url| {
                WindowTimer.schedule(
                    self.revoke_delay,
                    Box::new(move || {
                        if let Err(err) = Url::revoke_object_url(&url) {
                            warn!(error = ?err, "failed to revoke object URL");
                        }
                    }),
                );
            },
        )
    }
}

impl DownloadSink for BlobDownloadSink {
    fn save(&self, artifact: &CaptureArtifact) -> Result<(), HarnessError> {
        self.try_save(artifact)
            .map_err(|err| HarnessError::ExportFailed(format!("{err:?}")))
    }
}

/// Runs the screenshotter once per animation frame while captures are
/// pending. Each `requestAnimationFrame` callback is one render-loop boundary.
pub(crate) struct FrameDriver {
    screenshots: Rc<RefCell<WebScreenshotter>>,
    /// Id of the queued frame request, if any.
    queued: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

impl FrameDriver {
    pub(crate) fn new(screenshots: Rc<RefCell<WebScreenshotter>>, surface: CanvasSurface) -> Self {
        let queued = Rc::new(Cell::new(None));
        let callback: FrameCallback = Rc::new(RefCell::new(None));

        let frame_shots = Rc::clone(&screenshots);
        let frame_queued = Rc::clone(&queued);
        let frame_callback = Rc::downgrade(&callback);
        *callback.borrow_mut() = Some(Closure::new(move |_timestamp: f64| {
            frame_queued.set(None);
            let still_pending = {
                let mut shots = frame_shots.borrow_mut();
                shots.on_frame_boundary(&surface);
                shots.has_pending()
            };
            if still_pending {
                if let Some(callback) = frame_callback.upgrade() {
                    request_frame(&callback, &frame_queued);
                }
            }
        }));

        Self {
            screenshots,
            queued,
            callback,
        }
    }

    /// Make sure a frame callback is queued if any capture is pending.
    pub(crate) fn arm(&self) {
        if self.queued.get().is_some() || !self.screenshots.borrow().has_pending() {
            return;
        }
        request_frame(&self.callback, &self.queued);
    }

    pub(crate) fn screenshots(&self) -> &Rc<RefCell<WebScreenshotter>> {
        &self.screenshots
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        if let (Some(id), Ok(window)) = (self.queued.take(), window()) {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

fn request_frame(callback: &RefCell<Option<Closure<dyn FnMut(f64)>>>, queued: &Cell<Option<i32>>) {
    let Ok(window) = window() else {
        return;
    };
    let slot = callback.borrow();
    let Some(closure) = slot.as_ref() else {
        return;
    };
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => queued.set(Some(id)),
        Err(err) => warn!(error = ?err, "requestAnimationFrame failed"),
    }
}
