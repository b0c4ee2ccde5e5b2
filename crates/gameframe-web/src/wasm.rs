#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use gameframe_core::config::HarnessConfig;
use gameframe_core::export::PlaceholderUploader;
use gameframe_core::focus::FocusCoordinator;
use gameframe_core::fullscreen::{FullscreenLifecycle, LifecyclePhase};
use gameframe_core::keys::is_fullscreen_exit_key;
use gameframe_core::page::PageMode;
use gameframe_core::screenshot::Screenshotter;
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlCanvasElement, HtmlElement, HtmlIFrameElement, KeyboardEvent,
};

use crate::capture::{BlobDownloadSink, CanvasSurface, FrameDriver, LocalClock};
use crate::dom::{EventListener, WindowTimer, document, element_by_id, window};
use crate::focus::DomFocusTarget;
use crate::fullscreen::DomFullscreenAdapter;
use crate::logging::install_console_logging;
use crate::resize::ResizeBinding;

type WebLifecycle =
    FullscreenLifecycle<DomFullscreenAdapter, FocusCoordinator<DomFocusTarget, WindowTimer>>;

/// Issue one fullscreen request and settle it. Never fails: rejections are
/// logged by the lifecycle.
async fn run_fullscreen_request(lifecycle: Rc<RefCell<WebLifecycle>>) -> LifecyclePhase {
    let request = lifecycle.borrow_mut().begin_request();
    let result = request.await;
    lifecycle.borrow_mut().complete_request(result)
}

fn options_to_config(options: Option<JsValue>) -> Result<HarnessConfig, JsValue> {
    let Some(options) = options.filter(|o| !o.is_undefined() && !o.is_null()) else {
        return Ok(HarnessConfig::default());
    };
    let json = js_sys::JSON::stringify(&options)?
        .as_string()
        .ok_or_else(|| JsValue::from_str("options are not serializable"))?;
    HarnessConfig::from_json_str(&json).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Page harness around an embedded game.
///
/// Every part is optional: the host page typically has the wrapper, surface
/// and buttons, while the game document has the canvas. Whatever is missing
/// from the current document is skipped with a debug log.
#[wasm_bindgen]
pub struct GameFrameHost {
    config: HarnessConfig,
    document: Document,
    lifecycle: Option<Rc<RefCell<WebLifecycle>>>,
    frames: Option<Rc<FrameDriver>>,
    resize: Option<ResizeBinding>,
    listeners: Vec<EventListener>,
    attached: bool,
}

#[wasm_bindgen]
impl GameFrameHost {
    /// Create a host from an optional options object (see `HarnessConfig`).
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<JsValue>) -> Result<GameFrameHost, JsValue> {
        let config = options_to_config(options)?;
        install_console_logging(&config.log_level);
        Ok(Self {
            document: document()?,
            config,
            lifecycle: None,
            frames: None,
            resize: None,
            listeners: Vec::new(),
            attached: false,
        })
    }

    /// Wire the page: start screen or embedded surface, 16:9 fitting,
    /// fullscreen lifecycle, capture key and buttons. Calling it twice is a
    /// no-op.
    pub fn attach(&mut self) -> Result<(), JsValue> {
        if self.attached {
            return Ok(());
        }
        self.attached = true;

        self.wire_page_mode()?;
        self.wire_resize()?;
        self.wire_fullscreen()?;
        self.wire_capture();
        self.wire_keyboard()?;
        self.wire_start_button()?;
        info!(
            fullscreen = self.lifecycle.is_some(),
            capture = self.frames.is_some(),
            "harness attached"
        );
        Ok(())
    }

    /// Request fullscreen for the configured target. Resolves once the
    /// platform has answered; a refusal is logged, never thrown.
    #[wasm_bindgen(js_name = requestFullscreen)]
    pub fn request_fullscreen(&self) -> js_sys::Promise {
        let lifecycle = self.lifecycle.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let Some(lifecycle) = lifecycle else {
                warn!("fullscreen target not attached");
                return Ok(JsValue::from_str(LifecyclePhase::Normal.as_str()));
            };
            let phase = run_fullscreen_request(lifecycle).await;
            Ok(JsValue::from_str(phase.as_str()))
        })
    }

    /// Queue a screenshot; it is sampled two animation frames later.
    /// Returns the capture id, or `undefined` when no canvas is attached.
    #[wasm_bindgen(js_name = captureScreenshot)]
    pub fn capture_screenshot(&self) -> Option<f64> {
        let Some(frames) = &self.frames else {
            warn!("capture canvas not attached");
            return None;
        };
        let id = frames.screenshots().borrow_mut().request_capture();
        frames.arm();
        Some(id.0 as f64)
    }

    /// Current fullscreen lifecycle phase as a snake_case string.
    #[wasm_bindgen(js_name = fullscreenPhase)]
    pub fn fullscreen_phase(&self) -> String {
        self.lifecycle
            .as_ref()
            .and_then(|lc| lc.try_borrow().ok().map(|lc| lc.phase()))
            .unwrap_or(LifecyclePhase::Normal)
            .as_str()
            .to_string()
    }

    /// Remove every listener and observer registered by `attach`.
    pub fn destroy(&mut self) {
        self.listeners.clear();
        self.resize = None;
        self.frames = None;
        self.lifecycle = None;
        self.attached = false;
        debug!("harness destroyed");
    }
}

impl GameFrameHost {
    fn wire_page_mode(&mut self) -> Result<(), JsValue> {
        let user_agent = window()?.navigator().user_agent().unwrap_or_default();
        match PageMode::for_user_agent(&user_agent) {
            PageMode::StartScreen => {
                if let Some(container) =
                    element_by_id::<HtmlElement>(&self.document, &self.config.start_container_id)
                {
                    container.style().set_property("display", "block")?;
                }
                info!("mobile browser; showing start screen");
            }
            PageMode::Embedded => {
                if let Some(iframe) =
                    element_by_id::<HtmlIFrameElement>(&self.document, &self.config.surface_id)
                {
                    iframe.set_src(&self.config.surface_src);
                }
            }
        }
        Ok(())
    }

    fn wire_resize(&mut self) -> Result<(), JsValue> {
        let container = element_by_id::<HtmlElement>(&self.document, &self.config.wrapper_id);
        let surface = element_by_id::<HtmlElement>(&self.document, &self.config.surface_id);
        if let (Some(container), Some(surface)) = (container, surface) {
            self.resize = Some(ResizeBinding::attach(container, surface)?);
        } else {
            debug!("no wrapper/surface pair; resize disabled");
        }
        Ok(())
    }

    fn wire_fullscreen(&mut self) -> Result<(), JsValue> {
        let target =
            element_by_id::<Element>(&self.document, self.config.fullscreen_target_id());
        let surface = element_by_id::<HtmlElement>(&self.document, &self.config.surface_id);
        let (Some(target), Some(surface)) = (target, surface) else {
            debug!("no fullscreen target/surface; fullscreen disabled");
            return Ok(());
        };

        let focus = FocusCoordinator::new(
            DomFocusTarget::new(surface),
            WindowTimer,
            self.config.focus_delay(),
        );
        let adapter = DomFullscreenAdapter::new(self.document.clone());
        let lifecycle = Rc::new(RefCell::new(FullscreenLifecycle::new(
            adapter.clone(),
            target,
            focus,
        )));

        let on_change = Rc::clone(&lifecycle);
        self.listeners.extend(adapter.on_change(Rc::new(move || {
            on_change.borrow_mut().handle_change();
        }))?);

        if let Some(button) =
            element_by_id::<HtmlElement>(&self.document, &self.config.fullscreen_button_id)
        {
            let on_click = Rc::clone(&lifecycle);
            self.listeners.push(EventListener::new(&button, "click", move |_event| {
                wasm_bindgen_futures::spawn_local({
                    let lifecycle = Rc::clone(&on_click);
                    async move {
                        run_fullscreen_request(lifecycle).await;
                    }
                });
            })?);
        }

        self.lifecycle = Some(lifecycle);
        Ok(())
    }

    fn wire_capture(&mut self) {
        let Some(canvas) =
            element_by_id::<HtmlCanvasElement>(&self.document, &self.config.canvas_id)
        else {
            debug!("no capture canvas; screenshots disabled");
            return;
        };

        let mut screenshots = Screenshotter::new(
            self.config.capture.clone(),
            BlobDownloadSink::new(self.config.revoke_delay()),
            LocalClock,
        );
        if let Some(upload) = &self.config.upload {
            screenshots = screenshots.with_uploader(Box::new(PlaceholderUploader::new(
                upload.bucket.clone(),
            )));
        }
        self.frames = Some(Rc::new(FrameDriver::new(
            Rc::new(RefCell::new(screenshots)),
            CanvasSurface::new(canvas),
        )));
        info!(key = self.config.capture.key(), "screenshot capture ready");
    }

    fn wire_keyboard(&mut self) -> Result<(), JsValue> {
        if self.frames.is_none() && self.lifecycle.is_none() {
            return Ok(());
        }
        let frames = self.frames.clone();
        let lifecycle = self.lifecycle.clone();
        self.listeners.push(EventListener::new(&self.document, "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = event.key();

            if let Some(frames) = &frames {
                let fired = frames
                    .screenshots()
                    .borrow_mut()
                    .on_key_down(&key, event.repeat());
                if fired.is_some() {
                    event.prevent_default();
                    frames.arm();
                }
            }

            if is_fullscreen_exit_key(&key) {
                let borrowed = lifecycle.as_ref().map(|lc| lc.try_borrow_mut());
                if let Some(Ok(mut lifecycle)) = borrowed {
                    lifecycle.observe_exit_key();
                }
            }
        })?);
        Ok(())
    }

    fn wire_start_button(&mut self) -> Result<(), JsValue> {
        let Some(button) =
            element_by_id::<HtmlElement>(&self.document, &self.config.start_button_id)
        else {
            return Ok(());
        };
        let href = self.config.start_href.clone();
        self.listeners.push(EventListener::new(&button, "click", move |_event| {
            match window().map(|w| w.location().set_href(&href)) {
                Ok(Ok(())) => {}
                Ok(Err(err)) | Err(err) => warn!(error = ?err, "start navigation failed"),
            }
        })?);
        Ok(())
    }
}
