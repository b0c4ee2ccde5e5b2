#![forbid(unsafe_code)]

//! WASM frontend for GameFrame.
//!
//! Binds the host-independent pieces of `gameframe-core` to the browser:
//! - vendor-normalized fullscreen requests and change events,
//! - delayed refocus of the embedded iframe/canvas,
//! - 16:9 fitting driven by a `ResizeObserver`,
//! - animation-frame-paced screenshot capture and local download,
//! - thin page wiring (buttons, mobile start screen).
//!
//! The JS-facing entry point is `GameFrameHost`.

pub mod logging;

#[cfg(target_arch = "wasm32")]
mod capture;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod focus;
#[cfg(target_arch = "wasm32")]
mod fullscreen;
#[cfg(target_arch = "wasm32")]
mod resize;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::GameFrameHost;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct GameFrameHost;

#[cfg(not(target_arch = "wasm32"))]
impl GameFrameHost {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}
