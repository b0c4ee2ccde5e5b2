#![forbid(unsafe_code)]

//! `gameframe-core` holds the host-independent parts of the GameFrame canvas
//! harness.
//!
//! Design goals:
//! - **Host-driven**: the embedding page pushes events (fullscreen changes,
//!   key presses, animation-frame boundaries, container sizes) in; nothing
//!   here touches the DOM.
//! - **Derived state**: fullscreen state is always recomputed from what the
//!   platform reports, never cached.
//! - **No blocking / no threads**: everything runs on the page's event loop.
//!
//! `gameframe-web` implements the platform traits ([`FullscreenAdapter`],
//! [`FocusTarget`], [`Timer`], [`CaptureSurface`], [`DownloadSink`]) with
//! `web-sys` and exposes the result to JavaScript.

pub mod capture;
pub mod config;
pub mod data_url;
pub mod error;
pub mod export;
pub mod focus;
pub mod fullscreen;
pub mod keys;
pub mod page;
pub mod resize;
pub mod screenshot;

pub use capture::{
    BOUNDARIES_BEFORE_SAMPLE, CaptureId, CaptureScheduler, CaptureSurface, EncodedImage,
};
pub use config::{CaptureConfig, ConfigError, FullscreenTargetKind, HarnessConfig, UploadConfig};
pub use error::HarnessError;
pub use export::{
    ArtifactUploader, CaptureArtifact, DownloadSink, FixedClock, ImageExporter, ImageFormat,
    PlaceholderUploader, WallClock, artifact_filename,
};
pub use focus::{FocusCoordinator, FocusOutcome, FocusTarget, ManualTimer, Refocus, Timer};
pub use fullscreen::{FullscreenAdapter, FullscreenLifecycle, LifecyclePhase};
pub use keys::CaptureKeyFilter;
pub use page::PageMode;
pub use resize::{AspectRatio, FitSize, ResizeController, fit_to_container};
pub use screenshot::Screenshotter;
