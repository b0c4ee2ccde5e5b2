#![forbid(unsafe_code)]

//! Screenshot pipeline: key press → deferred sample → named artifact →
//! local download.

use tracing::{error, info};

use crate::capture::{CaptureId, CaptureScheduler, CaptureSurface, EncodedImage};
use crate::config::CaptureConfig;
use crate::error::HarnessError;
use crate::export::{
    ArtifactUploader, CaptureArtifact, DownloadSink, ImageExporter, WallClock, artifact_filename,
};
use crate::keys::CaptureKeyFilter;

/// Drives captures from request to download for one surface.
pub struct Screenshotter<S, C> {
    config: CaptureConfig,
    keys: CaptureKeyFilter,
    scheduler: CaptureScheduler,
    exporter: ImageExporter<S>,
    clock: C,
}

impl<S: DownloadSink, C: WallClock> Screenshotter<S, C> {
    #[must_use]
    pub fn new(config: CaptureConfig, sink: S, clock: C) -> Self {
        Self {
            keys: CaptureKeyFilter::new(config.key()),
            scheduler: CaptureScheduler::from_config(&config),
            exporter: ImageExporter::new(sink),
            clock,
            config,
        }
    }

    #[must_use]
    pub fn with_uploader(mut self, uploader: Box<dyn ArtifactUploader>) -> Self {
        self.exporter = self.exporter.with_uploader(uploader);
        self
    }

    #[must_use]
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    #[must_use]
    pub fn exporter(&self) -> &ImageExporter<S> {
        &self.exporter
    }

    /// Feed a key-down event. Returns the capture id when it triggered one;
    /// the host should then suppress the key's default action.
    pub fn on_key_down(&mut self, key: &str, repeat: bool) -> Option<CaptureId> {
        self.keys
            .matches(key, repeat)
            .then(|| self.request_capture())
    }

    pub fn request_capture(&mut self) -> CaptureId {
        info!("capturing screenshot");
        self.scheduler.request()
    }

    /// Whether the host must keep its animation-frame callback armed.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// Call once per render-loop boundary. Every due capture is named and
    /// exported; failures are logged and produce no file. Returns the
    /// per-capture outcome (the saved filename on success).
    pub fn on_frame_boundary<F: CaptureSurface + ?Sized>(
        &mut self,
        surface: &F,
    ) -> Vec<Result<String, HarnessError>> {
        self.scheduler
            .on_frame_boundary(surface)
            .into_iter()
            .map(|sampled| {
                let outcome = sampled.and_then(|image| self.export(image));
                if let Err(err) = &outcome {
                    error!(error = %err, kind = err.kind(), "screenshot failed");
                }
                outcome
            })
            .collect()
    }

    fn export(&self, image: EncodedImage) -> Result<String, HarnessError> {
        let filename =
            artifact_filename(self.config.file_prefix(), self.clock.now_local(), image.format)?;
        let artifact = CaptureArtifact {
            bytes: image.bytes,
            filename,
            format: image.format,
        };
        info!(
            id = %image.id,
            filename = %artifact.filename,
            bytes = artifact.len(),
            "screenshot captured"
        );
        self.exporter.export(&artifact)?;
        Ok(artifact.filename)
    }
}

impl<S: core::fmt::Debug, C> core::fmt::Debug for Screenshotter<S, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Screenshotter")
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .field("exporter", &self.exporter)
            .finish_non_exhaustive()
    }
}
