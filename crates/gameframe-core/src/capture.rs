#![forbid(unsafe_code)]

//! Frame-accurate sampling of the rendering surface.
//!
//! A capture requested mid-frame is sampled only after **two** render-loop
//! boundaries. The first boundary only means the queued frame was submitted;
//! the renderer may still be drawing. By the second boundary that frame has
//! been composited, so the sample reflects a finished frame.
//!
//! The host calls [`CaptureScheduler::on_frame_boundary`] from its
//! animation-frame callback and keeps the callback armed while
//! [`CaptureScheduler::has_pending`] is true.
//!
//! Requests are never deduplicated: two requests inside one frame produce two
//! samples. Requests cannot be cancelled once made.

use tracing::{debug, warn};

use crate::config::CaptureConfig;
use crate::error::HarnessError;
use crate::export::ImageFormat;

/// Render-loop boundaries that must pass between request and sample.
pub const BOUNDARIES_BEFORE_SAMPLE: u8 = 2;

/// Surface that can encode its current pixels.
pub trait CaptureSurface {
    /// Encode the current contents. `None` means the encoder produced no data.
    fn encode(&self, format: ImageFormat, quality: f32) -> Option<Vec<u8>>;
}

/// Identifies one capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaptureId(pub u64);

impl core::fmt::Display for CaptureId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "capture-{}", self.0)
    }
}

/// Encoded pixels from one completed capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub id: CaptureId,
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

#[derive(Debug, Clone, Copy)]
struct PendingCapture {
    id: CaptureId,
    boundaries_left: u8,
}

/// Defers sampling until [`BOUNDARIES_BEFORE_SAMPLE`] boundaries have passed.
#[derive(Debug, Clone)]
pub struct CaptureScheduler {
    format: ImageFormat,
    quality: f32,
    next_id: u64,
    pending: Vec<PendingCapture>,
}

impl CaptureScheduler {
    #[must_use]
    pub fn new(format: ImageFormat, quality: f32) -> Self {
        Self {
            format,
            quality,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.format(), config.quality())
    }

    /// Queue a capture. It will be sampled at the second boundary from now.
    pub fn request(&mut self) -> CaptureId {
        let id = CaptureId(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingCapture {
            id,
            boundaries_left: BOUNDARIES_BEFORE_SAMPLE,
        });
        debug!(%id, "capture requested");
        id
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Advance every pending capture by one boundary and sample those that
    /// became due, in request order.
    pub fn on_frame_boundary<S: CaptureSurface + ?Sized>(
        &mut self,
        surface: &S,
    ) -> Vec<Result<EncodedImage, HarnessError>> {
        for pending in &mut self.pending {
            pending.boundaries_left = pending.boundaries_left.saturating_sub(1);
        }
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|pending| pending.boundaries_left == 0);
        self.pending = waiting;

        due.into_iter()
            .map(|pending| self.sample(pending.id, surface))
            .collect()
    }

    fn sample<S: CaptureSurface + ?Sized>(
        &self,
        id: CaptureId,
        surface: &S,
    ) -> Result<EncodedImage, HarnessError> {
        match surface.encode(self.format, self.quality) {
            Some(bytes) if !bytes.is_empty() => {
                debug!(%id, bytes = bytes.len(), "surface sampled");
                Ok(EncodedImage {
                    id,
                    bytes,
                    format: self.format,
                })
            }
            _ => {
                warn!(%id, "surface encoder produced no data");
                Err(HarnessError::CaptureFailed(format!(
                    "{id}: encoder produced no data"
                )))
            }
        }
    }
}
