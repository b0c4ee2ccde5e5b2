#![forbid(unsafe_code)]

//! Fixed-aspect fitting of the rendering surface inside its container.
//!
//! Given a container of `w × h` CSS pixels:
//!
//! - if `w * 9/16 > h`, height binds: `(h * 16/9, h)`;
//! - otherwise width binds: `(w, w * 9/16)`.
//!
//! The result never exceeds the container in either dimension and depends
//! only on the input, so recomputing with the same container is a no-op.

use tracing::debug;

/// Width-to-height ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    pub width: f64,
    pub height: f64,
}

impl AspectRatio {
    pub const WIDESCREEN: Self = Self {
        width: 16.0,
        height: 9.0,
    };

    #[must_use]
    pub fn value(self) -> f64 {
        self.width / self.height
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

/// Which container dimension limited the fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingEdge {
    Width,
    Height,
}

/// Displayed size of the surface, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSize {
    pub width: f64,
    pub height: f64,
    pub binding: BindingEdge,
}

/// Largest `ratio`-shaped box that fits in `container_w × container_h`.
#[must_use]
pub fn fit_to_container(container_w: f64, container_h: f64, ratio: AspectRatio) -> FitSize {
    let w = container_w.max(0.0);
    let h = container_h.max(0.0);
    if w * ratio.height / ratio.width > h {
        FitSize {
            width: h * ratio.width / ratio.height,
            height: h,
            binding: BindingEdge::Height,
        }
    } else {
        FitSize {
            width: w,
            height: w * ratio.height / ratio.width,
            binding: BindingEdge::Width,
        }
    }
}

/// Recomputes the surface size whenever the container is observed.
#[derive(Debug, Clone, Default)]
pub struct ResizeController {
    ratio: AspectRatio,
    last: Option<FitSize>,
}

impl ResizeController {
    #[must_use]
    pub fn new(ratio: AspectRatio) -> Self {
        Self { ratio, last: None }
    }

    /// Fit for the given container; call on startup and on every observed
    /// container resize.
    pub fn recompute(&mut self, container_w: f64, container_h: f64) -> FitSize {
        let fit = fit_to_container(container_w, container_h, self.ratio);
        if self.last != Some(fit) {
            debug!(
                container_w,
                container_h,
                width = fit.width,
                height = fit.height,
                binding = ?fit.binding,
                "surface resized"
            );
        }
        self.last = Some(fit);
        fit
    }

    /// Most recent fit, if any.
    #[must_use]
    pub fn last(&self) -> Option<FitSize> {
        self.last
    }

    #[must_use]
    pub fn ratio(&self) -> AspectRatio {
        self.ratio
    }
}

/// Format a length for an inline CSS `width`/`height` declaration.
#[must_use]
pub fn css_px(value: f64) -> String {
    format!("{value}px")
}
