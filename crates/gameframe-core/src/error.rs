#![forbid(unsafe_code)]

//! Error kinds surfaced by the harness core.
//!
//! None of these ever escape to the page uncaught: callers log them and fall
//! back to a no-op. They exist so hosts and tests can tell the failure modes
//! apart.

/// Harness failure modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// No vendor fullscreen API exists on the element. Degrades silently.
    FullscreenUnsupported,
    /// The platform denied the fullscreen request (for example, no user gesture).
    FullscreenRequestRejected(String),
    /// Focusing nested embedded content was refused (cross-origin or security).
    FocusDenied(String),
    /// Encoding the sampled surface produced no data.
    CaptureFailed(String),
    /// The local download could not be triggered.
    ExportFailed(String),
}

impl HarnessError {
    /// Short stable label for structured log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FullscreenUnsupported => "fullscreen_unsupported",
            Self::FullscreenRequestRejected(_) => "fullscreen_request_rejected",
            Self::FocusDenied(_) => "focus_denied",
            Self::CaptureFailed(_) => "capture_failed",
            Self::ExportFailed(_) => "export_failed",
        }
    }
}

impl core::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::FullscreenUnsupported => write!(f, "fullscreen is not supported"),
            Self::FullscreenRequestRejected(msg) => {
                write!(f, "fullscreen request rejected: {msg}")
            }
            Self::FocusDenied(msg) => write!(f, "focus denied: {msg}"),
            Self::CaptureFailed(msg) => write!(f, "capture failed: {msg}"),
            Self::ExportFailed(msg) => write!(f, "export failed: {msg}"),
        }
    }
}

impl std::error::Error for HarnessError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_platform_message() {
        let err = HarnessError::FullscreenRequestRejected("no user gesture".into());
        assert_eq!(
            err.to_string(),
            "fullscreen request rejected: no user gesture"
        );
        assert_eq!(err.kind(), "fullscreen_request_rejected");
    }

    #[test]
    fn kinds_are_distinct() {
        let all = [
            HarnessError::FullscreenUnsupported,
            HarnessError::FullscreenRequestRejected(String::new()),
            HarnessError::FocusDenied(String::new()),
            HarnessError::CaptureFailed(String::new()),
            HarnessError::ExportFailed(String::new()),
        ];
        let mut kinds: Vec<_> = all.iter().map(HarnessError::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), all.len());
    }
}
