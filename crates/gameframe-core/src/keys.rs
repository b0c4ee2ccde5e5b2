#![forbid(unsafe_code)]

//! Capture key binding.

/// Matches key-down events against the configured capture key.
///
/// Auto-repeat events (key held down) never match; only the first press does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureKeyFilter {
    key: String,
}

impl CaptureKeyFilter {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// `key` is the DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn matches(&self, key: &str, repeat: bool) -> bool {
        !repeat && key == self.key
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Whether `key` is the key browsers use to leave fullscreen.
#[must_use]
pub fn is_fullscreen_exit_key(key: &str) -> bool {
    matches!(key, "Escape" | "Esc")
}
