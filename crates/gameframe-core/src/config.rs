#![forbid(unsafe_code)]

//! Harness configuration.
//!
//! The host passes an optional options object; anything it leaves out falls
//! back to the defaults below. All values are read once at startup and never
//! mutated afterwards.
//!
//! | key                  | default                 |
//! |----------------------|-------------------------|
//! | `capture.key`        | `F6`                    |
//! | `capture.mimeType`   | `image/jpeg`            |
//! | `capture.quality`    | `0.95`                  |
//! | `capture.filePrefix` | `screenshot_`           |
//! | `fullscreenTarget`   | `wrapper`               |
//! | `focusDelayMs`       | `100`                   |
//! | `revokeDelayMs`      | `100`                   |

use std::time::Duration;

use serde::Deserialize;

use crate::export::ImageFormat;

const DEFAULT_CAPTURE_KEY: &str = "F6";
const DEFAULT_QUALITY: f32 = 0.95;
const DEFAULT_FILE_PREFIX: &str = "screenshot_";
const DEFAULT_FOCUS_DELAY_MS: u64 = 100;
const DEFAULT_REVOKE_DELAY_MS: u64 = 100;

/// Configuration parse/validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Options were not valid JSON or had the wrong shape.
    Parse(String),
    /// `capture.quality` outside `[0, 1]` (or not finite).
    QualityOutOfRange,
    /// `capture.key` was empty.
    EmptyKeyBinding,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid options: {msg}"),
            Self::QualityOutOfRange => write!(f, "capture quality must be within [0, 1]"),
            Self::EmptyKeyBinding => write!(f, "capture key binding must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Screenshot settings: key binding, encoding and filename prefix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureConfig {
    key: String,
    mime_type: ImageFormat,
    quality: f32,
    file_prefix: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_CAPTURE_KEY.to_string(),
            mime_type: ImageFormat::Jpeg,
            quality: DEFAULT_QUALITY,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

impl CaptureConfig {
    /// Build a validated capture config.
    pub fn new(
        key: impl Into<String>,
        format: ImageFormat,
        quality: f32,
        file_prefix: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            key: key.into(),
            mime_type: format,
            quality,
            file_prefix: file_prefix.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// DOM `KeyboardEvent.key` value that triggers a capture.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.mime_type
    }

    /// Encoder quality hint in `[0, 1]`.
    #[must_use]
    pub const fn quality(&self) -> f32 {
        self.quality
    }

    #[must_use]
    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.key.is_empty() {
            return Err(ConfigError::EmptyKeyBinding);
        }
        if !self.quality.is_finite() || !(0.0..=1.0).contains(&self.quality) {
            return Err(ConfigError::QualityOutOfRange);
        }
        Ok(())
    }
}

/// Which element goes fullscreen.
///
/// Hosts embed the game either inside a wrapper element or directly; both
/// layouts exist in the wild, so the choice is explicit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullscreenTargetKind {
    /// The container around the rendering surface.
    #[default]
    Wrapper,
    /// The rendering surface (iframe or canvas) itself.
    Surface,
}

/// Placeholder upload destination. Present only when uploads are wanted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfig {
    pub bucket: String,
}

/// Full host configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HarnessConfig {
    pub capture: CaptureConfig,
    pub fullscreen_target: FullscreenTargetKind,
    pub wrapper_id: String,
    pub surface_id: String,
    pub canvas_id: String,
    pub fullscreen_button_id: String,
    pub start_button_id: String,
    pub start_container_id: String,
    /// Document loaded into the embedded surface on desktop.
    pub surface_src: String,
    /// Navigation target of the start button.
    pub start_href: String,
    pub focus_delay_ms: u64,
    pub revoke_delay_ms: u64,
    /// `tracing` level filter for the console subscriber.
    pub log_level: String,
    pub upload: Option<UploadConfig>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            fullscreen_target: FullscreenTargetKind::default(),
            wrapper_id: "game-iframe-wrapper".to_string(),
            surface_id: "game-iframe".to_string(),
            canvas_id: "unity-canvas".to_string(),
            fullscreen_button_id: "fullscreen-button".to_string(),
            start_button_id: "start-button".to_string(),
            start_container_id: "game-start-container".to_string(),
            surface_src: "game-iframe.html".to_string(),
            start_href: "game.html".to_string(),
            focus_delay_ms: DEFAULT_FOCUS_DELAY_MS,
            revoke_delay_ms: DEFAULT_REVOKE_DELAY_MS,
            log_level: "info".to_string(),
            upload: None,
        }
    }
}

impl HarnessConfig {
    /// Parse and validate host options. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()
    }

    #[must_use]
    pub const fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }

    #[must_use]
    pub const fn revoke_delay(&self) -> Duration {
        Duration::from_millis(self.revoke_delay_ms)
    }

    /// Element id of the fullscreen target for the configured layout.
    #[must_use]
    pub fn fullscreen_target_id(&self) -> &str {
        match self.fullscreen_target {
            FullscreenTargetKind::Wrapper => &self.wrapper_id,
            FullscreenTargetKind::Surface => &self.surface_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_yields_defaults() {
        let config = HarnessConfig::from_json_str("{}").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.capture.key(), "F6");
        assert_eq!(config.capture.format(), ImageFormat::Jpeg);
        assert_eq!(config.capture.file_prefix(), "screenshot_");
        assert_eq!(config.focus_delay(), Duration::from_millis(100));
        assert_eq!(config.fullscreen_target_id(), "game-iframe-wrapper");
    }

    #[test]
    fn partial_capture_options_keep_other_defaults() {
        let config = HarnessConfig::from_json_str(
            r#"{"capture":{"mimeType":"image/png","quality":0.5},"fullscreenTarget":"surface"}"#,
        )
        .unwrap();
        assert_eq!(config.capture.format(), ImageFormat::Png);
        assert_eq!(config.capture.quality(), 0.5);
        assert_eq!(config.capture.key(), "F6");
        assert_eq!(config.fullscreen_target_id(), "game-iframe");
    }

    #[test]
    fn quality_out_of_range_is_rejected() {
        let err = HarnessConfig::from_json_str(r#"{"capture":{"quality":1.5}}"#).unwrap_err();
        assert_eq!(err, ConfigError::QualityOutOfRange);
        assert!(CaptureConfig::new("F6", ImageFormat::Jpeg, -0.1, "x").is_err());
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = HarnessConfig::from_json_str(r#"{"capture":{"key":""}}"#).unwrap_err();
        assert_eq!(err, ConfigError::EmptyKeyBinding);
    }

    #[test]
    fn unknown_mime_type_is_a_parse_error() {
        let err =
            HarnessConfig::from_json_str(r#"{"capture":{"mimeType":"image/tiff"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn upload_is_disabled_unless_configured() {
        assert!(HarnessConfig::default().upload.is_none());
        let config = HarnessConfig::from_json_str(r#"{"upload":{"bucket":"shots"}}"#).unwrap();
        assert_eq!(
            config.upload,
            Some(UploadConfig {
                bucket: "shots".to_string()
            })
        );
    }
}
