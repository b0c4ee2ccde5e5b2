#![forbid(unsafe_code)]

//! Capture artifacts, filenames and the local-download exporter.
//!
//! Filenames are `<prefix><YYYY-MM-DD_HH-mm-ss>.<ext>` using the local wall
//! clock, so two captures collide only within the same calendar second.

use serde::Deserialize;
use time::PrimitiveDateTime;
use time::macros::format_description;
use tracing::{error, info};

use crate::error::HarnessError;

/// Supported encoded image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

impl TryFrom<String> for ImageFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_mime(&value).ok_or_else(|| format!("unsupported image MIME type `{value}`"))
    }
}

/// Local wall clock used for artifact names.
pub trait WallClock {
    fn now_local(&self) -> PrimitiveDateTime;
}

/// Clock pinned to a single reading. Handy for hosts that sample time once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub PrimitiveDateTime);

impl WallClock for FixedClock {
    fn now_local(&self) -> PrimitiveDateTime {
        self.0
    }
}

/// Build the download filename for a capture taken at `at`.
pub fn artifact_filename(
    prefix: &str,
    at: PrimitiveDateTime,
    format: ImageFormat,
) -> Result<String, HarnessError> {
    let stamp = at
        .format(format_description!(
            "[year]-[month]-[day]_[hour]-[minute]-[second]"
        ))
        .map_err(|e| HarnessError::ExportFailed(e.to_string()))?;
    Ok(format!("{prefix}{stamp}.{}", format.extension()))
}

/// Encoded image bytes plus the name they will be saved under.
///
/// Created per capture and handed straight to the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub format: ImageFormat,
}

impl CaptureArtifact {
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Platform mechanism that saves bytes as a local file.
///
/// Implementations must release any temporary handle they create; the web
/// sink revokes its object URL after a short delay.
pub trait DownloadSink {
    fn save(&self, artifact: &CaptureArtifact) -> Result<(), HarnessError>;
}

/// Acquire a temporary handle, use it, then hand it to `release`.
///
/// `release` runs exactly once whenever `acquire` succeeded, even if `use_handle`
/// fails, so a sink that builds its download around the handle cannot leak it.
pub fn with_released_handle<H, E>(
    acquire: impl FnOnce() -> Result<H, E>,
    use_handle: impl FnOnce(&H) -> Result<(), E>,
    release: impl FnOnce(H),
) -> Result<(), E> {
    let handle = acquire()?;
    let used = use_handle(&handle);
    release(handle);
    used
}

/// Destination for artifacts beyond the local download.
pub trait ArtifactUploader {
    /// Returns the public URL the artifact would be reachable at.
    fn upload(&self, artifact: &CaptureArtifact) -> Result<String, HarnessError>;
}

/// Stand-in uploader: logs and reports where the artifact would live.
/// Performs no network I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderUploader {
    bucket: String,
}

impl PlaceholderUploader {
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl ArtifactUploader for PlaceholderUploader {
    fn upload(&self, artifact: &CaptureArtifact) -> Result<String, HarnessError> {
        info!(
            filename = %artifact.filename,
            bytes = artifact.len(),
            bucket = %self.bucket,
            "upload placeholder invoked"
        );
        Ok(format!(
            "https://storage.googleapis.com/{}/{}",
            self.bucket, artifact.filename
        ))
    }
}

/// Hands artifacts to a [`DownloadSink`] and, optionally, an uploader.
pub struct ImageExporter<S> {
    sink: S,
    uploader: Option<Box<dyn ArtifactUploader>>,
}

impl<S: DownloadSink> ImageExporter<S> {
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            uploader: None,
        }
    }

    #[must_use]
    pub fn with_uploader(mut self, uploader: Box<dyn ArtifactUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Save the artifact locally. Upload failures are logged and do not fail
    /// the export; the local file is the primary output.
    pub fn export(&self, artifact: &CaptureArtifact) -> Result<(), HarnessError> {
        self.sink.save(artifact)?;
        info!(filename = %artifact.filename, bytes = artifact.len(), "screenshot saved");

        if let Some(uploader) = &self.uploader {
            match uploader.upload(artifact) {
                Ok(url) => info!(%url, "screenshot uploaded"),
                Err(err) => error!(error = %err, "screenshot upload failed"),
            }
        }
        Ok(())
    }
}

impl<S: core::fmt::Debug> core::fmt::Debug for ImageExporter<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImageExporter")
            .field("sink", &self.sink)
            .field("uploader", &self.uploader.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use time::macros::datetime;

    #[derive(Debug, Default)]
    struct MemorySink {
        saved: RefCell<Vec<CaptureArtifact>>,
    }

    impl DownloadSink for MemorySink {
        fn save(&self, artifact: &CaptureArtifact) -> Result<(), HarnessError> {
            self.saved.borrow_mut().push(artifact.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl DownloadSink for FailingSink {
        fn save(&self, _artifact: &CaptureArtifact) -> Result<(), HarnessError> {
            Err(HarnessError::ExportFailed("no document body".into()))
        }
    }

    fn artifact(name: &str) -> CaptureArtifact {
        CaptureArtifact {
            bytes: vec![0xFF, 0xD8, 0xFF],
            filename: name.to_string(),
            format: ImageFormat::Jpeg,
        }
    }

    #[test]
    fn filename_is_zero_padded_local_timestamp() {
        let name = artifact_filename(
            "screenshot_",
            datetime!(2024-03-07 09:05:03),
            ImageFormat::Jpeg,
        )
        .unwrap();
        assert_eq!(name, "screenshot_2024-03-07_09-05-03.jpg");
    }

    #[test]
    fn filename_extension_follows_format() {
        let at = datetime!(2023-12-31 23:59:59);
        assert_eq!(
            artifact_filename("", at, ImageFormat::Png).unwrap(),
            "2023-12-31_23-59-59.png"
        );
        assert_eq!(
            artifact_filename("shot-", at, ImageFormat::Webp).unwrap(),
            "shot-2023-12-31_23-59-59.webp"
        );
    }

    #[test]
    fn mime_parsing_is_case_insensitive() {
        assert_eq!(ImageFormat::from_mime("IMAGE/PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_mime("image/jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime("image/gif"), None);
    }

    #[test]
    fn export_hands_artifact_to_sink() {
        let exporter = ImageExporter::new(MemorySink::default());
        exporter.export(&artifact("a.jpg")).unwrap();
        exporter.export(&artifact("b.jpg")).unwrap();
        let saved = exporter.sink().saved.borrow();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].filename, "b.jpg");
    }

    #[test]
    fn sink_failure_propagates() {
        let exporter = ImageExporter::new(FailingSink);
        let err = exporter.export(&artifact("a.jpg")).unwrap_err();
        assert_eq!(err.kind(), "export_failed");
    }

    #[test]
    fn placeholder_uploader_reports_bucket_url() {
        let uploader = PlaceholderUploader::new("bucket-name");
        let url = uploader.upload(&artifact("screenshot_x.jpg")).unwrap();
        assert_eq!(
            url,
            "https://storage.googleapis.com/bucket-name/screenshot_x.jpg"
        );
    }

    #[test]
    fn handle_is_released_when_use_fails() {
        let released = RefCell::new(Vec::new());
        let result = with_released_handle(
            || Ok::<_, String>("blob:1"),
            |_url| Err("document has no body".to_string()),
            |url| released.borrow_mut().push(url),
        );
        assert_eq!(result, Err("document has no body".to_string()));
        assert_eq!(*released.borrow(), vec!["blob:1"]);
    }

    #[test]
    fn failed_acquire_releases_nothing() {
        let released = RefCell::new(0u32);
        let result = with_released_handle(
            || Err::<&str, _>("blob rejected"),
            |_url| Ok(()),
            |_url| *released.borrow_mut() += 1,
        );
        assert_eq!(result, Err("blob rejected"));
        assert_eq!(*released.borrow(), 0);
    }
}
