#![forbid(unsafe_code)]

//! Decoding of `data:` URLs produced by canvas encoders.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::HarnessError;

/// Decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Decode a base64 `data:` URL.
///
/// Canvas encoders return `data:,` for zero-sized surfaces; that (and any
/// other empty payload) is a capture failure.
pub fn decode_data_url(url: &str) -> Result<DataUrl, HarnessError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| HarnessError::CaptureFailed("not a data URL".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| HarnessError::CaptureFailed("malformed data URL".into()))?;
    if payload.is_empty() {
        return Err(HarnessError::CaptureFailed("encoder produced no data".into()));
    }

    let mut parts = header.split(';');
    let mime = parts.next().unwrap_or_default().to_string();
    if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(HarnessError::CaptureFailed(
            "data URL is not base64-encoded".into(),
        ));
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| HarnessError::CaptureFailed(format!("invalid base64 payload: {e}")))?;
    Ok(DataUrl { mime, bytes })
}
