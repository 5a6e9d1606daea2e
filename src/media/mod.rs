//! Media staging and probing
//!
//! Shared plumbing for the conversion utilities: temp-file staging of
//! source bytes, FFprobe metadata lookups, load-failure classification,
//! and the encoded image artifact that crosses the API boundary.

mod probe;
mod source;

pub use probe::{classify_load_failure, probe_duration, probe_video_stream};
pub use source::StagedMedia;

pub(crate) use probe::error_summary;

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why loading a media source failed
#[derive(Error, Debug)]
pub enum LoadError {
    /// Loading stopped before the source became decodable
    #[error("media loading was aborted")]
    Aborted,

    #[error("network or I/O failure while loading media: {0}")]
    Network(String),

    #[error("media data is corrupt: {0}")]
    Corrupted(String),

    #[error("media source or format is not supported: {0}")]
    Unsupported(String),
}

/// A base64-encoded PNG ready for inline API submission
///
/// `data` holds the bare base64 payload with no `data:` URL prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    pub data: String,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Wrap freshly encoded PNG bytes
    pub fn from_png(png: &[u8], width: u32, height: u32) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(png),
            width,
            height,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }

    /// Decode back to raw PNG bytes, e.g. for writing to disk
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.data)
    }
}
