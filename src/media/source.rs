//! Temp-file staging for in-memory media bytes
//!
//! FFmpeg needs a seekable path, so source bytes are staged into a
//! temporary file. The file is removed when the guard drops, which
//! covers success, failure, and early-abort paths alike.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Owned temporary copy of a media source
pub struct StagedMedia {
    file: NamedTempFile,
}

impl StagedMedia {
    /// Write `bytes` to a fresh temporary file
    pub fn stage(bytes: &[u8]) -> std::io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    /// Path FFmpeg can read the staged bytes from
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
