//! FFmpeg-based midpoint frame capture
//!
//! Probes the video, seeks to half its duration, and decodes exactly
//! one raw RGBA frame at the source's native dimensions.

use std::path::Path;

use thiserror::Error;
use tokio::process::Command;

use crate::media::{
    classify_load_failure, probe_duration, probe_video_stream, EncodedImage, LoadError,
    StagedMedia,
};
use crate::raster::{RenderError, Surface};

/// Frame extraction errors
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("failed to load video: {0}")]
    Load(#[from] LoadError),

    #[error("failed to capture frame: {0}")]
    Capture(String),

    #[error("failed to encode frame: {0}")]
    Render(#[from] RenderError),
}

/// Timestamp of the representative frame: the middle of the clip
fn midpoint_secs(duration_secs: f64) -> f64 {
    duration_secs / 2.0
}

/// Capture the frame at the middle of a video as a base64-encoded PNG
///
/// The image keeps the video's native pixel dimensions. The staged copy
/// of the source bytes is removed on every exit path, including
/// failures during probing and capture.
pub async fn extract_midpoint_frame(video: &[u8]) -> Result<EncodedImage, FrameError> {
    let staged = StagedMedia::stage(video)
        .map_err(|e| LoadError::Network(format!("failed to stage video: {}", e)))?;

    let duration = probe_duration(staged.path()).await?;
    let (width, height) = probe_video_stream(staged.path()).await?;
    let timestamp = midpoint_secs(duration);

    tracing::debug!(
        "capturing frame at {:.3}s of {:.3}s ({}x{})",
        timestamp,
        duration,
        width,
        height
    );

    let frame = capture_frame(staged.path(), timestamp, width, height).await?;
    drop(staged);

    let surface = Surface::from_rgba(width, height, frame)?;
    let png = surface.encode_png()?;

    Ok(EncodedImage::from_png(&png, width, height))
}

/// Decode one raw RGBA frame at `timestamp`
async fn capture_frame(
    path: &Path,
    timestamp: f64,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, FrameError> {
    // -ss before -i seeks before decoding starts, so only one frame is
    // decoded. -s pins the output to the probed dimensions.
    let size = format!("{}x{}", width, height);
    let output = Command::new("ffmpeg")
        .args(["-v", "error", "-ss"])
        .arg(format!("{:.6}", timestamp))
        .arg("-i")
        .arg(path)
        .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgba", "-s"])
        .arg(&size)
        .arg("-")
        .output()
        .await
        .map_err(|e| LoadError::Network(format!("failed to run ffmpeg: {}", e)))?;

    if !output.status.success() {
        return Err(FrameError::Load(classify_load_failure(
            &output.status,
            &output.stderr,
        )));
    }

    let frame_size = width as usize * height as usize * 4;
    if output.stdout.len() < frame_size {
        return Err(FrameError::Capture(format!(
            "expected a {}x{} frame ({} bytes), got {} bytes",
            width,
            height,
            frame_size,
            output.stdout.len()
        )));
    }

    let mut frame = output.stdout;
    frame.truncate(frame_size);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Rgba;

    #[test]
    fn test_midpoint_of_ten_second_clip() {
        assert!((midpoint_secs(10.0) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_midpoint_of_short_clip() {
        assert!((midpoint_secs(0.5) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_raw_frame_encodes_at_native_dimensions() {
        // 4x2 solid red frame as ffmpeg would emit it
        let mut frame = Vec::new();
        for _ in 0..8 {
            frame.extend_from_slice(&[255, 0, 0, 255]);
        }

        let surface = Surface::from_rgba(4, 2, frame).unwrap();
        assert_eq!(surface.pixel(0, 0), Some(Rgba::opaque(255, 0, 0)));

        let png_bytes = surface.encode_png().unwrap();
        let image = EncodedImage::from_png(&png_bytes, 4, 2);
        assert!(!image.data.starts_with("data:"));

        let decoder = png::Decoder::new(std::io::Cursor::new(image.to_png_bytes().unwrap()));
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 4);
        assert_eq!(reader.info().height, 2);
    }

    #[test]
    fn test_truncated_frame_is_rejected() {
        // Half the bytes a 4x2 RGBA frame needs
        let result = Surface::from_rgba(4, 2, vec![0u8; 16]);
        assert!(result.is_err());
    }
}
