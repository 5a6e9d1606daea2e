//! FFmpeg-based waveform rasterization
//!
//! Decodes audio to raw PCM using FFmpeg, block-averages absolute
//! amplitudes into a fixed number of bars, and draws them as gradient
//! rectangles on an RGBA surface.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;

use crate::media::{error_summary, EncodedImage, StagedMedia};
use crate::raster::{RenderError, Rgba, Surface};

/// Decode sample rate. 8kHz mono is enough to shape amplitude bars.
const DECODE_SAMPLE_RATE: u32 = 8000;

/// Waveform rasterization errors
#[derive(Error, Debug)]
pub enum WaveformError {
    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("failed to render waveform: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rendering parameters for the waveform image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveformStyle {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Width of each amplitude bar in pixels
    pub bar_width: u32,
    /// Horizontal gap between bars in pixels
    pub bar_padding: u32,
    /// Background fill color (hex)
    pub background: String,
    /// Gradient color at the bottom of each bar (hex)
    pub gradient_bottom: String,
    /// Gradient color at the top of each bar (hex)
    pub gradient_top: String,
}

impl Default for WaveformStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 150,
            bar_width: 2,
            bar_padding: 1,
            background: "#1f2937".to_string(),
            gradient_bottom: "#818cf8".to_string(),
            gradient_top: "#c084fc".to_string(),
        }
    }
}

impl WaveformStyle {
    /// Number of bars that fit the canvas at the configured pitch
    pub fn bar_count(&self) -> usize {
        let pitch = self.bar_width + self.bar_padding;
        if pitch == 0 {
            return 0;
        }
        (self.width / pitch) as usize
    }
}

/// Render an audio source's waveform as a base64-encoded PNG
///
/// Decodes the audio, averages absolute amplitudes into one value per
/// bar, and draws gradient bars over a solid background at the
/// configured canvas size. Decode failures propagate as
/// [`WaveformError::Decode`] with no fallback image.
pub async fn rasterize_waveform(
    audio: &[u8],
    style: &WaveformStyle,
) -> Result<EncodedImage, WaveformError> {
    let bar_count = style.bar_count();
    if bar_count == 0 {
        return Err(WaveformError::Render(RenderError::InvalidDimensions(
            style.width,
            style.height,
        )));
    }

    let staged = StagedMedia::stage(audio)?;
    let samples = decode_samples(staged.path()).await?;
    drop(staged);

    tracing::debug!(
        "decoded {} samples, rendering {} bars at {}x{}",
        samples.len(),
        bar_count,
        style.width,
        style.height
    );

    let bars = downsample_to_bars(&samples, bar_count);
    let surface = render_bars(&bars, style)?;
    let png = surface.encode_png()?;

    Ok(EncodedImage::from_png(&png, style.width, style.height))
}

/// Decode audio into mono f32 samples via FFmpeg
///
/// Output format: 16-bit signed little-endian mono at the fixed decode
/// rate, normalized to [-1.0, 1.0].
async fn decode_samples(path: &Path) -> Result<Vec<f32>, WaveformError> {
    let output = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-ac", "1", "-ar"])
        .arg(DECODE_SAMPLE_RATE.to_string())
        .args(["-f", "s16le", "-acodec", "pcm_s16le", "-"])
        .output()
        .await
        .map_err(|e| WaveformError::Decode(format!("failed to run ffmpeg: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(WaveformError::Decode(error_summary(&stderr)));
    }

    let samples: Vec<f32> = output
        .stdout
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]) as f32 / i16::MAX as f32)
        .collect();

    if samples.is_empty() {
        return Err(WaveformError::Decode(
            "source contains no audio samples".to_string(),
        ));
    }

    Ok(samples)
}

/// Mean absolute amplitude per bar
///
/// Always returns exactly `bar_count` values. The block size is clamped
/// to at least one sample and bars past the end of a short buffer are
/// zero, so no block ever divides by zero.
pub(crate) fn downsample_to_bars(samples: &[f32], bar_count: usize) -> Vec<f32> {
    if bar_count == 0 {
        return Vec::new();
    }
    if samples.is_empty() {
        return vec![0.0; bar_count];
    }

    let step = (samples.len() / bar_count).max(1);
    let mut bars = Vec::with_capacity(bar_count);

    for i in 0..bar_count {
        let start = i * step;
        if start >= samples.len() {
            bars.push(0.0);
            continue;
        }
        let block = &samples[start..(start + step).min(samples.len())];
        let sum: f32 = block.iter().map(|s| s.abs()).sum();
        bars.push(sum / block.len() as f32);
    }

    bars
}

/// Draw the bar series onto a fresh surface
///
/// Bar heights scale linearly from [0, max(bars)] to [0, canvas height].
/// An all-zero series renders background only.
fn render_bars(bars: &[f32], style: &WaveformStyle) -> Result<Surface, RenderError> {
    let mut surface = Surface::new(style.width, style.height)?;
    surface.fill(Rgba::from_hex(&style.background)?);

    let max = bars.iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return Ok(surface);
    }

    let bottom = Rgba::from_hex(&style.gradient_bottom)?;
    let top = Rgba::from_hex(&style.gradient_top)?;
    let pitch = style.bar_width + style.bar_padding;

    for (i, &value) in bars.iter().enumerate() {
        let bar_height = ((value / max) * style.height as f32).round() as u32;
        let bar_height = bar_height.min(style.height);
        if bar_height == 0 {
            continue;
        }
        let x = i as u32 * pitch;
        let y = style.height - bar_height;
        surface.fill_rect_gradient(x, y, style.bar_width, bar_height, bottom, top);
    }

    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downsample_bar_count() {
        // One second of a ramp at the decode rate
        let samples: Vec<f32> = (0..8000).map(|i| i as f32 / 8000.0).collect();
        let bars = downsample_to_bars(&samples, 266);

        assert_eq!(bars.len(), 266);
        assert!(bars.iter().all(|&b| b >= 0.0));
        // Amplitude grows over time, so later bars are taller
        assert!(bars[200] > bars[10]);
    }

    #[test]
    fn test_downsample_negative_samples_become_positive_bars() {
        let samples = vec![-0.5f32; 1000];
        let bars = downsample_to_bars(&samples, 10);

        assert_eq!(bars.len(), 10);
        for bar in bars {
            assert!((bar - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_downsample_empty_input() {
        let bars = downsample_to_bars(&[], 266);
        assert_eq!(bars.len(), 266);
        assert!(bars.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_downsample_fewer_samples_than_bars() {
        // 5 samples into 10 bars: leading bars carry one sample each,
        // the rest are zero
        let samples = vec![1.0f32; 5];
        let bars = downsample_to_bars(&samples, 10);

        assert_eq!(bars.len(), 10);
        assert_eq!(&bars[..5], &[1.0; 5]);
        assert_eq!(&bars[5..], &[0.0; 5]);
    }

    #[test]
    fn test_render_all_zero_series_is_background_only() {
        let style = WaveformStyle::default();
        let bars = vec![0.0f32; style.bar_count()];
        let surface = render_bars(&bars, &style).unwrap();

        let background = Rgba::from_hex(&style.background).unwrap();
        assert_eq!(surface.pixel(0, style.height - 1), Some(background));
        assert_eq!(surface.pixel(style.width - 1, 0), Some(background));
    }

    #[test]
    fn test_render_full_bar_reaches_top() {
        let style = WaveformStyle::default();
        let mut bars = vec![0.0f32; style.bar_count()];
        bars[0] = 1.0;
        let surface = render_bars(&bars, &style).unwrap();

        let top = Rgba::from_hex(&style.gradient_top).unwrap();
        let bottom = Rgba::from_hex(&style.gradient_bottom).unwrap();
        assert_eq!(surface.pixel(0, 0), Some(top));
        assert_eq!(surface.pixel(0, style.height - 1), Some(bottom));

        // The padding column after the bar stays background
        let background = Rgba::from_hex(&style.background).unwrap();
        assert_eq!(surface.pixel(style.bar_width, 0), Some(background));
    }

    #[test]
    fn test_rendered_image_dimensions() {
        let style = WaveformStyle::default();
        let bars: Vec<f32> = (0..style.bar_count()).map(|i| i as f32).collect();
        let surface = render_bars(&bars, &style).unwrap();
        let png_bytes = surface.encode_png().unwrap();

        let image = EncodedImage::from_png(&png_bytes, style.width, style.height);
        assert!(!image.data.starts_with("data:"));

        let decoder = png::Decoder::new(std::io::Cursor::new(image.to_png_bytes().unwrap()));
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 800);
        assert_eq!(reader.info().height, 150);
    }

    #[test]
    fn test_default_style_bar_count() {
        // 800px wide at 3px pitch
        assert_eq!(WaveformStyle::default().bar_count(), 266);
    }

    #[test]
    fn test_zero_pitch_style_has_no_bars() {
        let style = WaveformStyle {
            bar_width: 0,
            bar_padding: 0,
            ..WaveformStyle::default()
        };
        assert_eq!(style.bar_count(), 0);
    }
}
