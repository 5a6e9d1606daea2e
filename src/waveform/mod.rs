//! Waveform rasterization module
//!
//! Turns an audio source into a still image of its waveform for use as
//! a conditioning input to the video-generation API.

mod rasterizer;

pub use rasterizer::{rasterize_waveform, WaveformError, WaveformStyle};
