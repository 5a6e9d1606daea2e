//! Waveframe - turn audio and reference footage into AI-generated video.
//!
//! This is the main library crate for the waveframe application. It
//! converts user media into conditioning images (a rendered audio
//! waveform or a reference-video frame), builds a cinematic prompt, and
//! drives a hosted video-generation API to a finished video.

pub mod frame;
pub mod generate;
pub mod media;
pub mod raster;
pub mod utils;
pub mod waveform;
