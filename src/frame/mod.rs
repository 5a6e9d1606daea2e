//! Frame extraction module
//!
//! Captures one representative frame from a reference video as a still
//! image for the video-generation API.

mod extractor;

pub use extractor::{extract_midpoint_frame, FrameError};
