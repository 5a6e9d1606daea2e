//! Immediate-mode rasterization
//!
//! Owned RGBA surfaces and the drawing primitives used to build the
//! still images submitted to the video-generation API.

mod surface;

pub use surface::{RenderError, Rgba, Surface};
