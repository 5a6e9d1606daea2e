//! Error types and handling
//!
//! Common error types used across the application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::FrameError;
use crate::generate::GenerateError;
use crate::waveform::WaveformError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Waveform error: {0}")]
    Waveform(#[from] WaveformError),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),
}

/// Error response for structured reporting
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let code = match &error {
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Waveform(_) => "WAVEFORM_ERROR",
            AppError::Frame(_) => "FRAME_ERROR",
            AppError::Generate(_) => "GENERATION_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
