//! Generation types and configuration
//!
//! This module defines the types used for generation progress tracking
//! and error handling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::FrameError;
use crate::waveform::WaveformError;

/// Rotating status lines shown while the operation is pending
pub const WAIT_MESSAGES: [&str; 8] = [
    "Analyzing audio waveform...",
    "Composing visual concepts based on your prompt...",
    "Generating initial video frames from audio cues...",
    "This can take a few minutes, thank you for your patience.",
    "Rendering high-fidelity motion...",
    "Syncing audio and video streams...",
    "Applying color and texture...",
    "Finalizing the video, almost there!",
];

/// Generation pipeline stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "type")]
pub enum GenerateStage {
    /// Building the prompt and choosing the conditioning image
    Preparing,
    /// Extracting the reference-video frame
    ExtractingFrame,
    /// Rendering the audio waveform image
    RenderingWaveform,
    /// Reference frame was rejected; retrying with the waveform image
    SafetyFallback,
    /// Submitting the generation request
    Submitting,
    /// Operation pending on the server
    Waiting { poll_count: u32 },
    /// Fetching the finished video
    Downloading,
    /// Generation completed successfully
    Complete,
    /// Generation failed with error
    Error { message: String },
}

/// Generation progress information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProgress {
    /// Progress percentage (0.0 to 100.0)
    pub percent: f32,
    /// Current stage of generation
    pub stage: GenerateStage,
}

impl GenerateProgress {
    pub fn preparing() -> Self {
        Self {
            percent: 0.0,
            stage: GenerateStage::Preparing,
        }
    }

    pub fn extracting_frame() -> Self {
        Self {
            percent: 5.0,
            stage: GenerateStage::ExtractingFrame,
        }
    }

    pub fn rendering_waveform() -> Self {
        Self {
            percent: 10.0,
            stage: GenerateStage::RenderingWaveform,
        }
    }

    pub fn safety_fallback() -> Self {
        Self {
            percent: 10.0,
            stage: GenerateStage::SafetyFallback,
        }
    }

    pub fn submitting() -> Self {
        Self {
            percent: 15.0,
            stage: GenerateStage::Submitting,
        }
    }

    pub fn waiting(poll_count: u32) -> Self {
        // Creep toward 90% while the server works
        let percent = (20.0 + poll_count as f32 * 2.0).min(90.0);
        Self {
            percent,
            stage: GenerateStage::Waiting { poll_count },
        }
    }

    pub fn downloading() -> Self {
        Self {
            percent: 95.0,
            stage: GenerateStage::Downloading,
        }
    }

    pub fn complete() -> Self {
        Self {
            percent: 100.0,
            stage: GenerateStage::Complete,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            percent: 0.0,
            stage: GenerateStage::Error { message },
        }
    }

    /// Human-readable status line for this progress tick
    pub fn message(&self) -> String {
        match &self.stage {
            GenerateStage::Preparing => "Preparing generation request...".to_string(),
            GenerateStage::ExtractingFrame => {
                "Extracting frame from reference video...".to_string()
            }
            GenerateStage::RenderingWaveform => "Processing audio waveform...".to_string(),
            GenerateStage::SafetyFallback => {
                "Reference frame blocked by safety settings. Retrying with audio waveform..."
                    .to_string()
            }
            GenerateStage::Submitting => "Starting video generation...".to_string(),
            GenerateStage::Waiting { poll_count } => {
                WAIT_MESSAGES[*poll_count as usize % WAIT_MESSAGES.len()].to_string()
            }
            GenerateStage::Downloading => "Fetching generated video...".to_string(),
            GenerateStage::Complete => "Video ready!".to_string(),
            GenerateStage::Error { message } => format!("Error: {}", message),
        }
    }
}

/// Generation errors
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("waveform rendering failed: {0}")]
    Waveform(#[from] WaveformError),

    #[error("frame extraction failed: {0}")]
    Frame(#[from] FrameError),

    #[error("request to the video API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("video generation failed: {message} (code: {code})")]
    Operation { code: i64, message: String },

    #[error("generation blocked by safety settings: {0}")]
    SafetyBlocked(String),

    #[error("operation finished without a download link")]
    MissingVideo,

    #[error("generation cancelled")]
    Cancelled,
}

impl GenerateError {
    /// True when the failure is the safety filter rejecting the image
    pub fn is_safety_block(&self) -> bool {
        matches!(self, GenerateError::SafetyBlocked(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waiting_percent_is_capped() {
        assert_eq!(GenerateProgress::waiting(0).percent, 20.0);
        assert_eq!(GenerateProgress::waiting(10).percent, 40.0);
        assert_eq!(GenerateProgress::waiting(500).percent, 90.0);
    }

    #[test]
    fn test_waiting_messages_rotate() {
        let first = GenerateProgress::waiting(0).message();
        let wrapped = GenerateProgress::waiting(WAIT_MESSAGES.len() as u32).message();
        assert_eq!(first, wrapped);

        let second = GenerateProgress::waiting(1).message();
        assert_ne!(first, second);
    }

    #[test]
    fn test_stage_serialization_is_tagged() {
        let progress = GenerateProgress::waiting(3);
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["stage"]["type"], "waiting");
        assert_eq!(json["stage"]["pollCount"], 3);
    }
}
