//! Generation pipeline orchestration
//!
//! This module coordinates the full generation flow including
//! conditioning-image selection, request submission, operation polling,
//! and download.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::frame::extract_midpoint_frame;
use crate::media::EncodedImage;
use crate::waveform::{rasterize_waveform, WaveformStyle};

use super::client::VideoApiClient;
use super::prompt::{build_prompt, AudioMode, PromptSpec};
use super::types::{GenerateError, GenerateProgress};

/// Inputs for one generation run
pub struct GenerateRequest {
    /// Structured prompt inputs
    pub prompt: PromptSpec,
    /// Uploaded audio track (used when `prompt.audio` is `Upload`)
    pub audio: Option<Vec<u8>>,
    /// Optional reference video for the conditioning frame
    pub reference_video: Option<Vec<u8>>,
}

/// End-to-end generation pipeline
pub struct GeneratePipeline {
    client: VideoApiClient,
    style: WaveformStyle,
    cancel_flag: Arc<AtomicBool>,
}

impl GeneratePipeline {
    /// Create a new generation pipeline
    pub fn new(client: VideoApiClient, style: WaveformStyle, cancel_flag: Arc<AtomicBool>) -> Self {
        Self {
            client,
            style,
            cancel_flag,
        }
    }

    /// Run one generation request to completion, returning video bytes
    ///
    /// When a reference video is supplied its midpoint frame is tried
    /// first; a safety block on that frame falls back to the waveform
    /// image (or no image at all) instead of failing the run. Any other
    /// failure propagates immediately.
    pub async fn run<F>(
        &self,
        request: &GenerateRequest,
        progress: F,
    ) -> Result<Vec<u8>, GenerateError>
    where
        F: Fn(GenerateProgress),
    {
        progress(GenerateProgress::preparing());
        let prompt = build_prompt(&request.prompt);

        if let Some(reference) = &request.reference_video {
            progress(GenerateProgress::extracting_frame());
            let frame = extract_midpoint_frame(reference).await?;

            match self
                .generate(&prompt, Some(&frame), request.prompt.duration_secs, &progress)
                .await
            {
                Ok(video) => return Ok(video),
                Err(error) if error.is_safety_block() => {
                    tracing::warn!(
                        "reference frame rejected by safety filter, falling back: {}",
                        error
                    );
                    progress(GenerateProgress::safety_fallback());
                }
                Err(error) => return Err(error),
            }
        }

        let image = match (&request.audio, request.prompt.audio) {
            (Some(audio), AudioMode::Upload) => {
                progress(GenerateProgress::rendering_waveform());
                Some(rasterize_waveform(audio, &self.style).await?)
            }
            _ => None,
        };

        self.generate(&prompt, image.as_ref(), request.prompt.duration_secs, &progress)
            .await
    }

    async fn generate<F>(
        &self,
        prompt: &str,
        image: Option<&EncodedImage>,
        duration_secs: u32,
        progress: &F,
    ) -> Result<Vec<u8>, GenerateError>
    where
        F: Fn(GenerateProgress),
    {
        progress(GenerateProgress::submitting());
        let operation = self
            .client
            .start_generation(prompt, image, duration_secs)
            .await?;
        tracing::info!("operation {} started", operation.name);

        let operation = self
            .client
            .wait_for_operation(operation, &self.cancel_flag, progress)
            .await?;
        let uri = VideoApiClient::resolve_video_uri(&operation)?;

        progress(GenerateProgress::downloading());
        let video = self.client.download_video(uri).await?;

        progress(GenerateProgress::complete());
        tracing::info!("generated video downloaded: {} bytes", video.len());
        Ok(video)
    }
}
