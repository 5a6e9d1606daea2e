//! Video-generation API client
//!
//! Submits generation requests, polls the returned long-running
//! operation, and downloads the finished video.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::{GenerateError, GenerateProgress};
use crate::media::EncodedImage;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "veo-2.0-generate-001";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL
    pub base_url: String,
    /// Generation model id
    pub model: String,
    /// API key sent with every request
    pub api_key: String,
    /// Delay between operation polls
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Long-running generation job handle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

impl Operation {
    /// Download URI of the first generated video, if any
    pub fn first_video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generated_videos
            .first()?
            .video
            .as_ref()
            .map(|video| video.uri.as_str())
    }
}

/// Terminal operation failure reported by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl OperationError {
    /// True when the failure is a safety rejection of the request image
    ///
    /// The API has no dedicated block code: some routes report a
    /// FAILED_PRECONDITION status, others only describe the block inside
    /// the message text, so the message match stays as a fallback.
    pub fn is_safety_block(&self) -> bool {
        if self.status.as_deref() == Some("FAILED_PRECONDITION") {
            return true;
        }
        let message = self.message.to_lowercase();
        message.contains("safety settings for person/face generation")
            || (message.contains("blocked") && message.contains("safety"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generated_videos: Vec<GeneratedVideo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVideo {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRef {
    pub uri: String,
}

/// Request body for a generation submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideosRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<InlineImage<'a>>,
    config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineImage<'a> {
    image_bytes: &'a str,
    mime_type: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    number_of_videos: u32,
    duration_seconds: u32,
}

/// Client for the hosted video-generation API
pub struct VideoApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl VideoApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Submit a generation request, returning the pending operation
    pub async fn start_generation(
        &self,
        prompt: &str,
        image: Option<&EncodedImage>,
        duration_secs: u32,
    ) -> Result<Operation, GenerateError> {
        let body = GenerateVideosRequest {
            prompt,
            image: image.map(|image| InlineImage {
                image_bytes: &image.data,
                mime_type: image.mime_type(),
            }),
            config: GenerationConfig {
                number_of_videos: 1,
                duration_seconds: duration_secs,
            },
        };

        let url = format!(
            "{}/models/{}:generateVideos",
            self.config.base_url, self.config.model
        );
        tracing::info!("submitting generation request to {}", self.config.model);

        let operation = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<Operation>()
            .await?;

        Ok(operation)
    }

    /// Re-fetch the state of a pending operation
    pub async fn poll_operation(&self, operation: &Operation) -> Result<Operation, GenerateError> {
        let url = format!("{}/{}", self.config.base_url, operation.name);
        let operation = self
            .http
            .get(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await?
            .error_for_status()?
            .json::<Operation>()
            .await?;

        Ok(operation)
    }

    /// Poll until the operation reaches a terminal state
    ///
    /// `cancel` is checked before every poll and progress is reported
    /// once per tick.
    pub async fn wait_for_operation<F>(
        &self,
        mut operation: Operation,
        cancel: &AtomicBool,
        progress: &F,
    ) -> Result<Operation, GenerateError>
    where
        F: Fn(GenerateProgress),
    {
        let mut poll_count: u32 = 0;
        while !operation.done {
            if cancel.load(Ordering::Relaxed) {
                return Err(GenerateError::Cancelled);
            }
            progress(GenerateProgress::waiting(poll_count));
            tokio::time::sleep(self.config.poll_interval).await;
            operation = self.poll_operation(&operation).await?;
            poll_count += 1;
        }

        tracing::info!("operation {} reached terminal state", operation.name);
        Ok(operation)
    }

    /// Resolve a finished operation into its video download URI
    pub fn resolve_video_uri(operation: &Operation) -> Result<&str, GenerateError> {
        if let Some(error) = &operation.error {
            if error.is_safety_block() {
                return Err(GenerateError::SafetyBlocked(error.message.clone()));
            }
            return Err(GenerateError::Operation {
                code: error.code,
                message: error.message.clone(),
            });
        }
        operation
            .first_video_uri()
            .ok_or(GenerateError::MissingVideo)
    }

    /// Download the generated video bytes
    pub async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenerateError> {
        let url = with_api_key(uri, &self.config.api_key);
        let bytes = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(bytes.to_vec())
    }
}

/// Append the API key to a download URI, keeping existing query params
fn with_api_key(uri: &str, key: &str) -> String {
    if uri.contains('?') {
        format!("{}&key={}", uri, key)
    } else {
        format!("{}?key={}", uri, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operation_from(json: serde_json::Value) -> Operation {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_pending_operation_deserializes() {
        let operation = operation_from(serde_json::json!({
            "name": "models/veo/operations/abc123"
        }));

        assert_eq!(operation.name, "models/veo/operations/abc123");
        assert!(!operation.done);
        assert!(operation.error.is_none());
        assert!(operation.first_video_uri().is_none());
    }

    #[test]
    fn test_finished_operation_exposes_video_uri() {
        let operation = operation_from(serde_json::json!({
            "name": "models/veo/operations/abc123",
            "done": true,
            "response": {
                "generatedVideos": [
                    { "video": { "uri": "https://example.com/v.mp4?alt=media" } }
                ]
            }
        }));

        assert!(operation.done);
        assert_eq!(
            operation.first_video_uri(),
            Some("https://example.com/v.mp4?alt=media")
        );
    }

    #[test]
    fn test_resolve_reports_operation_error() {
        let operation = operation_from(serde_json::json!({
            "name": "op",
            "done": true,
            "error": { "code": 13, "message": "internal error" }
        }));

        let error = VideoApiClient::resolve_video_uri(&operation).unwrap_err();
        assert!(matches!(
            error,
            GenerateError::Operation { code: 13, .. }
        ));
    }

    #[test]
    fn test_resolve_reports_safety_block() {
        let operation = operation_from(serde_json::json!({
            "name": "op",
            "done": true,
            "error": {
                "code": 3,
                "message": "Request blocked by your current safety settings for person/face generation"
            }
        }));

        let error = VideoApiClient::resolve_video_uri(&operation).unwrap_err();
        assert!(error.is_safety_block());
    }

    #[test]
    fn test_resolve_missing_video_is_distinct() {
        let operation = operation_from(serde_json::json!({
            "name": "op",
            "done": true,
            "response": { "generatedVideos": [] }
        }));

        let error = VideoApiClient::resolve_video_uri(&operation).unwrap_err();
        assert!(matches!(error, GenerateError::MissingVideo));
    }

    #[test]
    fn test_safety_block_detection() {
        let status_block = OperationError {
            code: 9,
            message: "request rejected".to_string(),
            status: Some("FAILED_PRECONDITION".to_string()),
        };
        assert!(status_block.is_safety_block());

        let message_block = OperationError {
            code: 3,
            message: "Generation blocked by safety filters".to_string(),
            status: None,
        };
        assert!(message_block.is_safety_block());

        let plain_failure = OperationError {
            code: 13,
            message: "backend unavailable".to_string(),
            status: Some("INTERNAL".to_string()),
        };
        assert!(!plain_failure.is_safety_block());
    }

    #[test]
    fn test_with_api_key_preserves_existing_query() {
        assert_eq!(
            with_api_key("https://x.test/v.mp4?alt=media", "k"),
            "https://x.test/v.mp4?alt=media&key=k"
        );
        assert_eq!(
            with_api_key("https://x.test/v.mp4", "k"),
            "https://x.test/v.mp4?key=k"
        );
    }
}
