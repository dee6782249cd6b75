//! REST API client for the video-generation endpoints.
//!
//! Wraps the generative-language HTTP API (long-running operation
//! submission and polling) using [`reqwest`]. One [`VeoApi`] instance is
//! scoped to a single API key; [`crate::generator::VideoGenerator`]
//! caches instances per key.

use base64::Engine;
use serde::Deserialize;
use veobatch_core::{ImageData, Job};

use crate::error::ClientError;

/// Default base URL of the generation service.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP client scoped to one API key.
#[derive(Debug)]
pub struct VeoApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A long-running generation operation as reported by the service.
#[derive(Debug, Deserialize)]
pub struct Operation {
    /// Server-assigned operation name, used for polling.
    pub name: String,
    /// Whether the operation has reached a terminal state.
    #[serde(default)]
    pub done: bool,
    /// Error payload, present only on terminal failure.
    #[serde(default)]
    pub error: Option<OperationError>,
    /// Result payload, present only on terminal success.
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

/// Error payload carried by a failed operation.
#[derive(Debug, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

impl Operation {
    /// Download URI of the first generated video, if any.
    pub fn first_video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .first()?
            .video
            .as_ref()?
            .uri
            .as_deref()
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

/// Build the JSON body for a generation request from a job's parameters.
///
/// The reference image, when present, is inlined as base64 alongside its
/// MIME type.
pub fn generation_request_body(job: &Job) -> serde_json::Value {
    let mut instance = serde_json::json!({ "prompt": job.prompt });
    if let Some(image) = &job.image {
        instance["image"] = image_payload(image);
    }

    serde_json::json!({
        "instances": [instance],
        "parameters": {
            "sampleCount": job.output_count,
            "aspectRatio": job.aspect_ratio,
        },
    })
}

fn image_payload(image: &ImageData) -> serde_json::Value {
    let encoded = base64::engine::general_purpose::STANDARD.encode(image.bytes());
    serde_json::json!({
        "bytesBase64Encoded": encoded,
        "mimeType": image.mime_type(),
    })
}

// ---------------------------------------------------------------------------
// VeoApi
// ---------------------------------------------------------------------------

impl VeoApi {
    /// Create an API client for one key, reusing a shared connection pool.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// The API key this client is scoped to.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Submit a generation request for `job`.
    ///
    /// Sends `POST /models/{model}:predictLongRunning` and returns the
    /// operation handle to poll.
    pub async fn generate_videos(&self, job: &Job) -> Result<Operation, ClientError> {
        let body = generation_request_body(job);
        let response = self
            .client
            .post(format!(
                "{}/models/{}:predictLongRunning",
                self.base_url, job.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Poll a previously submitted operation by name.
    pub async fn get_operation(&self, name: &str) -> Result<Operation, ClientError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Parse a JSON response, converting non-2xx statuses into
    /// [`ClientError::RemoteService`] with the raw body attached.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::RemoteService(format!(
                "service returned {status}: {body}"
            )));
        }
        Ok(response.json::<T>().await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use veobatch_core::{GlobalConfig, ImageData, InputType, Job, JobSpec};

    use super::*;

    // -- generation_request_body ----------------------------------------------

    #[test]
    fn text_request_carries_prompt_and_parameters() {
        let mut config = GlobalConfig::default();
        config.output_count = 3;
        config.aspect_ratio = "9:16".to_string();
        let job = Job::from_spec(JobSpec::new("a lighthouse in fog", config));

        let body = generation_request_body(&job);
        assert_eq!(body["instances"][0]["prompt"], "a lighthouse in fog");
        assert_eq!(body["parameters"]["sampleCount"], 3);
        assert_eq!(body["parameters"]["aspectRatio"], "9:16");
        assert!(body["instances"][0].get("image").is_none());
    }

    #[test]
    fn image_request_inlines_base64_payload() {
        let config = GlobalConfig {
            input_type: InputType::ImageToVideo,
            image: Some(ImageData::new(vec![0u8, 1, 2], "image/png")),
            ..GlobalConfig::default()
        };
        let job = Job::from_spec(JobSpec::new("animate this", config));

        let body = generation_request_body(&job);
        let image = &body["instances"][0]["image"];
        assert_eq!(image["mimeType"], "image/png");
        assert_eq!(image["bytesBase64Encoded"], "AAEC");
    }

    // -- Operation parsing ----------------------------------------------------

    #[test]
    fn pending_operation_parses() {
        let op: Operation =
            serde_json::from_str(r#"{"name":"operations/abc"}"#).unwrap();
        assert_eq!(op.name, "operations/abc");
        assert!(!op.done);
        assert!(op.error.is_none());
        assert!(op.first_video_uri().is_none());
    }

    #[test]
    fn failed_operation_carries_error_message() {
        let op: Operation = serde_json::from_str(
            r#"{"name":"operations/abc","done":true,"error":{"code":3,"message":"unsafe prompt"}}"#,
        )
        .unwrap();
        assert!(op.done);
        assert_eq!(op.error.unwrap().message, "unsafe prompt");
    }

    #[test]
    fn successful_operation_yields_first_video_uri() {
        let op: Operation = serde_json::from_str(
            r#"{
                "name": "operations/abc",
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [
                            {"video": {"uri": "https://dl.example/v0?alt=media"}},
                            {"video": {"uri": "https://dl.example/v1?alt=media"}}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            op.first_video_uri(),
            Some("https://dl.example/v0?alt=media")
        );
    }

    #[test]
    fn done_operation_without_samples_has_no_uri() {
        let op: Operation = serde_json::from_str(
            r#"{"name":"operations/abc","done":true,"response":{"generateVideoResponse":{"generatedSamples":[]}}}"#,
        )
        .unwrap();
        assert!(op.first_video_uri().is_none());
    }
}
