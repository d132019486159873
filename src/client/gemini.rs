//! Gemini Developer API backend (Imagen, Gemini, Veo).

use crate::client::backend::{
    ContentPart, GenerationBackend, ImageOptions, OperationHandle, OperationStatus,
};
use crate::error::{parse_retry_after, sanitize_error_message, GenStudioError, Result};
use crate::media::{GeneratedImage, GenerationMetadata, InlineImage};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Builder for [`GeminiBackend`].
#[derive(Debug, Clone, Default)]
pub struct GeminiBackendBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
}

impl GeminiBackendBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `API_KEY`, then `GOOGLE_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the API root (default: the public v1beta endpoint).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the backend, resolving the API key.
    pub fn build(self) -> Result<GeminiBackend> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                GenStudioError::Auth(
                    "API_KEY / GOOGLE_API_KEY not set and no API key provided".into(),
                )
            })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiBackend {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        })
    }
}

/// HTTP implementation of [`GenerationBackend`] for the Gemini Developer API.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiBackend {
    /// Creates a new `GeminiBackendBuilder`.
    pub fn builder() -> GeminiBackendBuilder {
        GeminiBackendBuilder::new()
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(&self, url: &str, body: &B) -> Result<R> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        Ok(response.json().await?)
    }

    async fn generate_content(&self, model: &str, body: &ContentRequest) -> Result<ContentResponse> {
        let url = self.model_url(model, "generateContent");
        let response: ContentResponse = self.post_json(&url, body).await?;

        // Prompt blocks come back as HTTP 200
        if let Some(err) = response.prompt_block() {
            return Err(err);
        }

        Ok(response)
    }

    /// Appends the API key as a `key` query parameter.
    fn authorize_uri(&self, uri: &str) -> String {
        if uri.contains('?') {
            format!("{}&key={}", uri, self.api_key)
        } else {
            format!("{}?key={}", uri, self.api_key)
        }
    }
}

fn is_safety_finish(reason: &str) -> bool {
    matches!(
        reason,
        "SAFETY"
            | "IMAGE_SAFETY"
            | "IMAGE_PROHIBITED_CONTENT"
            | "PROHIBITED_CONTENT"
            | "BLOCKLIST"
    )
}

fn download_error(status: reqwest::StatusCode) -> GenStudioError {
    GenStudioError::Api {
        status: status.as_u16(),
        message: format!(
            "failed to download video: {}",
            status.canonical_reason().unwrap_or("unknown status")
        ),
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> GenStudioError {
    let text = sanitize_error_message(text);
    if status == 402 {
        return GenStudioError::Billing(
            "billing issue: enable billing at https://aistudio.google.com".into(),
        );
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return GenStudioError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return GenStudioError::Auth(text);
    }
    let lower = text.to_lowercase();
    if lower.contains("safety")
        || lower.contains("blocked")
        || lower.contains("content_policy")
        || lower.contains("prohibited")
    {
        return GenStudioError::ContentBlocked(text);
    }
    GenStudioError::Api {
        status,
        message: text,
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn text_to_image(
        &self,
        model: &str,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<Vec<GeneratedImage>> {
        let start = Instant::now();
        let url = self.model_url(model, "predict");
        let body = PredictRequest::new(prompt, options);
        let response: PredictResponse = self.post_json(&url, &body).await?;

        let metadata = GenerationMetadata {
            model: Some(model.to_string()),
            duration_ms: Some(start.elapsed().as_millis() as u64),
        };

        let mut images = Vec::new();
        let mut filtered = Vec::new();
        for prediction in response.predictions {
            match prediction.bytes_base64_encoded {
                Some(b64) => images.push(GeneratedImage::from_base64(
                    &b64,
                    prediction.mime_type.as_deref(),
                    metadata.clone(),
                )?),
                None => filtered.extend(prediction.rai_filtered_reason),
            }
        }

        if images.is_empty() && !filtered.is_empty() {
            return Err(GenStudioError::ContentBlocked(filtered.join("; ")));
        }

        tracing::debug!(
            model,
            requested = options.count,
            returned = images.len(),
            "text-to-image complete"
        );
        Ok(images)
    }

    async fn edit(
        &self,
        model: &str,
        image: &InlineImage,
        prompt: &str,
    ) -> Result<Vec<ContentPart>> {
        let start = Instant::now();
        let body = ContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: WireInlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.to_base64(),
                        },
                    },
                    RequestPart::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            }),
        };

        let response = self.generate_content(model, &body).await?;
        let metadata = GenerationMetadata {
            model: Some(model.to_string()),
            duration_ms: Some(start.elapsed().as_millis() as u64),
        };
        response.into_parts(&metadata)
    }

    async fn submit_video(
        &self,
        model: &str,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<OperationHandle> {
        let url = self.model_url(model, "predictLongRunning");
        let body = VideoRequest::new(prompt, image);
        let operation: OperationResponse = self.post_json(&url, &body).await?;
        Ok(operation.into_handle())
    }

    async fn poll_video(&self, handle: &OperationHandle) -> Result<OperationHandle> {
        let url = format!("{}/{}", self.base_url, handle.name);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let operation: OperationResponse = response.json().await?;
        Ok(operation.into_handle())
    }

    async fn fetch_binary(&self, uri: &str) -> Result<Vec<u8>> {
        if uri.starts_with("gs://") {
            return Err(GenStudioError::VideoGeneration(format!(
                "result is a Google Cloud Storage URI ({}) which cannot be downloaded directly",
                uri
            )));
        }

        let response = self
            .client
            .get(self.authorize_uri(uri))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| GenStudioError::Network(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(status));
        }

        Ok(response
            .bytes()
            .await
            .map_err(|e| GenStudioError::Network(e.without_url()))?
            .to_vec())
    }

    async fn translate(&self, model: &str, instruction: &str) -> Result<String> {
        let body = ContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart::Text {
                    text: instruction.to_string(),
                }],
            }],
            generation_config: None,
        };
        let response = self.generate_content(model, &body).await?;
        if let Some(reason) = response.safety_stop() {
            return Err(GenStudioError::ContentBlocked(format!(
                "Content blocked by safety filter: {}",
                reason
            )));
        }
        Ok(response.text())
    }
}

// ── Imagen wire format ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u8,
    aspect_ratio: String,
    output_options: OutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: String,
}

impl PredictRequest {
    fn new(prompt: &str, options: &ImageOptions) -> Self {
        Self {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: options.count,
                aspect_ratio: options.aspect_ratio.as_str().to_string(),
                output_options: OutputOptions {
                    mime_type: options.mime_type.clone(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    rai_filtered_reason: Option<String>,
}

// ── generateContent wire format ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

/// A part in a request - text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: WireInlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<WireInlineData>,
}

impl ContentResponse {
    fn prompt_block(&self) -> Option<GenStudioError> {
        let feedback = self.prompt_feedback.as_ref()?;
        let reason = feedback.block_reason.as_ref()?;
        let msg = feedback
            .block_reason_message
            .clone()
            .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
        Some(GenStudioError::ContentBlocked(msg))
    }

    /// Safety finish reason of the first candidate, if it stopped on one.
    fn safety_stop(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .filter(|reason| is_safety_finish(reason))
    }

    fn first_parts(self) -> Vec<ResponsePart> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default()
    }

    fn into_parts(self, metadata: &GenerationMetadata) -> Result<Vec<ContentPart>> {
        let mut parts = Vec::new();
        for part in self.first_parts() {
            if let Some(text) = part.text {
                parts.push(ContentPart::Text(text));
            } else if let Some(inline) = part.inline_data {
                parts.push(ContentPart::Image(GeneratedImage::from_base64(
                    &inline.data,
                    Some(&inline.mime_type),
                    metadata.clone(),
                )?));
            }
        }
        Ok(parts)
    }

    fn text(self) -> String {
        self.first_parts()
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<String>()
    }
}

// ── Veo wire format ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<VideoImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    sample_count: u32,
}

impl VideoRequest {
    fn new(prompt: &str, image: Option<&InlineImage>) -> Self {
        Self {
            instances: vec![VideoInstance {
                prompt: prompt.to_string(),
                image: image.map(|img| VideoImage {
                    bytes_base64_encoded: img.to_base64(),
                    mime_type: img.mime_type.clone(),
                }),
            }],
            parameters: VideoParameters { sample_count: 1 },
        }
    }
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    name: String,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    response: Option<OperationResult>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    #[serde(default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Option<Vec<GeneratedSample>>,
    #[serde(default)]
    rai_media_filtered_count: Option<u32>,
    #[serde(default)]
    rai_media_filtered_reasons: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    #[serde(default)]
    video: Option<SampleVideo>,
}

#[derive(Debug, Deserialize)]
struct SampleVideo {
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    message: Option<String>,
}

impl OperationResponse {
    fn into_handle(self) -> OperationHandle {
        // An error is terminal whether or not `done` was set
        if let Some(err) = self.error {
            return OperationHandle {
                name: self.name,
                status: OperationStatus::Failed(
                    err.message.unwrap_or_else(|| "Unknown error".into()),
                ),
            };
        }

        if !self.done.unwrap_or(false) {
            return OperationHandle::pending(self.name);
        }

        let video_response = self.response.and_then(|r| r.generate_video_response);
        let status = match video_response {
            Some(resp) => {
                let samples = resp.generated_samples.unwrap_or_default();
                if resp.rai_media_filtered_count.unwrap_or(0) > 0 && samples.is_empty() {
                    let reasons = resp.rai_media_filtered_reasons.unwrap_or_default();
                    OperationStatus::Filtered(if reasons.is_empty() {
                        "Video was blocked by safety filters".into()
                    } else {
                        reasons.join("; ")
                    })
                } else {
                    OperationStatus::Succeeded {
                        uri: samples
                            .into_iter()
                            .next()
                            .and_then(|s| s.video)
                            .and_then(|v| v.uri),
                    }
                }
            }
            None => OperationStatus::Succeeded { uri: None },
        };

        OperationHandle {
            name: self.name,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AspectRatio;
    use crate::client::EditResult;

    fn backend() -> GeminiBackend {
        GeminiBackendBuilder::new().api_key("test-key").build().unwrap()
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let backend = GeminiBackendBuilder::new()
            .api_key("test-key")
            .base_url("http://localhost:8080/v1beta/")
            .build()
            .unwrap();
        assert_eq!(backend.base_url, "http://localhost:8080/v1beta");
        assert_eq!(
            backend.model_url("imagen-4.0-generate-001", "predict"),
            "http://localhost:8080/v1beta/models/imagen-4.0-generate-001:predict"
        );
    }

    #[test]
    fn test_builder_rejects_blank_key() {
        let result = GeminiBackendBuilder::new().api_key("  ").build();
        assert!(matches!(result, Err(GenStudioError::Auth(_))));
    }

    #[test]
    fn test_authorize_uri() {
        let backend = backend();
        assert_eq!(
            backend.authorize_uri("https://x/files/abc:download?alt=media"),
            "https://x/files/abc:download?alt=media&key=test-key"
        );
        assert_eq!(
            backend.authorize_uri("https://x/files/abc"),
            "https://x/files/abc?key=test-key"
        );
    }

    #[test]
    fn test_predict_request_wire_format() {
        let options = ImageOptions {
            count: 3,
            mime_type: "image/jpeg".into(),
            aspect_ratio: AspectRatio::Landscape,
        };
        let json = serde_json::to_value(PredictRequest::new("A lighthouse", &options)).unwrap();
        assert_eq!(json["instances"][0]["prompt"], "A lighthouse");
        assert_eq!(json["parameters"]["sampleCount"], 3);
        assert_eq!(json["parameters"]["aspectRatio"], "16:9");
        assert_eq!(json["parameters"]["outputOptions"]["mimeType"], "image/jpeg");
    }

    #[test]
    fn test_predict_response_with_filtered_entry() {
        let json = r#"{
            "predictions": [
                {"bytesBase64Encoded": "AQID", "mimeType": "image/jpeg"},
                {"raiFilteredReason": "filtered"}
            ]
        }"#;
        let resp: PredictResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.predictions.len(), 2);
        assert_eq!(resp.predictions[0].bytes_base64_encoded.as_deref(), Some("AQID"));
        assert!(resp.predictions[1].bytes_base64_encoded.is_none());
    }

    #[test]
    fn test_edit_request_wire_format() {
        let body = ContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: WireInlineData {
                            mime_type: "image/png".into(),
                            data: "AQID".into(),
                        },
                    },
                    RequestPart::Text {
                        text: "make it blue".into(),
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".into(), "TEXT".into()],
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["text"], "make it blue");
        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["IMAGE", "TEXT"])
        );
    }

    #[test]
    fn test_translate_request_omits_generation_config() {
        let body = ContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart::Text { text: "hi".into() }],
            }],
            generation_config: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_content_response_into_parts() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here you go"},
                        {"inlineData": {"mimeType": "image/png", "data": "AQID"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let resp: ContentResponse = serde_json::from_str(json).unwrap();
        let parts = resp.into_parts(&GenerationMetadata::default()).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], ContentPart::Text("Here you go".into()));
        match &parts[1] {
            ContentPart::Image(img) => assert_eq!(img.data, vec![1, 2, 3]),
            other => panic!("expected image part, got {:?}", other),
        }
    }

    #[test]
    fn test_safety_finish_keeps_edit_text() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "I can't edit that image."}]},
                "finishReason": "IMAGE_SAFETY"
            }]
        }"#;
        let resp: ContentResponse = serde_json::from_str(json).unwrap();
        assert!(resp.prompt_block().is_none());
        assert_eq!(resp.safety_stop(), Some("IMAGE_SAFETY"));

        let parts = resp.into_parts(&GenerationMetadata::default()).unwrap();
        let result = EditResult::from_parts(parts);
        assert_eq!(result.text.as_deref(), Some("I can't edit that image."));
        assert!(result.image.is_none());
    }

    #[test]
    fn test_prompt_feedback_block() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let resp: ContentResponse = serde_json::from_str(json).unwrap();
        match resp.prompt_block() {
            Some(GenStudioError::ContentBlocked(msg)) => assert_eq!(msg, "Prompt blocked: SAFETY"),
            other => panic!("expected ContentBlocked, got {:?}", other),
        }
    }

    #[test]
    fn test_recitation_is_not_a_safety_stop() {
        assert!(is_safety_finish("SAFETY"));
        assert!(is_safety_finish("IMAGE_SAFETY"));
        assert!(!is_safety_finish("RECITATION"));
        assert!(!is_safety_finish("IMAGE_RECITATION"));
        assert!(!is_safety_finish("STOP"));

        let json = r#"{"candidates": [{"content": {"parts": [{"text": "partial"}]}, "finishReason": "RECITATION"}]}"#;
        let resp: ContentResponse = serde_json::from_str(json).unwrap();
        assert!(resp.safety_stop().is_none());
    }

    #[test]
    fn test_content_response_without_candidates_is_empty() {
        let resp: ContentResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.into_parts(&GenerationMetadata::default()).unwrap().is_empty());
    }

    #[test]
    fn test_content_response_text_joins_parts() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": " Hola "}, {"text": "mundo\n"}]}}]}"#;
        let resp: ContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text(), " Hola mundo\n");
    }

    #[test]
    fn test_video_request_wire_format() {
        let image = InlineImage::new(vec![1, 2, 3], "image/png");
        let json = serde_json::to_value(VideoRequest::new("Waves", Some(&image))).unwrap();
        let instance = &json["instances"][0];
        assert_eq!(instance["prompt"], "Waves");
        assert_eq!(instance["image"]["bytesBase64Encoded"], "AQID");
        assert_eq!(instance["image"]["mimeType"], "image/png");
        assert_eq!(json["parameters"]["sampleCount"], 1);

        let json = serde_json::to_value(VideoRequest::new("Waves", None)).unwrap();
        assert!(json["instances"][0].get("image").is_none());
    }

    #[test]
    fn test_operation_not_done() {
        let json = r#"{"name": "operations/123", "done": false}"#;
        let resp: OperationResponse = serde_json::from_str(json).unwrap();
        let handle = resp.into_handle();
        assert_eq!(handle.name, "operations/123");
        assert!(!handle.is_done());

        let json = r#"{"name": "operations/123"}"#;
        let resp: OperationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_handle().status, OperationStatus::Pending);
    }

    #[test]
    fn test_operation_done_with_video() {
        let json = r#"{
            "name": "operations/123",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [{
                        "video": {"uri": "https://example.com/video.mp4?alt=media"}
                    }]
                }
            }
        }"#;
        let resp: OperationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_handle().status,
            OperationStatus::Succeeded {
                uri: Some("https://example.com/video.mp4?alt=media".into())
            }
        );
    }

    #[test]
    fn test_operation_done_without_uri() {
        let json = r#"{"name": "operations/123", "done": true, "response": {}}"#;
        let resp: OperationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_handle().status,
            OperationStatus::Succeeded { uri: None }
        );
    }

    #[test]
    fn test_operation_with_error() {
        let json = r#"{
            "name": "operations/123",
            "done": true,
            "error": {"message": "Quota exceeded"}
        }"#;
        let resp: OperationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_handle().status,
            OperationStatus::Failed("Quota exceeded".into())
        );
    }

    #[test]
    fn test_operation_filtered() {
        let json = r#"{
            "name": "operations/123",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "raiMediaFilteredCount": 1,
                    "raiMediaFilteredReasons": ["Contains a celebrity likeness"]
                }
            }
        }"#;
        let resp: OperationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_handle().status,
            OperationStatus::Filtered("Contains a celebrity likeness".into())
        );
    }

    #[test]
    fn test_parse_error_mapping() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            parse_error(429, "quota", &headers),
            GenStudioError::RateLimited { .. }
        ));
        assert!(matches!(
            parse_error(403, "denied", &headers),
            GenStudioError::Auth(_)
        ));
        assert!(matches!(
            parse_error(400, "Request was blocked", &headers),
            GenStudioError::ContentBlocked(_)
        ));

        let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}}"#;
        match parse_error(400, body, &headers) {
            GenStudioError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(message.starts_with("API key not valid"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_download_error_names_status() {
        let err = download_error(reqwest::StatusCode::NOT_FOUND);
        assert!(matches!(err, GenStudioError::Api { status: 404, .. }));
        assert!(err.to_string().contains("failed to download video: Not Found"));
    }

    /// Answers one HTTP request with `status` and `body`; yields the request line.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (std::net::SocketAddr, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = String::from_utf8_lossy(&request).to_string();
            let length = head
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let header_end = request
                .windows(4)
                .position(|w| w == b"\r\n\r\n")
                .map_or(request.len(), |p| p + 4);
            let mut received = request.len() - header_end;
            while received < length {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received += n;
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            head.lines().next().unwrap_or_default().to_string()
        });
        (addr, server)
    }

    #[tokio::test]
    async fn test_fetch_binary_sends_key_and_reports_status() {
        let (addr, server) = serve_once("404 Not Found", "").await;

        let err = backend()
            .fetch_binary(&format!("http://{}/files/v.mp4?alt=media", addr))
            .await
            .unwrap_err();
        let request_line = server.await.unwrap();

        assert!(request_line.starts_with("GET /files/v.mp4?alt=media&key=test-key "));
        assert!(matches!(err, GenStudioError::Api { status: 404, .. }));
        let message = err.to_string();
        assert!(message.contains("Not Found"));
        assert!(!message.contains("test-key"));
    }

    #[tokio::test]
    async fn test_edit_with_safety_finish_returns_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"I can't edit that image."}]},"finishReason":"IMAGE_SAFETY"}]}"#;
        let (addr, server) = serve_once("200 OK", body).await;
        let backend = GeminiBackendBuilder::new()
            .api_key("test-key")
            .base_url(format!("http://{}/v1beta", addr))
            .build()
            .unwrap();

        let image = InlineImage::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        let parts = backend
            .edit("gemini-2.5-flash-image", &image, "remove the person")
            .await
            .unwrap();
        let request_line = server.await.unwrap();

        assert!(request_line
            .starts_with("POST /v1beta/models/gemini-2.5-flash-image:generateContent "));
        assert_eq!(parts, vec![ContentPart::Text("I can't edit that image.".into())]);
    }

    #[test]
    fn test_gs_uri_is_rejected() {
        let backend = backend();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let err = rt
            .block_on(backend.fetch_binary("gs://my-bucket/video.mp4"))
            .unwrap_err();
        assert!(err.to_string().contains("Google Cloud Storage"));
    }
}
