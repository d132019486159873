//! Stateless generation operations over a [`GenerationBackend`].
//!
//! The client validates arguments, sequences remote calls and normalizes
//! results. It does not classify failures; remote errors are returned as-is
//! so the caller can decide what the user sees.
//!
//! ```no_run
//! use genstudio::{AspectRatio, GenerationClient};
//!
//! #[tokio::main]
//! async fn main() -> genstudio::Result<()> {
//!     let client = GenerationClient::gemini()?;
//!     let images = client
//!         .generate_images("A lighthouse at dusk", AspectRatio::Landscape, 2)
//!         .await?;
//!     images[0].save("lighthouse.jpg")?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod gemini;
pub mod lro;
mod types;

pub use backend::{ContentPart, GenerationBackend, ImageOptions, OperationHandle, OperationStatus};
pub use gemini::{GeminiBackend, GeminiBackendBuilder};
pub use lro::{LroProgress, LroState, ProgressFn, DEFAULT_POLL_INTERVAL};
pub use types::{EditResult, GenerationRequest, GenerationResult};

use crate::catalog::{AspectRatio, Model};
use crate::error::{GenStudioError, Result};
use crate::media::{GeneratedImage, GeneratedVideo, InlineImage, VideoMetadata};
use lro::Poller;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Largest image count a single request may ask for.
pub const MAX_IMAGE_COUNT: u8 = 4;

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
const VIDEO_MIME: &str = "video/mp4";

/// Service model identifiers used for each operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIds {
    /// Text-to-image model.
    pub image: String,
    /// Image edit model.
    pub edit: String,
    /// Video model.
    pub video: String,
    /// Text model used for translation.
    pub text: String,
}

impl Default for ModelIds {
    fn default() -> Self {
        Self {
            image: Model::Imagen4.id().to_string(),
            edit: Model::NanoBanana.id().to_string(),
            video: Model::Veo2.id().to_string(),
            text: Model::TEXT_MODEL_ID.to_string(),
        }
    }
}

/// Builder for [`GenerationClient`].
pub struct GenerationClientBuilder {
    backend: Arc<dyn GenerationBackend>,
    models: ModelIds,
    poll_interval: Duration,
    max_wait: Option<Duration>,
    image_mime_type: String,
}

impl GenerationClientBuilder {
    /// Creates a builder over `backend` with default models and timing.
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            models: ModelIds::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
            image_mime_type: DEFAULT_IMAGE_MIME.to_string(),
        }
    }

    /// Overrides the model identifiers.
    pub fn models(mut self, models: ModelIds) -> Self {
        self.models = models;
        self
    }

    /// Sets the wait between video status polls (default: 10s).
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Caps the total video wait. Unbounded by default.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Sets the requested output MIME type for generated images.
    pub fn image_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.image_mime_type = mime.into();
        self
    }

    /// Builds the client.
    pub fn build(self) -> GenerationClient {
        GenerationClient {
            backend: self.backend,
            models: self.models,
            poll_interval: self.poll_interval,
            max_wait: self.max_wait,
            image_mime_type: self.image_mime_type,
        }
    }
}

/// Image, edit, video and translation operations.
pub struct GenerationClient {
    backend: Arc<dyn GenerationBackend>,
    models: ModelIds,
    poll_interval: Duration,
    max_wait: Option<Duration>,
    image_mime_type: String,
}

impl GenerationClient {
    /// Creates a builder over `backend`.
    pub fn builder(backend: Arc<dyn GenerationBackend>) -> GenerationClientBuilder {
        GenerationClientBuilder::new(backend)
    }

    /// Creates a client over the Gemini API using the key from the environment.
    pub fn gemini() -> Result<Self> {
        let backend = GeminiBackend::builder().build()?;
        Ok(Self::builder(Arc::new(backend)).build())
    }

    /// Returns the model identifiers in use.
    pub fn models(&self) -> &ModelIds {
        &self.models
    }

    /// Generates up to `count` images (1 to 4).
    ///
    /// Fewer images than requested is not an error; the service sometimes
    /// under-delivers.
    pub async fn generate_images(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        count: u8,
    ) -> Result<Vec<GeneratedImage>> {
        if !(1..=MAX_IMAGE_COUNT).contains(&count) {
            return Err(GenStudioError::InvalidRequest(format!(
                "image count must be between 1 and {}, got {}",
                MAX_IMAGE_COUNT, count
            )));
        }

        let options = ImageOptions {
            count,
            mime_type: self.image_mime_type.clone(),
            aspect_ratio,
        };
        let start = Instant::now();
        let mut images = self
            .backend
            .text_to_image(&self.models.image, prompt, &options)
            .await?;
        images.truncate(count as usize);

        tracing::debug!(
            model = %self.models.image,
            requested = count,
            received = images.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "generated images"
        );
        Ok(images)
    }

    /// Edits `image` according to `prompt`.
    pub async fn edit_image(&self, prompt: &str, image: &InlineImage) -> Result<EditResult> {
        let parts = self.backend.edit(&self.models.edit, image, prompt).await?;
        let result = EditResult::from_parts(parts);
        if result.image.is_none() {
            tracing::debug!(model = %self.models.edit, "edit returned no image");
        }
        Ok(result)
    }

    /// Generates a video, polling until the operation finishes.
    pub async fn generate_video(
        &self,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<GeneratedVideo> {
        self.generate_video_with_progress(prompt, image, &|_| {})
            .await
    }

    /// Like [`generate_video`](Self::generate_video), reporting each state
    /// change and poll to `on_progress`.
    pub async fn generate_video_with_progress(
        &self,
        prompt: &str,
        image: Option<&InlineImage>,
        on_progress: ProgressFn<'_>,
    ) -> Result<GeneratedVideo> {
        let start = Instant::now();
        let handle = self
            .backend
            .submit_video(&self.models.video, prompt, image)
            .await?;
        tracing::debug!(
            operation = %handle.name,
            model = %self.models.video,
            with_image = image.is_some(),
            "video operation submitted"
        );

        let resolved = Poller::new(&*self.backend, self.poll_interval, self.max_wait)
            .resolve(handle, on_progress)
            .await?;

        let data = self.backend.fetch_binary(&resolved.uri).await?;
        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            polls = resolved.polls,
            bytes = data.len(),
            duration_ms,
            "video downloaded"
        );

        Ok(GeneratedVideo::new(
            data,
            VIDEO_MIME,
            resolved.uri,
            VideoMetadata {
                model: Some(self.models.video.clone()),
                duration_ms: Some(duration_ms),
                polls: resolved.polls,
            },
        ))
    }

    /// Translates `text` from `source_lang` to `target_lang`.
    ///
    /// Blank input returns an empty string without calling the service.
    pub async fn translate_text(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let instruction = format!(
            "Translate the following text from {} to {}. Only provide the translated text, \
             without any preamble or explanation.\n\nText: \"{}\"",
            source_lang, target_lang, text
        );
        let translated = self
            .backend
            .translate(&self.models.text, &instruction)
            .await?;
        Ok(translated.trim().to_string())
    }

    /// Dispatches a request to the matching operation.
    pub async fn execute(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        match request {
            GenerationRequest::TextToImage {
                prompt,
                aspect_ratio,
                count,
            } => self
                .generate_images(prompt, *aspect_ratio, *count)
                .await
                .map(GenerationResult::ImageSet),
            GenerationRequest::ImageEdit { prompt, image } => self
                .edit_image(prompt, image)
                .await
                .map(GenerationResult::Edit),
            GenerationRequest::TextToVideo { prompt, image } => self
                .generate_video(prompt, image.as_ref())
                .await
                .map(GenerationResult::Video),
            GenerationRequest::Translate {
                text,
                source_lang,
                target_lang,
            } => self
                .translate_text(text, source_lang, target_lang)
                .await
                .map(GenerationResult::Translation),
        }
    }
}
