//! The remote service contract.

use crate::catalog::AspectRatio;
use crate::error::Result;
use crate::media::{GeneratedImage, InlineImage};
use async_trait::async_trait;

/// Options for a text-to-image call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    /// Number of images requested.
    pub count: u8,
    /// Output MIME type.
    pub mime_type: String,
    /// Aspect ratio.
    pub aspect_ratio: AspectRatio,
}

/// One part of a generated content response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// A text part.
    Text(String),
    /// An inline image part.
    Image(GeneratedImage),
}

/// Where a video job stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    /// Still running.
    Pending,
    /// Finished; the locator may be missing.
    Succeeded {
        /// Download locator for the first generated video.
        uri: Option<String>,
    },
    /// Finished with a service-side error.
    Failed(String),
    /// Finished, but every output was removed by safety filters.
    Filtered(String),
}

/// Opaque reference to a server-side video job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    /// Service-assigned operation name.
    pub name: String,
    /// Last known status.
    pub status: OperationStatus,
}

impl OperationHandle {
    /// Creates a handle that is still running.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: OperationStatus::Pending,
        }
    }

    /// Returns true once the job has finished, successfully or not.
    pub fn is_done(&self) -> bool {
        !matches!(self.status, OperationStatus::Pending)
    }
}

/// A remote generative service.
///
/// Every method is a single request. Sequencing, polling and result shaping
/// live in [`GenerationClient`](crate::client::GenerationClient).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generates images from a prompt.
    async fn text_to_image(
        &self,
        model: &str,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<Vec<GeneratedImage>>;

    /// Edits an image with a prompt, asking for image and text output.
    async fn edit(&self, model: &str, image: &InlineImage, prompt: &str)
        -> Result<Vec<ContentPart>>;

    /// Submits a video job.
    async fn submit_video(
        &self,
        model: &str,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<OperationHandle>;

    /// Re-reads the status of a video job.
    async fn poll_video(&self, handle: &OperationHandle) -> Result<OperationHandle>;

    /// Downloads a result locator with credentials attached.
    async fn fetch_binary(&self, uri: &str) -> Result<Vec<u8>>;

    /// Sends a plain-text instruction and returns the text answer.
    async fn translate(&self, model: &str, instruction: &str) -> Result<String>;
}
