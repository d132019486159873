#![warn(missing_docs)]
//! GenStudio - prompt-driven image, edit and video generation.
//!
//! The crate has three layers:
//!
//! - [`GenerationClient`]: stateless operations (text-to-image, image edit,
//!   text/image-to-video, translation) over a [`GenerationBackend`]. Video
//!   jobs are submitted, polled at a fixed interval and then downloaded.
//! - [`classify`]: maps raw failures to a few user-facing categories.
//! - [`Studio`]: the state controller that owns form values, results and a
//!   bounded history, and runs one request per surface at a time.
//!
//! # Quick Start
//!
//! ```no_run
//! use genstudio::{GenerationClient, Studio};
//!
//! #[tokio::main]
//! async fn main() -> genstudio::Result<()> {
//!     let studio = Studio::new(GenerationClient::gemini()?);
//!     studio.set_prompt("A golden retriever puppy");
//!     studio.generate().await.ok();
//!
//!     let state = studio.snapshot();
//!     if let Some(error) = state.image.error {
//!         eprintln!("{error}");
//!     }
//!     for (i, image) in state.image.images.iter().enumerate() {
//!         image.save(format!("puppy-{i}.jpg"))?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `genstudio` command-line front end

pub mod catalog;
pub mod classify;
pub mod client;
mod error;
pub mod media;
pub mod studio;

#[cfg(test)]
mod testing;

// Re-export error types at crate root
pub use error::{GenStudioError, Result, ValidationError};

pub use catalog::{AspectRatio, Capability, Model, ModelDescriptor, Style};
pub use classify::{ClassifiedError, ErrorCategory};
pub use client::{
    EditResult, GeminiBackend, GeminiBackendBuilder, GenerationBackend, GenerationClient,
    GenerationClientBuilder, GenerationRequest, GenerationResult, LroProgress, LroState,
    ModelIds,
};
pub use media::{
    GeneratedImage, GeneratedVideo, GenerationMetadata, ImageFormat, InlineImage, Upload,
    VideoMetadata,
};
pub use studio::{
    ActionOutcome, HistoryEntry, PromptParts, Studio, StudioState, Surface, TranslationTarget,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::catalog::{AspectRatio, Model, Style};
    pub use crate::client::{GenerationBackend, GenerationClient, GenerationRequest};
    pub use crate::error::{GenStudioError, Result, ValidationError};
    pub use crate::media::{GeneratedImage, GeneratedVideo, Upload};
    pub use crate::studio::{ActionOutcome, Studio, Surface};
}
