//! Requests and normalized results for the generation client.

use crate::catalog::AspectRatio;
use crate::client::backend::ContentPart;
use crate::media::{GeneratedImage, GeneratedVideo, InlineImage};

/// One generation request. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    /// Generate `count` images from a prompt.
    TextToImage {
        /// The text prompt.
        prompt: String,
        /// Output aspect ratio.
        aspect_ratio: AspectRatio,
        /// Number of images, 1 to 4.
        count: u8,
    },
    /// Edit an image with a prompt.
    ImageEdit {
        /// Edit instruction.
        prompt: String,
        /// Image to edit.
        image: InlineImage,
    },
    /// Generate a video, optionally from a reference image.
    TextToVideo {
        /// The text prompt.
        prompt: String,
        /// Optional reference image.
        image: Option<InlineImage>,
    },
    /// Translate text between two named languages.
    Translate {
        /// Text to translate.
        text: String,
        /// Source language name (e.g., "English").
        source_lang: String,
        /// Target language name.
        target_lang: String,
    },
}

impl GenerationRequest {
    /// Creates a text-to-image request.
    pub fn text_to_image(prompt: impl Into<String>, aspect_ratio: AspectRatio, count: u8) -> Self {
        Self::TextToImage {
            prompt: prompt.into(),
            aspect_ratio,
            count,
        }
    }

    /// Creates an image edit request.
    pub fn image_edit(prompt: impl Into<String>, image: InlineImage) -> Self {
        Self::ImageEdit {
            prompt: prompt.into(),
            image,
        }
    }

    /// Creates a video request.
    pub fn text_to_video(prompt: impl Into<String>, image: Option<InlineImage>) -> Self {
        Self::TextToVideo {
            prompt: prompt.into(),
            image,
        }
    }

    /// Creates a translation request.
    pub fn translate(
        text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self::Translate {
            text: text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }
}

/// Text and image returned by an edit. Either or both may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditResult {
    /// Explanatory text from the model.
    pub text: Option<String>,
    /// The edited image.
    pub image: Option<GeneratedImage>,
}

impl EditResult {
    /// Scans response parts once; the last part of each kind wins.
    pub fn from_parts(parts: Vec<ContentPart>) -> Self {
        parts.into_iter().fold(Self::default(), |mut acc, part| {
            match part {
                ContentPart::Text(text) => acc.text = Some(text),
                ContentPart::Image(image) => acc.image = Some(image),
            }
            acc
        })
    }

    /// True when the model returned neither text nor an image.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none()
    }
}

/// Normalized result of a [`GenerationRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// Images in service order; may hold fewer than requested.
    ImageSet(Vec<GeneratedImage>),
    /// Edit output.
    Edit(EditResult),
    /// Downloaded video.
    Video(GeneratedVideo),
    /// Translated text.
    Translation(String),
}
