//! Static model, aspect-ratio and style catalogs.

use serde::{Deserialize, Serialize};

/// What a model can be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Text-to-image generation.
    TextToImage,
    /// Prompted editing of an uploaded image.
    ImageEdit,
    /// Text or image to video.
    TextToVideo,
    /// Listed for reference only; not wired to any service.
    Unavailable,
}

/// Every model the studio knows about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Model {
    /// Imagen 4.0.
    #[default]
    Imagen4,
    /// Gemini 2.5 Flash Image ("Nano Banana").
    NanoBanana,
    /// DALL-E 3.
    Dalle3,
    /// Midjourney v6.
    MidjourneyV6,
    /// Stable Diffusion 3.
    StableDiffusion3,
    /// FLUX.1.1.
    Flux11,
    /// Veo 2.0.
    Veo2,
    /// Project Astra.
    ProjectAstra,
}

/// Read-only description of a catalog model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    /// Service model identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Whether the model is wired to a service.
    pub functional: bool,
    /// Whether the model edits an uploaded image.
    pub editing: bool,
    /// One-line description.
    pub description: &'static str,
}

impl Model {
    /// All models in catalog order.
    pub const ALL: [Model; 8] = [
        Self::Imagen4,
        Self::NanoBanana,
        Self::Dalle3,
        Self::MidjourneyV6,
        Self::StableDiffusion3,
        Self::Flux11,
        Self::Veo2,
        Self::ProjectAstra,
    ];

    /// Returns the service model identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Imagen4 => "imagen-4.0-generate-001",
            Self::NanoBanana => "gemini-2.5-flash-image-preview",
            Self::Dalle3 => "dall-e-3",
            Self::MidjourneyV6 => "midjourney-v6",
            Self::StableDiffusion3 => "stable-diffusion-3",
            Self::Flux11 => "flux-1",
            Self::Veo2 => "veo-2.0-generate-001",
            Self::ProjectAstra => "project-astra",
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Imagen4 => "Imagen 4.0",
            Self::NanoBanana => "Nano Banana",
            Self::Dalle3 => "DALL-E 3",
            Self::MidjourneyV6 => "Midjourney v6",
            Self::StableDiffusion3 => "Stable Diffusion 3",
            Self::Flux11 => "FLUX.1.1",
            Self::Veo2 => "Veo 2.0",
            Self::ProjectAstra => "Project Astra",
        }
    }

    /// Returns what this model can be dispatched for.
    pub fn capability(&self) -> Capability {
        match self {
            Self::Imagen4 => Capability::TextToImage,
            Self::NanoBanana => Capability::ImageEdit,
            Self::Veo2 => Capability::TextToVideo,
            Self::Dalle3
            | Self::MidjourneyV6
            | Self::StableDiffusion3
            | Self::Flux11
            | Self::ProjectAstra => Capability::Unavailable,
        }
    }

    /// Whether the model is wired to a service.
    pub fn is_functional(&self) -> bool {
        self.capability() != Capability::Unavailable
    }

    /// Whether the model edits an uploaded image.
    pub fn is_editing(&self) -> bool {
        self.capability() == Capability::ImageEdit
    }

    /// Looks a model up by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Returns the catalog entry for this model.
    pub fn descriptor(&self) -> ModelDescriptor {
        let description = match self {
            Self::Imagen4 => "Google's most advanced text-to-image model.",
            Self::NanoBanana => "Edit images with text prompts. Requires an image upload.",
            Self::Dalle3 => "A powerful image generator by OpenAI. (Not available)",
            Self::MidjourneyV6 => "Known for artistic and stylized image generation. (Not available)",
            Self::StableDiffusion3 => "The latest from Stability AI. (Not available)",
            Self::Flux11 => "A fast and efficient image generation model. (Not available)",
            Self::Veo2 => "Google's state-of-the-art text-to-video model.",
            Self::ProjectAstra => "Google's universal AI agent project. (Not available)",
        };
        ModelDescriptor {
            id: self.id(),
            name: self.name(),
            functional: self.is_functional(),
            editing: self.is_editing(),
            description,
        }
    }

    /// Service identifier used for the Gemini text model (translation).
    pub const TEXT_MODEL_ID: &'static str = "gemini-2.5-flash";
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Aspect ratios offered for image generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1 square aspect ratio.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 16:9 landscape (widescreen) aspect ratio.
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait (tall) aspect ratio.
    #[serde(rename = "9:16")]
    Portrait,
    /// 4:3 standard landscape aspect ratio.
    #[serde(rename = "4:3")]
    Standard,
    /// 3:4 classic portrait aspect ratio.
    #[serde(rename = "3:4")]
    Classic,
}

impl AspectRatio {
    /// All ratios in display order.
    pub const ALL: [AspectRatio; 5] = [
        Self::Square,
        Self::Landscape,
        Self::Portrait,
        Self::Standard,
        Self::Classic,
    ];

    /// Returns the aspect ratio as a string (e.g., "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Standard => "4:3",
            Self::Classic => "3:4",
        }
    }

    /// Returns the human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Square => "Square (1:1)",
            Self::Landscape => "Landscape (16:9)",
            Self::Portrait => "Portrait (9:16)",
            Self::Standard => "Standard (4:3)",
            Self::Classic => "Classic (3:4)",
        }
    }

    /// Parses "16:9"-style strings.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Style presets folded into the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    /// No style prefix.
    #[default]
    None,
    /// Photographic realism.
    Photorealistic,
    /// Film still look.
    Cinematic,
    /// Japanese animation.
    Anime,
    /// Fantasy illustration.
    Fantasy,
    /// Digital painting.
    DigitalArt,
    /// Low-poly 3D render.
    LowPoly,
}

impl Style {
    /// All styles in display order.
    pub const ALL: [Style; 7] = [
        Self::None,
        Self::Photorealistic,
        Self::Cinematic,
        Self::Anime,
        Self::Fantasy,
        Self::DigitalArt,
        Self::LowPoly,
    ];

    /// Returns the stored value (e.g., "digital-art").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Photorealistic => "photorealistic",
            Self::Cinematic => "cinematic",
            Self::Anime => "anime",
            Self::Fantasy => "fantasy",
            Self::DigitalArt => "digital-art",
            Self::LowPoly => "low-poly",
        }
    }

    /// Parses a stored value.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Returns the prompt prefix for this style, if any.
    pub fn prompt_prefix(&self) -> Option<String> {
        match self {
            Self::None => None,
            other => Some(format!("{} style, ", other.as_str().replace('-', " "))),
        }
    }
}
