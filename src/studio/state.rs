//! Plain data held by the studio controller.

use crate::catalog::{AspectRatio, Model, Style};
use crate::client::{EditResult, LroProgress};
use crate::media::{GeneratedImage, GeneratedVideo, Upload};
use crate::studio::history::History;

/// Top-level surfaces. Only the first two carry actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Surface {
    /// Text-to-image and image editing.
    #[default]
    ImageStudio,
    /// Text/image to video.
    VideoStudio,
    /// Placeholder surface.
    PhotoRestoration,
    /// Placeholder surface.
    PhotoStitching,
}

impl Surface {
    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ImageStudio => "Image Studio",
            Self::VideoStudio => "Video Studio",
            Self::PhotoRestoration => "Photo Restoration",
            Self::PhotoStitching => "Photo Stitching",
        }
    }
}

/// Image studio form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageForm {
    /// Prompt as typed.
    pub prompt: String,
    /// Negative prompt as typed.
    pub negative_prompt: String,
    /// Selected model.
    pub model: Model,
    /// Selected aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Selected style.
    pub style: Style,
    /// Number of images to request.
    pub count: u8,
    /// Image to edit, for editing models.
    pub upload: Option<Upload>,
}

impl Default for ImageForm {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            negative_prompt: String::new(),
            model: Model::default(),
            aspect_ratio: AspectRatio::default(),
            style: Style::default(),
            count: 1,
            upload: None,
        }
    }
}

impl ImageForm {
    /// The prompt actually sent for plain generation: style prefix first, then
    /// the trimmed prompt, then the negative prompt if there is one.
    pub fn engineered_prompt(&self) -> String {
        let mut prompt = self.prompt.trim().to_string();
        if let Some(prefix) = self.style.prompt_prefix() {
            prompt = format!("{prefix}{prompt}");
        }
        match self.negative_prompt.trim() {
            "" => prompt,
            negative => format!("{prompt}. Negative prompt: {negative}"),
        }
    }
}

/// Image studio state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSurface {
    /// Form values.
    pub form: ImageForm,
    /// A request is in flight.
    pub pending: bool,
    /// Images from the last generation, or the edited image.
    pub images: Vec<GeneratedImage>,
    /// Text returned alongside the last edit.
    pub edit_text: Option<String>,
    /// User-facing error from the last action.
    pub error: Option<String>,
    pub(crate) generation: u64,
}

impl ImageSurface {
    pub(crate) fn apply_edit(&mut self, result: EditResult) {
        self.images = result.image.into_iter().collect();
        self.edit_text = result.text;
    }

    fn reset(&mut self) {
        self.form.prompt.clear();
        self.form.negative_prompt.clear();
        self.form.upload = None;
        self.pending = false;
        self.images.clear();
        self.edit_text = None;
        self.error = None;
        self.generation += 1;
    }
}

/// Video studio state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSurface {
    /// Prompt as typed.
    pub prompt: String,
    /// Optional reference image.
    pub upload: Option<Upload>,
    /// A request is in flight.
    pub pending: bool,
    /// Last generated video.
    pub video: Option<GeneratedVideo>,
    /// Latest progress report of the in-flight operation.
    pub progress: Option<LroProgress>,
    /// User-facing error from the last action.
    pub error: Option<String>,
    pub(crate) generation: u64,
}

impl VideoSurface {
    fn reset(&mut self) {
        self.prompt.clear();
        self.upload = None;
        self.pending = false;
        self.video = None;
        self.progress = None;
        self.error = None;
        self.generation += 1;
    }
}

/// The translator side panel. Runs independently of either surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatorState {
    /// A translation is in flight.
    pub pending: bool,
    /// Last translation.
    pub result: Option<String>,
    /// User-facing error from the last translation.
    pub error: Option<String>,
    pub(crate) generation: u64,
}

/// Prompt creator fields, joined in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptParts {
    /// What the image shows (e.g., "a majestic lion").
    pub subject: String,
    /// Free-form style (e.g., "oil painting").
    pub style: String,
    /// Where it happens (e.g., "in the Serengeti").
    pub setting: String,
    /// Framing (e.g., "close-up shot").
    pub composition: String,
    /// Light (e.g., "golden hour").
    pub lighting: String,
}

impl PromptParts {
    /// Joins the non-blank parts with `", "`. Empty when every part is blank.
    pub fn compose(&self) -> String {
        [
            &self.subject,
            &self.style,
            &self.setting,
            &self.composition,
            &self.lighting,
        ]
        .into_iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// A modal message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Heading.
    pub title: String,
    /// Body text.
    pub message: String,
}

/// Everything the studio shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudioState {
    /// Active surface.
    pub surface: Surface,
    /// Image studio.
    pub image: ImageSurface,
    /// Video studio.
    pub video: VideoSurface,
    /// Translator panel.
    pub translator: TranslatorState,
    /// Generation history.
    pub history: History,
    /// Pending modal notice.
    pub notice: Option<Notice>,
}

impl StudioState {
    /// Resets both action surfaces and invalidates their in-flight tickets.
    pub(crate) fn switch_to(&mut self, surface: Surface) {
        self.surface = surface;
        self.image.reset();
        self.video.reset();
    }
}
