//! Application state controller.
//!
//! [`Studio`] owns the form values, pending flags, results and history of the
//! image and video surfaces and sequences calls into [`GenerationClient`].
//! Each surface allows one request in flight. Every action takes a ticket
//! from its surface when it starts; if the surface has moved on by the time
//! the call returns (the user switched surfaces), the result is dropped.
//!
//! State sits behind a mutex that is only held for short synchronous
//! sections, never across a remote call.

mod history;
mod state;

pub use history::{History, HistoryEntry, HISTORY_CAPACITY};
pub use state::{
    ImageForm, ImageSurface, Notice, PromptParts, StudioState, Surface, TranslatorState,
    VideoSurface,
};

use crate::catalog::{AspectRatio, Capability, Model, Style};
use crate::classify::{classify, classify_opaque, ClassifiedError};
use crate::client::{EditResult, GenerationClient, LroProgress, MAX_IMAGE_COUNT};
use crate::error::{GenStudioError, ValidationError};
use crate::media::{GeneratedImage, GeneratedVideo, Upload};
use futures::FutureExt;
use history::EntryDraft;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const UNAVAILABLE_MODEL_MESSAGE: &str = "This application is built to showcase Google's \
    powerful AI models and is not integrated with other services. Please select one of the \
    available, functional models to continue creating.";

/// How a submitted action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The result was stored.
    Completed,
    /// The call failed; the classified message was stored.
    Failed(ClassifiedError),
    /// The surface moved on while the call was in flight; nothing was stored.
    Superseded,
}

/// Where a finished translation should be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationTarget {
    /// The image prompt.
    Prompt,
    /// The negative prompt.
    NegativePrompt,
}

enum ImageJob {
    Generate {
        prompt: String,
        aspect_ratio: AspectRatio,
        count: u8,
        draft: EntryDraft,
    },
    Edit {
        prompt: String,
        upload: Upload,
    },
}

enum ImageOutput {
    Generated(Vec<GeneratedImage>, EntryDraft),
    Edited(EditResult),
}

/// Image and video studio controller. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Studio {
    client: Arc<GenerationClient>,
    state: Arc<Mutex<StudioState>>,
}

impl Studio {
    /// Creates a studio over `client` with default form values.
    pub fn new(client: GenerationClient) -> Self {
        Self {
            client: Arc::new(client),
            state: Arc::new(Mutex::new(StudioState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StudioState> {
        lock_state(&self.state)
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> StudioState {
        self.lock().clone()
    }

    /// Sets the image prompt.
    pub fn set_prompt(&self, prompt: impl Into<String>) {
        self.lock().image.form.prompt = prompt.into();
    }

    /// Sets the negative prompt.
    pub fn set_negative_prompt(&self, negative: impl Into<String>) {
        self.lock().image.form.negative_prompt = negative.into();
    }

    /// Sets the aspect ratio.
    pub fn set_aspect_ratio(&self, aspect_ratio: AspectRatio) {
        self.lock().image.form.aspect_ratio = aspect_ratio;
    }

    /// Sets the style.
    pub fn set_style(&self, style: Style) {
        self.lock().image.form.style = style;
    }

    /// Sets the image count. Checked on submit.
    pub fn set_count(&self, count: u8) {
        self.lock().image.form.count = count;
    }

    /// Sets or clears the image to edit.
    pub fn set_upload(&self, upload: Option<Upload>) {
        self.lock().image.form.upload = upload;
    }

    /// Sets the video prompt.
    pub fn set_video_prompt(&self, prompt: impl Into<String>) {
        self.lock().video.prompt = prompt.into();
    }

    /// Sets or clears the video reference image.
    pub fn set_video_upload(&self, upload: Option<Upload>) {
        self.lock().video.upload = upload;
    }

    /// Selects the image studio model.
    ///
    /// Unavailable models are refused with a notice. Selecting a model that
    /// does not edit drops any upload.
    pub fn select_model(&self, model: Model) -> Result<(), ValidationError> {
        let mut state = self.lock();
        if !model.is_functional() {
            state.notice = Some(Notice {
                title: format!("{} is Not Available", model.name()),
                message: UNAVAILABLE_MODEL_MESSAGE.to_string(),
            });
            return Err(ValidationError::ModelUnavailable(model.name().to_string()));
        }
        state.image.form.model = model;
        if !model.is_editing() {
            state.image.form.upload = None;
        }
        Ok(())
    }

    /// Clears the pending notice.
    pub fn dismiss_notice(&self) {
        self.lock().notice = None;
    }

    /// Switches the active surface.
    ///
    /// Results, errors, prompts, uploads and pending flags are reset. Calls
    /// already in flight keep running but their results are discarded.
    pub fn switch_surface(&self, surface: Surface) {
        let mut state = self.lock();
        tracing::debug!(from = state.surface.name(), to = surface.name(), "switching surface");
        state.switch_to(surface);
    }

    /// Restores the form from a history entry.
    ///
    /// The model is restored only if it is still functional and not an
    /// editing model.
    pub fn reuse_history(&self, id: u64) -> Result<(), ValidationError> {
        let mut state = self.lock();
        let entry = state
            .history
            .get(id)
            .cloned()
            .ok_or(ValidationError::UnknownHistoryEntry(id))?;

        let form = &mut state.image.form;
        form.prompt = entry.prompt;
        form.negative_prompt = entry.negative_prompt;
        if let Some(model) = Model::from_name(&entry.model_name) {
            if model.is_functional() && !model.is_editing() {
                form.model = model;
            }
        }
        form.aspect_ratio = entry.aspect_ratio;
        form.style = entry.style;
        form.count = entry.count;
        Ok(())
    }

    /// Runs the image studio action for the selected model.
    ///
    /// Validation failures are stored as the surface error and returned; they
    /// never reach the client. Remote failures are classified and stored.
    pub async fn generate(&self) -> Result<ActionOutcome, ValidationError> {
        let (ticket, job) = {
            let mut state = self.lock();
            let surface = &mut state.image;
            if surface.pending {
                return Err(ValidationError::Busy);
            }
            let job = match image_job(&surface.form) {
                Ok(job) => job,
                Err(e) => {
                    surface.error = Some(e.to_string());
                    return Err(e);
                }
            };
            surface.pending = true;
            surface.images.clear();
            surface.edit_text = None;
            surface.error = None;
            surface.generation += 1;
            (surface.generation, job)
        };

        let result = AssertUnwindSafe(self.run_image_job(job))
            .catch_unwind()
            .await;

        let mut state = self.lock();
        let state = &mut *state;
        if state.image.generation != ticket {
            tracing::debug!(ticket, "discarding superseded image result");
            return Ok(ActionOutcome::Superseded);
        }
        state.image.pending = false;

        let outcome = match flatten(result, "image generation") {
            Ok(ImageOutput::Generated(images, draft)) => {
                if let Some(first) = images.first() {
                    let id = state.history.record(draft, first.clone());
                    tracing::debug!(id, images = images.len(), "recorded history entry");
                }
                state.image.images = images;
                ActionOutcome::Completed
            }
            Ok(ImageOutput::Edited(result)) => {
                state.image.apply_edit(result);
                ActionOutcome::Completed
            }
            Err(classified) => {
                state.image.error = Some(classified.message.clone());
                ActionOutcome::Failed(classified)
            }
        };
        Ok(outcome)
    }

    async fn run_image_job(&self, job: ImageJob) -> Result<ImageOutput, GenStudioError> {
        match job {
            ImageJob::Generate {
                prompt,
                aspect_ratio,
                count,
                draft,
            } => {
                let images = self
                    .client
                    .generate_images(&prompt, aspect_ratio, count)
                    .await?;
                Ok(ImageOutput::Generated(images, draft))
            }
            ImageJob::Edit { prompt, upload } => {
                let image = upload.encode().await?;
                let result = self.client.edit_image(&prompt, &image).await?;
                Ok(ImageOutput::Edited(result))
            }
        }
    }

    /// Runs the video studio action.
    pub async fn generate_video(&self) -> Result<ActionOutcome, ValidationError> {
        let (ticket, prompt, upload) = {
            let mut state = self.lock();
            let surface = &mut state.video;
            if surface.pending {
                return Err(ValidationError::Busy);
            }
            if surface.prompt.trim().is_empty() {
                surface.error = Some(ValidationError::EmptyPrompt.to_string());
                return Err(ValidationError::EmptyPrompt);
            }
            surface.pending = true;
            surface.video = None;
            surface.progress = None;
            surface.error = None;
            surface.generation += 1;
            (surface.generation, surface.prompt.clone(), surface.upload.clone())
        };

        let result = AssertUnwindSafe(self.run_video_job(ticket, prompt, upload))
            .catch_unwind()
            .await;

        let mut state = self.lock();
        if state.video.generation != ticket {
            tracing::debug!(ticket, "discarding superseded video result");
            return Ok(ActionOutcome::Superseded);
        }
        state.video.pending = false;

        let outcome = match flatten(result, "video generation") {
            Ok(video) => {
                state.video.video = Some(video);
                ActionOutcome::Completed
            }
            Err(classified) => {
                state.video.error = Some(classified.message.clone());
                ActionOutcome::Failed(classified)
            }
        };
        Ok(outcome)
    }

    async fn run_video_job(
        &self,
        ticket: u64,
        prompt: String,
        upload: Option<Upload>,
    ) -> Result<GeneratedVideo, GenStudioError> {
        let image = match upload {
            Some(upload) => Some(upload.encode().await?),
            None => None,
        };

        let state = Arc::clone(&self.state);
        let on_progress = move |progress: &LroProgress| {
            let mut state = lock_state(&state);
            if state.video.generation == ticket {
                state.video.progress = Some(progress.clone());
            }
        };

        self.client
            .generate_video_with_progress(&prompt, image.as_ref(), &on_progress)
            .await
    }

    /// Translates `text` in the translator panel.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<ActionOutcome, ValidationError> {
        let ticket = {
            let mut state = self.lock();
            let translator = &mut state.translator;
            if translator.pending {
                return Err(ValidationError::Busy);
            }
            translator.pending = true;
            translator.result = None;
            translator.error = None;
            translator.generation += 1;
            translator.generation
        };

        let result = AssertUnwindSafe(self.client.translate_text(text, source_lang, target_lang))
            .catch_unwind()
            .await;

        let mut state = self.lock();
        if state.translator.generation != ticket {
            return Ok(ActionOutcome::Superseded);
        }
        state.translator.pending = false;

        let outcome = match flatten(result, "translation") {
            Ok(translated) => {
                state.translator.result = Some(translated);
                ActionOutcome::Completed
            }
            Err(classified) => {
                state.translator.error = Some(classified.message.clone());
                ActionOutcome::Failed(classified)
            }
        };
        Ok(outcome)
    }

    /// Copies the last translation into the prompt or negative prompt.
    /// Returns false when there is nothing to copy.
    pub fn use_translation(&self, target: TranslationTarget) -> bool {
        let mut state = self.lock();
        let Some(translated) = state.translator.result.clone().filter(|t| !t.is_empty()) else {
            return false;
        };
        match target {
            TranslationTarget::Prompt => state.image.form.prompt = translated,
            TranslationTarget::NegativePrompt => state.image.form.negative_prompt = translated,
        }
        true
    }

    /// Copies the composed prompt into the image prompt.
    /// Returns false when every part is blank.
    pub fn use_prompt_parts(&self, parts: &PromptParts) -> bool {
        let composed = parts.compose();
        if composed.is_empty() {
            return false;
        }
        self.lock().image.form.prompt = composed;
        true
    }
}

fn lock_state(state: &Mutex<StudioState>) -> MutexGuard<'_, StudioState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Checks the image form and picks the call for the selected model.
fn image_job(form: &ImageForm) -> Result<ImageJob, ValidationError> {
    if form.prompt.trim().is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }

    match form.model.capability() {
        Capability::TextToImage => {
            if !(1..=MAX_IMAGE_COUNT).contains(&form.count) {
                return Err(ValidationError::InvalidCount(form.count));
            }
            Ok(ImageJob::Generate {
                prompt: form.engineered_prompt(),
                aspect_ratio: form.aspect_ratio,
                count: form.count,
                draft: EntryDraft {
                    prompt: form.prompt.clone(),
                    negative_prompt: form.negative_prompt.clone(),
                    model_name: form.model.name().to_string(),
                    aspect_ratio: form.aspect_ratio,
                    style: form.style,
                    count: form.count,
                },
            })
        }
        Capability::ImageEdit => {
            let upload = form.upload.clone().ok_or(ValidationError::MissingUpload)?;
            Ok(ImageJob::Edit {
                prompt: form.prompt.clone(),
                upload,
            })
        }
        Capability::TextToVideo => Err(ValidationError::UnsupportedModel(
            form.model.name().to_string(),
        )),
        Capability::Unavailable => Err(ValidationError::ModelUnavailable(
            form.model.name().to_string(),
        )),
    }
}

/// Collapses a caught action result into a value or a classified failure,
/// logging the raw error.
fn flatten<T>(
    result: std::thread::Result<Result<T, GenStudioError>>,
    action: &'static str,
) -> Result<T, ClassifiedError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            let classified = classify(&e);
            tracing::warn!(action, category = ?classified.category, "{action} failed: {e}");
            Err(classified)
        }
        Err(_) => {
            tracing::error!(action, "{action} panicked");
            Err(classify_opaque())
        }
    }
}
