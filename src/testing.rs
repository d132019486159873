//! In-memory backend with scripted answers and call counting.

use crate::client::backend::{
    ContentPart, GenerationBackend, ImageOptions, OperationHandle, OperationStatus,
};
use crate::error::{GenStudioError, Result};
use crate::media::{GeneratedImage, ImageFormat, InlineImage};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CallCounts {
    pub text_to_image: u32,
    pub edit: u32,
    pub submit_video: u32,
    pub poll_video: u32,
    pub fetch_binary: u32,
    pub translate: u32,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Recorded {
    pub image_prompts: Vec<String>,
    pub image_options: Vec<ImageOptions>,
    pub edit_inputs: Vec<(String, InlineImage)>,
    pub video_inputs: Vec<(String, Option<InlineImage>)>,
    pub fetched: Vec<String>,
    pub instructions: Vec<String>,
}

#[derive(Default)]
struct Script {
    images_per_call: Option<usize>,
    image_failure: Option<String>,
    image_panic: bool,
    edit_parts: Vec<ContentPart>,
    polls: VecDeque<OperationHandle>,
    poll_error: Option<String>,
    fetch_status: Option<u16>,
    translation: String,
}

pub(crate) struct ScriptedBackend {
    script: Mutex<Script>,
    calls: Mutex<CallCounts>,
    recorded: Mutex<Recorded>,
    poll_offsets: Mutex<Vec<Duration>>,
    created: Instant,
    image_gate: Option<Arc<Semaphore>>,
    video_gate: Option<Arc<Semaphore>>,
}

pub(crate) fn image(tag: u32) -> GeneratedImage {
    let mut data = vec![0xFF, 0xD8, 0xFF];
    data.extend_from_slice(&tag.to_be_bytes());
    GeneratedImage::new(data, ImageFormat::Jpeg, Default::default())
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                translation: "  Bonjour le monde \n".into(),
                ..Script::default()
            }),
            calls: Mutex::new(CallCounts::default()),
            recorded: Mutex::new(Recorded::default()),
            poll_offsets: Mutex::new(Vec::new()),
            created: Instant::now(),
            image_gate: None,
            video_gate: None,
        }
    }

    /// Return this many images per call instead of the requested count.
    pub fn with_images_per_call(self, n: usize) -> Self {
        self.script.lock().unwrap().images_per_call = Some(n);
        self
    }

    pub fn with_image_failure(self, message: &str) -> Self {
        self.script.lock().unwrap().image_failure = Some(message.into());
        self
    }

    pub fn with_image_panic(self) -> Self {
        self.script.lock().unwrap().image_panic = true;
        self
    }

    pub fn with_edit_parts(self, parts: Vec<ContentPart>) -> Self {
        self.script.lock().unwrap().edit_parts = parts;
        self
    }

    pub fn with_polls(self, polls: Vec<OperationHandle>) -> Self {
        self.script.lock().unwrap().polls = polls.into();
        self
    }

    pub fn with_poll_error(self, message: &str) -> Self {
        self.script.lock().unwrap().poll_error = Some(message.into());
        self
    }

    pub fn with_fetch_status(self, status: u16) -> Self {
        self.script.lock().unwrap().fetch_status = Some(status);
        self
    }

    /// Text-to-image calls wait for a permit on the returned semaphore.
    pub fn gated_images(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.image_gate = Some(gate.clone());
        (self, gate)
    }

    /// Video submissions wait for a permit on the returned semaphore.
    pub fn gated_video(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.video_gate = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> CallCounts {
        self.calls.lock().unwrap().clone()
    }

    pub fn recorded(&self) -> Recorded {
        self.recorded.lock().unwrap().clone()
    }

    /// Offsets from construction at which each poll happened.
    pub fn poll_offsets(&self) -> Vec<Duration> {
        self.poll_offsets.lock().unwrap().clone()
    }

    async fn pass(gate: &Option<Arc<Semaphore>>) {
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn text_to_image(
        &self,
        _model: &str,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<Vec<GeneratedImage>> {
        self.calls.lock().unwrap().text_to_image += 1;
        {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.image_prompts.push(prompt.to_string());
            recorded.image_options.push(options.clone());
        }
        Self::pass(&self.image_gate).await;

        let (n, failure, panic) = {
            let script = self.script.lock().unwrap();
            (
                script.images_per_call.unwrap_or(options.count as usize),
                script.image_failure.clone(),
                script.image_panic,
            )
        };
        if panic {
            panic!("scripted backend panic");
        }
        if let Some(message) = failure {
            return Err(GenStudioError::Api {
                status: 400,
                message,
            });
        }
        let count = self.calls.lock().unwrap().text_to_image;
        Ok((0..n).map(|i| image(count * 10 + i as u32)).collect())
    }

    async fn edit(
        &self,
        _model: &str,
        image: &InlineImage,
        prompt: &str,
    ) -> Result<Vec<ContentPart>> {
        self.calls.lock().unwrap().edit += 1;
        self.recorded
            .lock()
            .unwrap()
            .edit_inputs
            .push((prompt.to_string(), image.clone()));
        Ok(self.script.lock().unwrap().edit_parts.clone())
    }

    async fn submit_video(
        &self,
        _model: &str,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<OperationHandle> {
        self.calls.lock().unwrap().submit_video += 1;
        self.recorded
            .lock()
            .unwrap()
            .video_inputs
            .push((prompt.to_string(), image.cloned()));
        Self::pass(&self.video_gate).await;
        Ok(OperationHandle::pending("operations/vid-1"))
    }

    async fn poll_video(&self, handle: &OperationHandle) -> Result<OperationHandle> {
        self.calls.lock().unwrap().poll_video += 1;
        self.poll_offsets
            .lock()
            .unwrap()
            .push(self.created.elapsed());

        let mut script = self.script.lock().unwrap();
        if let Some(message) = script.poll_error.clone() {
            return Err(GenStudioError::Api {
                status: 500,
                message,
            });
        }
        Ok(script.polls.pop_front().unwrap_or_else(|| OperationHandle {
            name: handle.name.clone(),
            status: OperationStatus::Failed("poll script exhausted".into()),
        }))
    }

    async fn fetch_binary(&self, uri: &str) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().fetch_binary += 1;
        self.recorded.lock().unwrap().fetched.push(uri.to_string());
        match self.script.lock().unwrap().fetch_status {
            Some(status) => Err(GenStudioError::Api {
                status,
                message: "failed to download video: Not Found".into(),
            }),
            None => Ok(b"\x00\x00\x00\x1cftypmp42".to_vec()),
        }
    }

    async fn translate(&self, _model: &str, instruction: &str) -> Result<String> {
        self.calls.lock().unwrap().translate += 1;
        self.recorded
            .lock()
            .unwrap()
            .instructions
            .push(instruction.to_string());
        Ok(self.script.lock().unwrap().translation.clone())
    }
}
