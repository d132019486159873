//! Drives a submitted video operation to a result locator.

use crate::client::backend::{GenerationBackend, OperationHandle, OperationStatus};
use crate::error::{GenStudioError, Result};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

/// Fixed wait between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Where a long-running operation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LroState {
    /// Accepted by the service, not polled yet.
    Submitted,
    /// Polled at least once and still running.
    Polling,
    /// Finished with a result locator.
    Done,
    /// Finished without a usable result, or a poll failed.
    Failed,
}

/// A progress snapshot, reported at every state change and poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LroProgress {
    /// Service operation name.
    pub operation: String,
    /// Current state.
    pub state: LroState,
    /// Status polls performed so far.
    pub polls: u32,
    /// Time since submission.
    pub elapsed: Duration,
}

/// Progress observer.
pub type ProgressFn<'a> = &'a (dyn Fn(&LroProgress) + Send + Sync);

/// The resolved locator and how many polls it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub uri: String,
    pub polls: u32,
}

pub(crate) struct Poller<'a> {
    backend: &'a dyn GenerationBackend,
    interval: Duration,
    max_wait: Option<Duration>,
}

impl<'a> Poller<'a> {
    pub(crate) fn new(
        backend: &'a dyn GenerationBackend,
        interval: Duration,
        max_wait: Option<Duration>,
    ) -> Self {
        Self {
            backend,
            interval,
            max_wait,
        }
    }

    /// Polls `handle` until it finishes and returns its result locator.
    ///
    /// The wait between polls is fixed. Without `max_wait` the loop runs until
    /// the service reports completion or a poll fails.
    pub(crate) async fn resolve(
        &self,
        handle: OperationHandle,
        on_progress: ProgressFn<'_>,
    ) -> Result<Resolved> {
        let start = Instant::now();
        let operation = handle.name.clone();
        let mut polls = 0;

        let result = self.drive(handle, start, &mut polls, on_progress).await;

        on_progress(&LroProgress {
            operation,
            state: if result.is_ok() {
                LroState::Done
            } else {
                LroState::Failed
            },
            polls,
            elapsed: start.elapsed(),
        });

        result.map(|uri| Resolved { uri, polls })
    }

    async fn drive(
        &self,
        mut handle: OperationHandle,
        start: Instant,
        polls: &mut u32,
        on_progress: ProgressFn<'_>,
    ) -> Result<String> {
        on_progress(&LroProgress {
            operation: handle.name.clone(),
            state: LroState::Submitted,
            polls: 0,
            elapsed: start.elapsed(),
        });

        loop {
            match &handle.status {
                OperationStatus::Pending => {}
                OperationStatus::Succeeded { uri: Some(uri) } => return Ok(uri.clone()),
                OperationStatus::Succeeded { uri: None } => {
                    return Err(GenStudioError::UnexpectedResponse(
                        "video generation finished but no result was produced".into(),
                    ))
                }
                OperationStatus::Failed(message) => {
                    return Err(GenStudioError::VideoGeneration(message.clone()))
                }
                OperationStatus::Filtered(message) => {
                    return Err(GenStudioError::ContentBlocked(message.clone()))
                }
            }

            if let Some(max_wait) = self.max_wait {
                if start.elapsed() + self.interval > max_wait {
                    return Err(GenStudioError::Timeout(max_wait));
                }
            }

            tokio::time::sleep(self.interval).await;
            handle = self.backend.poll_video(&handle).await?;
            *polls += 1;

            tracing::debug!(
                operation = %handle.name,
                polls = *polls,
                elapsed_secs = start.elapsed().as_secs(),
                done = handle.is_done(),
                "polled video operation"
            );

            if !handle.is_done() {
                on_progress(&LroProgress {
                    operation: handle.name.clone(),
                    state: LroState::Polling,
                    polls: *polls,
                    elapsed: start.elapsed(),
                });
            }
        }
    }
}
