//! Error types for remote generation calls.

use std::time::Duration;

/// Errors raised by the generation client and its backends.
///
/// Display strings are what the classifier in [`crate::classify`] matches on,
/// so each variant keeps the service's own wording in its message.
#[derive(Debug, thiserror::Error)]
pub enum GenStudioError {
    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited (HTTP 429), retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// A bounded video wait ran out.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Billing is not enabled for the project behind the key.
    #[error("billing error: {0}")]
    Billing(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading an upload).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The video operation finished with an error.
    #[error("video generation failed: {0}")]
    VideoGeneration(String),

    /// The service answered with a shape we cannot use.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl GenStudioError {
    /// Returns true if this error is likely transient and worth retrying.
    ///
    /// Nothing in this crate retries on its own; callers decide.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_)
        )
    }

    /// Returns the suggested retry delay, if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            Self::Network(_) => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}

/// Local input problems caught before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The prompt is blank.
    #[error("Please enter a prompt.")]
    EmptyPrompt,

    /// An editing model is selected but nothing is uploaded.
    #[error("Please upload an image to edit.")]
    MissingUpload,

    /// Image count outside 1 to 4.
    #[error("Number of images must be between 1 and 4, got {0}.")]
    InvalidCount(u8),

    /// The model is listed but not wired to any service.
    #[error("{0} is not available.")]
    ModelUnavailable(String),

    /// The model exists but does not fit this surface.
    #[error("{0} cannot be used here.")]
    UnsupportedModel(String),

    /// A request on this surface is still pending.
    #[error("A request is already in progress.")]
    Busy,

    /// No history entry has this id.
    #[error("No history entry with id {0}.")]
    UnknownHistoryEntry(u64),
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenStudioError>;

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Cleans a raw error body for inclusion in an error message.
///
/// Pulls `error.message` out of Google-style JSON bodies, masks `key=` query
/// parameters and caps the length.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let extracted = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| text.trim().to_string());

    let mut masked = String::with_capacity(extracted.len());
    let mut rest = extracted.as_str();
    while let Some(idx) = rest.find("key=") {
        let (head, tail) = rest.split_at(idx + 4);
        masked.push_str(head);
        masked.push_str("***");
        let end = tail
            .find(|c: char| c == '&' || c.is_whitespace() || c == '"')
            .unwrap_or(tail.len());
        rest = &tail[end..];
    }
    masked.push_str(rest);

    if masked.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = masked.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{truncated}...")
    } else {
        masked
    }
}

/// Reads a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
