//! Maps raw generation failures to user-facing categories.

use crate::error::GenStudioError;
use serde::{Deserialize, Serialize};

/// User-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The API key was rejected.
    InvalidCredential,
    /// The prompt or image tripped a safety policy.
    SafetyBlocked,
    /// Quota or rate limit exhausted.
    RateLimited,
    /// The requested model is not served.
    ModelUnavailable,
    /// Anything else; the original message is shown as-is.
    Unclassified,
}

impl ErrorCategory {
    /// The fixed message shown for this category, if it has one.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCredential => {
                Some("Invalid API Key. Please ensure your API key is configured correctly.")
            }
            Self::SafetyBlocked => Some(
                "The request was blocked due to safety policies. Please modify your prompt or image.",
            ),
            Self::RateLimited => Some(
                "The service is currently busy (Rate limit exceeded). Please try again in a few moments.",
            ),
            Self::ModelUnavailable => Some(
                "The specified image generation model is not available. Please contact support.",
            ),
            Self::Unclassified => None,
        }
    }
}

/// A failure reduced to what the user should see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedError {
    /// Which category matched.
    pub category: ErrorCategory,
    /// Display text.
    pub message: String,
}

impl std::fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Message used when the failure carries no usable text.
pub const OPAQUE_FAILURE_MESSAGE: &str =
    "An unknown error occurred. Please check the logs for more details.";

/// Ordered pattern table, first match wins. Patterns are lowercase.
fn patterns() -> [(&'static [&'static str], ErrorCategory); 4] {
    [
        (
            &["api_key_invalid", "api key not valid"],
            ErrorCategory::InvalidCredential,
        ),
        (&["safety", "blocked"], ErrorCategory::SafetyBlocked),
        (
            &["429", "resource has been exhausted"],
            ErrorCategory::RateLimited,
        ),
        (
            &[MODEL_NOT_FOUND_PATTERN, "is not found for api version"],
            ErrorCategory::ModelUnavailable,
        ),
    ]
}

const MODEL_NOT_FOUND_PATTERN: &str = "model 'imagen-4.0-generate-001' is not found";

/// Classifies a raw message by case-insensitive substring match.
pub fn classify_message(message: &str) -> ClassifiedError {
    let lower = message.to_lowercase();
    for (needles, category) in patterns() {
        if needles.iter().any(|n| lower.contains(n)) {
            return ClassifiedError {
                category,
                message: category.user_message().unwrap_or(message).to_string(),
            };
        }
    }
    ClassifiedError {
        category: ErrorCategory::Unclassified,
        message: message.to_string(),
    }
}

/// Classifies a generation error by its display text.
pub fn classify(error: &GenStudioError) -> ClassifiedError {
    classify_message(&error.to_string())
}

/// Coerces a failure that is not an error value (such as a panic payload).
pub fn classify_opaque() -> ClassifiedError {
    ClassifiedError {
        category: ErrorCategory::Unclassified,
        message: OPAQUE_FAILURE_MESSAGE.to_string(),
    }
}
