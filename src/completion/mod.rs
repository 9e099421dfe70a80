//! Text-completion backends and the retrying completion client.
//!
//! This module defines the [`CompletionBackend`] trait implemented by every
//! generative text service. A backend performs exactly one remote call per
//! [`CompletionBackend::complete`]; retries, empty-reply detection and
//! response sanitization live in [`CompletionClient`].
//!
//! - [`GeminiBackend`]: Google Generative Language API (`generateContent`)
//! - [`MockBackend`]: scripted replies for tests and offline runs

mod client;
mod gemini;
pub mod mock;

pub use client::CompletionClient;
pub use gemini::{GeminiBackend, DEFAULT_MODEL, GEMINI_API_BASE};
pub use mock::MockBackend;

use async_trait::async_trait;
use std::time::Duration;

use crate::sanitize::SanitizeError;

/// Interface of a remote text-generation service
///
/// Implementations must be cheap to share: a single instance is built at
/// startup and used concurrently by every request.
#[async_trait]
pub trait CompletionBackend: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs (e.g. "gemini")
    fn id(&self) -> &str;

    /// Model name requests are sent to
    fn model(&self) -> &str;

    /// Send `prompt` and return the raw completion text
    ///
    /// The text may be empty or badly formatted; callers decide what that
    /// means.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Broad failure categories used to pick a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service could not be reached, refused, or timed out
    RemoteUnavailable,
    /// The service answered with blank text
    EmptyCompletion,
    /// The answer could not be parsed into the expected structure
    MalformedResponse,
}

/// Errors that can occur when calling a completion backend
///
/// Every variant fails a single attempt; none of them stops the retry loop.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response from the service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// The service envelope could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// An attempt exceeded its time budget
    #[error("Attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The completion text was empty or whitespace only
    #[error("Completion is empty")]
    EmptyCompletion,

    /// The completion text is not the expected structured data
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CompletionError::EmptyCompletion => FailureKind::EmptyCompletion,
            CompletionError::MalformedResponse(_) => FailureKind::MalformedResponse,
            _ => FailureKind::RemoteUnavailable,
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        CompletionError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for CompletionError {
    fn from(err: serde_json::Error) -> Self {
        CompletionError::Parse(format!("JSON: {}", err))
    }
}

impl From<SanitizeError> for CompletionError {
    fn from(err: SanitizeError) -> Self {
        match err {
            SanitizeError::Empty => CompletionError::EmptyCompletion,
            SanitizeError::Malformed { .. } => CompletionError::MalformedResponse(err.to_string()),
        }
    }
}
