//! Retrying completion client.

use std::sync::Arc;

use crate::completion::{CompletionBackend, CompletionError};
use crate::error::SearchError;
use crate::models::{SearchKind, SearchResult};
use crate::sanitize;
use crate::utils::{with_retry, RetryConfig, RetryResult};

/// Wraps a [`CompletionBackend`] with the retry policy
///
/// An attempt fails when the backend call errors or times out, when the
/// reply is blank, or (for structured calls) when the sanitized reply does
/// not parse. Individual failures are logged, never returned: callers see
/// either a value or a terminal [`SearchError`].
#[derive(Debug, Clone)]
pub struct CompletionClient {
    backend: Arc<dyn CompletionBackend>,
    retry: RetryConfig,
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn backend(&self) -> &Arc<dyn CompletionBackend> {
        &self.backend
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }

    /// Return the raw, non-blank completion text for `prompt`
    pub async fn complete(&self, prompt: &str) -> Result<String, SearchError> {
        self.complete_with(prompt, |text| Ok(text.to_string())).await
    }

    /// Complete `prompt` and sanitize the reply into the payload for `kind`
    pub async fn complete_result(
        &self,
        prompt: &str,
        kind: SearchKind,
    ) -> Result<SearchResult, SearchError> {
        self.complete_with(prompt, |text| {
            sanitize::sanitize_result(text, kind).map_err(CompletionError::from)
        })
        .await
    }

    /// Complete `prompt` and convert the reply with `parse` inside the
    /// retry loop, so a parse failure costs one attempt
    pub async fn complete_with<T, P>(&self, prompt: &str, parse: P) -> Result<T, SearchError>
    where
        P: Fn(&str) -> Result<T, CompletionError>,
    {
        let backend = &self.backend;
        let parse = &parse;

        let result = with_retry(self.retry, |attempt| async move {
            tracing::debug!(attempt, backend = backend.id(), "Requesting completion");

            let text = backend.complete(prompt).await?;
            if text.trim().is_empty() {
                return Err(CompletionError::EmptyCompletion);
            }
            parse(&text)
        })
        .await;

        match result {
            RetryResult::Success(value) => Ok(value),
            RetryResult::Exhausted { last, attempts } => {
                tracing::error!(attempts, error = %last, "Completion retries exhausted");
                Err(SearchError::ExhaustedRetries { attempts, last })
            }
        }
    }
}
