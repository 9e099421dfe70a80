//! Mock backend for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::completion::{CompletionBackend, CompletionError};

/// A mock backend that replays scripted replies.
///
/// Replies are consumed in order; once the script is empty the fallback
/// reply (if any) is returned for every further call, otherwise the call
/// fails with a network error.
#[derive(Debug, Default)]
pub struct MockBackend {
    script: Mutex<VecDeque<Result<String, CompletionError>>>,
    fallback: Mutex<Option<Result<String, CompletionError>>>,
    latency: Option<Duration>,
    calls: AtomicU32,
    prompts: Mutex<Vec<String>>,
    call_times: Mutex<Vec<Instant>>,
}

impl MockBackend {
    /// Create a new mock backend with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, text: impl Into<String>) -> &Self {
        self.push(Ok(text.into()))
    }

    /// Queue a failed call.
    pub fn push_error(&self, error: CompletionError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, reply: Result<String, CompletionError>) -> &Self {
        lock(&self.script).push_back(reply);
        self
    }

    /// Reply returned once the script is exhausted.
    pub fn set_fallback(&self, reply: Result<String, CompletionError>) {
        *lock(&self.fallback) = Some(reply);
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Gaps between consecutive calls.
    pub fn call_gaps(&self) -> Vec<Duration> {
        lock(&self.call_times)
            .windows(2)
            .map(|w| w[1].duration_since(w[0]))
            .collect()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn id(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.prompts).push(prompt.to_string());
        lock(&self.call_times).push(Instant::now());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = lock(&self.script).pop_front();
        match scripted {
            Some(reply) => reply,
            None => lock(&self.fallback)
                .clone()
                .unwrap_or_else(|| Err(CompletionError::Network("mock script exhausted".into()))),
        }
    }
}
