//! Search orchestration: validate, build the prompt, complete, sanitize.
//!
//! [`SearchService`] is the composition root's single shared service. It
//! holds only read-only state (the completion client), so one instance
//! serves every concurrent request.

use std::sync::Arc;

use tracing::Instrument;

use crate::completion::{CompletionBackend, CompletionClient};
use crate::error::SearchError;
use crate::models::{SearchBody, SearchRequest, SearchResult};
use crate::prompts;
use crate::utils::RetryConfig;

/// Runs searches against a completion backend
#[derive(Debug, Clone)]
pub struct SearchService {
    completion: CompletionClient,
}

impl SearchService {
    pub fn new(completion: CompletionClient) -> Self {
        Self { completion }
    }

    /// Build a service from a backend and retry policy
    pub fn with_backend(backend: Arc<dyn CompletionBackend>, retry: RetryConfig) -> Self {
        Self::new(CompletionClient::new(backend).with_retry_config(retry))
    }

    pub fn completion(&self) -> &CompletionClient {
        &self.completion
    }

    /// Validate a raw request body and run the search
    ///
    /// Invalid input fails immediately without touching the backend.
    pub async fn handle(&self, body: &SearchBody) -> Result<SearchResult, SearchError> {
        let request = SearchRequest::from_body(body).map_err(|message| {
            tracing::info!(
                subgenre = ?body.subgenre,
                search_type = ?body.search_type,
                "Rejected search request: {}",
                message
            );
            SearchError::InvalidInput(message)
        })?;

        self.search(&request).await
    }

    /// Run a validated search
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        let span = tracing::info_span!(
            "search",
            subgenre = %request.subgenre,
            kind = %request.kind
        );

        async {
            let prompt = prompts::build_prompt(&request.subgenre, request.kind);
            tracing::debug!(prompt_chars = prompt.chars().count(), "Built prompt");

            let result = self
                .completion
                .complete_result(&prompt, request.kind)
                .await?;

            if let SearchResult::Authors(authors) = &result {
                tracing::info!(authors = authors.len(), "Search completed");
            } else {
                tracing::info!("Search completed");
            }
            Ok(result)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionError, MockBackend};
    use crate::models::SearchKind;
    use std::time::Duration;

    fn service(backend: &Arc<MockBackend>) -> SearchService {
        SearchService::with_backend(
            backend.clone(),
            RetryConfig::default().delay(Duration::from_millis(1)),
        )
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_backend() {
        let backend = Arc::new(MockBackend::new());
        let body = SearchBody {
            subgenre: Some("cozy".into()),
            search_type: None,
        };

        let err = service(&backend).handle(&body).await.unwrap_err();

        assert!(matches!(err, SearchError::InvalidInput(_)));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_prompt_matches_request() {
        let backend = Arc::new(MockBackend::new());
        backend.push_reply(r#"{"description": "P1"}"#);

        let request = SearchRequest::new("Noir Nórdico", SearchKind::SubgenreEssay);
        service(&backend).search(&request).await.unwrap();

        assert_eq!(
            backend.prompts(),
            vec![prompts::build_prompt("Noir Nórdico", SearchKind::SubgenreEssay)]
        );
    }

    #[tokio::test]
    async fn test_every_attempt_uses_same_prompt() {
        let backend = Arc::new(MockBackend::new());
        backend.set_fallback(Err(CompletionError::Network("refused".into())));

        let body = SearchBody::new("cozy", SearchKind::AuthorList);
        let err = service(&backend).handle(&body).await.unwrap_err();

        assert!(matches!(err, SearchError::ExhaustedRetries { attempts: 3, .. }));
        let prompts = backend.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.iter().all(|p| p == &prompts[0]));
    }
}
