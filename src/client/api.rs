//! Transports a search request to whatever answers it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::view::GENERIC_CLIENT_ERROR;
use crate::models::{SearchBody, SearchRequest, SearchResult};
use crate::search::SearchService;
use crate::utils::build_client;

/// Client-side failure of a search
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The search was abandoned; never shown to the user
    #[error("Search cancelled")]
    Cancelled,

    #[error("Server responded with {status}")]
    Server { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    /// The body did not match the kind that was requested
    #[error("Unexpected response: {0}")]
    UnexpectedShape(String),
}

impl ClientError {
    /// Message for the error area, falling back to a generic one
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_CLIENT_ERROR.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

/// Something that can run a search on behalf of the controller
///
/// Implementations must return [`ClientError::Cancelled`] promptly once
/// `cancel` fires.
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, ClientError>;
}

#[async_trait]
impl<T: SearchApi + ?Sized> SearchApi for Arc<T> {
    async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, ClientError> {
        (**self).search(request, cancel).await
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Calls `POST /api/search` on a running server
#[derive(Debug, Clone)]
pub struct HttpSearchApi {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSearchApi {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: build_client(),
            endpoint: base.join("api/search")?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(&self, request: &SearchRequest) -> Result<SearchResult, ClientError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&SearchBody::from(request))
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .map(|body| body.error);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::UnexpectedShape(e.to_string()))?;
        SearchResult::from_value(request.kind, value)
            .map_err(|e| ClientError::UnexpectedShape(e.to_string()))
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, ClientError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.send(request) => result,
        }
    }
}

/// Runs searches in-process, without a server
#[derive(Debug, Clone)]
pub struct LocalSearchApi {
    service: Arc<SearchService>,
}

impl LocalSearchApi {
    pub fn new(service: Arc<SearchService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SearchApi for LocalSearchApi {
    async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, ClientError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.service.search(request) => result.map_err(|e| ClientError::Server {
                status: if e.is_client_error() { 400 } else { 500 },
                message: Some(e.user_message()),
            }),
        }
    }
}
