//! HTTP handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::SearchError;
use crate::models::{SearchBody, SearchResult, Subgenre};
use crate::server::AppState;

/// Error body shared by every failing API response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ErrorResponse::new(self.user_message()))).into_response()
    }
}

/// `POST /api/search`
///
/// Responds with the bare payload: an author array or `{ "description" }`.
pub async fn search(
    State(state): State<AppState>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<SearchResult>, Response> {
    let Json(body) = body.map_err(|rejection| {
        tracing::info!("Rejected search body: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "Corpo da requisição inválido: envie JSON com \"subgenre\" e \"searchType\".",
            )),
        )
            .into_response()
    })?;

    state
        .search
        .handle(&body)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

/// `GET /api/subgenres`
pub async fn subgenres(State(state): State<AppState>) -> Json<Vec<Subgenre>> {
    Json(state.catalog.entries().to_vec())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model: String,
    version: &'static str,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.search.completion().backend().model().to_string(),
        version: crate::VERSION,
    })
}
