//! Integration tests for Mystery Scout
//!
//! These tests drive the HTTP API in-process with a scripted completion
//! backend, and run the request controller against both transports.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use tower::ServiceExt;

use mystery_scout::catalog::Catalog;
use mystery_scout::client::{
    ClientError, ControlState, HttpSearchApi, LocalSearchApi, RequestController, SearchApi,
    SearchView,
};
use mystery_scout::completion::{CompletionError, MockBackend};
use mystery_scout::models::{SearchKind, SearchOutcome, SearchRequest, SearchResult, Subgenre};
use mystery_scout::render::{AuthorCard, ResultsPanel};
use mystery_scout::search::SearchService;
use mystery_scout::server::{build_router, AppState};
use mystery_scout::utils::RetryConfig;
use tokio_util::sync::CancellationToken;

fn author_json(i: usize) -> Value {
    json!({
        "name": format!("Autora {i}"),
        "dates": "1950 - em atividade",
        "description": "Mistérios aconchegantes em vilarejos.",
        "works": ["Obra 1", "Obra 2", "Obra 3"]
    })
}

fn fenced_authors(n: usize) -> String {
    let authors: Vec<Value> = (1..=n).map(author_json).collect();
    format!(
        "```json\n{}\n```\n",
        serde_json::to_string_pretty(&authors).unwrap()
    )
}

fn service(backend: &Arc<MockBackend>, retry: RetryConfig) -> SearchService {
    SearchService::with_backend(backend.clone(), retry)
}

fn app(backend: &Arc<MockBackend>) -> Router {
    app_with_retry(backend, RetryConfig::default())
}

fn app_with_retry(backend: &Arc<MockBackend>, retry: RetryConfig) -> Router {
    build_router(
        AppState::new(service(backend, retry), Catalog::embedded()),
        None,
    )
}

fn search_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ---------------------------------------------------------------------------
// HTTP API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_author_search_strips_fences() {
    let backend = Arc::new(MockBackend::new());
    backend.push_reply(fenced_authors(15));

    let (status, body) = send(
        app(&backend),
        search_request(json!({"subgenre": "cozy", "searchType": "escritores"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let authors = body.as_array().expect("author array");
    assert_eq!(authors.len(), 15);
    assert_eq!(authors[0]["name"], "Autora 1");
    assert_eq!(authors[14]["works"].as_array().unwrap().len(), 3);
    assert_eq!(backend.calls(), 1);
    assert!(backend.prompts()[0].contains("cozy"));
}

#[tokio::test]
async fn test_essay_search_returns_description_object() {
    let backend = Arc::new(MockBackend::new());
    backend.push_reply(r#"{"description": "O <i>noir</i> nasceu.\n\nP2\n\nP3"}"#);

    let (status, body) = send(
        app(&backend),
        search_request(json!({"subgenre": "noir", "searchType": "subgenero"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "O <i>noir</i> nasceu.\n\nP2\n\nP3");
}

#[tokio::test]
async fn test_missing_search_type_is_client_error() {
    let backend = Arc::new(MockBackend::new());

    let (status, body) = send(app(&backend), search_request(json!({"subgenre": "cozy"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("searchType"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_unknown_search_type_is_client_error() {
    let backend = Arc::new(MockBackend::new());

    let (status, body) = send(
        app(&backend),
        search_request(json!({"subgenre": "cozy", "searchType": "autores"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("autores"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_non_json_body_is_client_error() {
    let backend = Arc::new(MockBackend::new());
    let request = Request::builder()
        .method("POST")
        .uri("/api/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("subgenre=cozy"))
        .unwrap();

    let (status, body) = send(app(&backend), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_is_server_error() {
    let backend = Arc::new(MockBackend::new());
    backend.set_fallback(Err(CompletionError::Api {
        status: 503,
        message: "The model is overloaded".into(),
    }));

    let (status, body) = send(
        app(&backend),
        search_request(json!({"subgenre": "cozy", "searchType": "escritores"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("múltiplas tentativas"));
    assert!(!message.contains("overloaded"));

    assert_eq!(backend.calls(), 3);
    for gap in backend.call_gaps() {
        assert!(gap >= Duration::from_millis(2000) && gap < Duration::from_millis(2100));
    }
}

#[tokio::test]
async fn test_malformed_replies_exhaust_with_format_message() {
    let backend = Arc::new(MockBackend::new());
    backend.set_fallback(Ok("Desculpe, não posso ajudar com isso.".into()));

    let (status, body) = send(
        app_with_retry(&backend, RetryConfig::default().delay(Duration::from_millis(1))),
        search_request(json!({"subgenre": "cozy", "searchType": "escritores"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("formato inesperado"));
    assert_eq!(backend.calls(), 3);
}

#[tokio::test]
async fn test_subgenre_catalog_endpoint() {
    let backend = Arc::new(MockBackend::new());
    let request = Request::builder()
        .uri("/api/subgenres")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(&backend), request).await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), Catalog::embedded().len());
    assert!(entries.iter().any(|e| e["id"] == "cozy"));
}

#[tokio::test]
async fn test_health_reports_model() {
    let backend = Arc::new(MockBackend::new());
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(app(&backend), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "mock-model");
    assert_eq!(body["version"], mystery_scout::VERSION);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let backend = Arc::new(MockBackend::new());
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();

    let response = app(&backend).oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_static_files_served_at_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Mystery Scout</h1>").unwrap();

    let backend = Arc::new(MockBackend::new());
    let router = build_router(
        AppState::new(
            service(&backend, RetryConfig::default()),
            Catalog::embedded(),
        ),
        Some(dir.path()),
    );
    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>Mystery Scout</h1>");
}

// ---------------------------------------------------------------------------
// Request controller
// ---------------------------------------------------------------------------

/// Records the last state of every element the controller touches
#[derive(Debug, Default)]
struct PageView {
    selector_enabled: bool,
    selection_cleared: bool,
    author_control: Option<ControlState>,
    essay_control: Option<ControlState>,
    heading: Option<String>,
    error: Option<String>,
    updates: usize,
}

impl SearchView for PageView {
    fn set_selector_enabled(&mut self, enabled: bool) {
        self.selector_enabled = enabled;
        self.updates += 1;
    }

    fn clear_selection(&mut self) {
        self.selection_cleared = true;
        self.updates += 1;
    }

    fn set_control(&mut self, kind: SearchKind, state: ControlState) {
        match kind {
            SearchKind::AuthorList => self.author_control = Some(state),
            SearchKind::SubgenreEssay => self.essay_control = Some(state),
        }
        self.updates += 1;
    }

    fn show_loading(&mut self, heading: &str) {
        self.heading = Some(heading.to_string());
        self.updates += 1;
    }

    fn show_results(&mut self, _panel: &ResultsPanel) {
        self.error = None;
        self.updates += 1;
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.updates += 1;
    }

    fn card_toggled(&mut self, _card: &AuthorCard) {
        self.updates += 1;
    }
}

fn noir() -> Subgenre {
    Catalog::embedded().get("noir").cloned().unwrap()
}

#[tokio::test]
async fn test_controller_renders_essay_in_three_blocks() {
    let backend = Arc::new(MockBackend::new());
    backend.push_reply(r#"{"description": "P1\n\nP2\n\nP3"}"#);
    let api = LocalSearchApi::new(Arc::new(service(&backend, RetryConfig::default())));

    let controller = RequestController::new(api, PageView::default());
    controller.select_subgenre(Some(noir()));
    let outcome = assert_ok!(controller.search(SearchKind::SubgenreEssay).await);

    assert!(matches!(outcome, SearchOutcome::Success(SearchResult::Essay(_))));
    controller.with_results(|results| match results.panel() {
        Some(ResultsPanel::Essay(card)) => assert_eq!(card.paragraphs().len(), 3),
        other => panic!("expected essay panel, got {other:?}"),
    });
    controller.with_view(|view| {
        assert_eq!(view.heading.as_deref(), Some("Noir"));
        assert!(view.selector_enabled);
        assert!(view.selection_cleared);
        assert_eq!(view.author_control, Some(ControlState::Disabled));
        assert_eq!(view.essay_control, Some(ControlState::Disabled));
    });
}

#[tokio::test(start_paused = true)]
async fn test_controller_failure_resets_after_exhaustion() {
    let backend = Arc::new(MockBackend::new());
    backend.set_fallback(Err(CompletionError::Network("connection refused".into())));
    let api = LocalSearchApi::new(Arc::new(service(&backend, RetryConfig::default())));

    let controller = RequestController::new(api, PageView::default());
    controller.select_subgenre(Some(noir()));
    let outcome = assert_ok!(controller.search(SearchKind::AuthorList).await);

    match outcome {
        SearchOutcome::Failure(message) => assert!(message.contains("sobrecarregado")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(backend.calls(), 3);
    controller.with_view(|view| {
        assert!(view.error.is_some());
        assert!(view.selection_cleared);
        assert_eq!(view.author_control, Some(ControlState::Disabled));
    });
    assert_err!(controller.search(SearchKind::AuthorList).await);
}

#[tokio::test(start_paused = true)]
async fn test_controller_new_search_cancels_pending_one() {
    let backend = Arc::new(MockBackend::new().with_latency(Duration::from_secs(5)));
    backend.set_fallback(Ok(fenced_authors(2)));
    let api = LocalSearchApi::new(Arc::new(service(&backend, RetryConfig::default())));
    let controller = Arc::new(RequestController::new(api, PageView::default()));
    controller.select_subgenre(Some(noir()));

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.search(SearchKind::AuthorList).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = assert_ok!(controller.search(SearchKind::SubgenreEssay).await);
    let first = assert_ok!(first.await.unwrap());

    assert!(first.is_cancelled());
    // the essay search received an author array
    assert!(matches!(second, SearchOutcome::Failure(_)));
    controller.with_view(|view| assert!(view.error.is_some()));
}

#[tokio::test]
async fn test_http_api_against_running_server() {
    let backend = Arc::new(MockBackend::new());
    backend.push_reply(fenced_authors(15));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(&backend)).await.unwrap();
    });

    let api = HttpSearchApi::new(&format!("http://{}", addr)).unwrap();
    let result = api
        .search(
            &SearchRequest::new("cozy", SearchKind::AuthorList),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    match result {
        SearchResult::Authors(authors) => assert_eq!(authors.len(), 15),
        other => panic!("expected authors, got {other:?}"),
    }

    let err = api
        .search(
            &SearchRequest::new(" ", SearchKind::AuthorList),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    match err {
        ClientError::Server { status, message } => {
            assert_eq!(status, 400);
            assert!(message.unwrap().contains("subgênero"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
}
