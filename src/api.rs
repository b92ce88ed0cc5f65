use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::state::AppState;
use crate::ui;

const BUILTIN_DEMO_FASTA: &str = include_str!("../static/demo/demo.fasta");

/// Response headers copied back from the prediction backend.
const FORWARDED_RESPONSE_HEADERS: [header::HeaderName; 2] =
    [header::CONTENT_TYPE, header::CONTENT_DISPOSITION];

pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_bytes();

    Router::new()
        .route("/health", get(health))
        .route("/", get(submit_page))
        .route("/index.html", get(submit_page))
        .route("/results", get(results_page))
        .route("/results.html", get(results_page))
        .route("/demo/demo.fasta", get(demo_fasta))
        .route("/api/{*rest}", any(forward_api))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({"status": "ok", "build": state.build.hash}))
}

async fn submit_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(ui::render_submit_page(&state.build))
}

async fn results_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(ui::render_results_page(&state.build))
}

async fn demo_fasta(State(state): State<Arc<AppState>>) -> Response {
    let path = state.config.demo_fasta_path();
    let body = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(err) => {
            debug!(
                "demo fasta {} unavailable ({err}); serving built-in sample",
                path.display()
            );
            BUILTIN_DEMO_FASTA.to_string()
        }
    };
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

/// Passes one `/api/*` call through to the prediction backend unchanged.
/// Failures are reported once; nothing is retried.
async fn forward_api(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let url = upstream_url(&state.config.upstream_url, &uri);
    debug!("forwarding {method} {url}");

    let mut request = state.upstream.request(method.clone(), url.as_str());
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        request = request.header(header::CONTENT_TYPE, content_type.clone());
    }
    if !body.is_empty() {
        request = request.body(body);
    }

    let upstream = request.send().await.map_err(|err| {
        warn!("upstream {method} {url} failed: {err}");
        ApiError::bad_gateway(format!("Prediction service unavailable: {err}"))
    })?;

    let status = upstream.status();
    let mut response_headers = HeaderMap::new();
    for name in FORWARDED_RESPONSE_HEADERS {
        if let Some(value) = upstream.headers().get(&name) {
            response_headers.insert(name, value.clone());
        }
    }

    let bytes = upstream.bytes().await.map_err(|err| {
        warn!("reading upstream response for {url} failed: {err}");
        ApiError::bad_gateway(format!("Prediction service response incomplete: {err}"))
    })?;

    if !status.is_success() {
        debug!("upstream {method} {url} answered {status}");
    }

    Ok((status, response_headers, bytes).into_response())
}

fn upstream_url(base: &str, uri: &Uri) -> String {
    let path = uri
        .path_and_query()
        .map(|value| value.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{}{path}", base.trim_end_matches('/'))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
