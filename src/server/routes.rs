//! HTTP handlers for the download API.
//!
//! Request bodies are taken as raw strings so the content-type and JSON
//! checks produce the API's own error shape instead of axum's default
//! rejections. Every error body is `{"error": ...}` with an optional
//! `"details"` field in debug mode.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use url::Url;

use crate::core::error::AppError;
use crate::download::orchestrator::DownloadRequest;
use crate::download::plan::OutputKind;
use crate::server::{stream, AppState};

/// Maps an [`AppError`] to its HTTP status.
fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error body: the display message, plus the debug representation when the
/// server runs with DEBUG=true.
fn error_response(state: &AppState, err: &AppError) -> Response {
    let mut body = json!({ "error": err.to_string() });
    if state.config.debug {
        body["details"] = json!(format!("{:?}", err));
    }
    (status_for(err), Json(body)).into_response()
}

/// Content-type gate plus JSON parse, shared by the two POST endpoints.
fn parse_json_body(headers: &HeaderMap, body: &str) -> Result<serde_json::Value, Response> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(json!({ "error": "Content-Type must be application/json" })),
        )
            .into_response());
    }

    serde_json::from_str(body).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Request body is not valid JSON" })),
        )
            .into_response()
    })
}

/// Pulls and validates the `url` field.
fn parse_url(body: &serde_json::Value) -> Result<Url, AppError> {
    let raw = body
        .get("url")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("No URL provided".to_string()))?;
    Url::parse(raw).map_err(|_| AppError::Validation(format!("Invalid URL: {}", raw)))
}

/// POST /api/download — runs the full pipeline and returns where to fetch
/// the finished file.
pub async fn download(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    let body = match parse_json_body(&headers, &body) {
        Ok(v) => v,
        Err(response) => return response,
    };

    let url = match parse_url(&body) {
        Ok(url) => url,
        Err(err) => return error_response(&state, &err),
    };
    let kind = body.get("format").and_then(|v| v.as_str()).unwrap_or("video");
    let kind = match OutputKind::from_wire(kind) {
        Some(kind) => kind,
        None => {
            let err = AppError::Validation(format!(
                "Invalid format '{}': expected 'video' or 'mp3'",
                kind
            ));
            return error_response(&state, &err);
        }
    };

    log::info!("Download request: {} ({:?})", url, kind);
    match state.orchestrator.download(&DownloadRequest { url, kind }).await {
        Ok(result) => Json(json!({
            "success": true,
            "filename": result.filename,
            "title": result.title,
            "size": result.size,
            "download_url": format!("/api/file/{}", result.filename),
        }))
        .into_response(),
        Err(err) => error_response(&state, &err),
    }
}

/// POST /api/info — metadata probe without downloading.
pub async fn info(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    let body = match parse_json_body(&headers, &body) {
        Ok(v) => v,
        Err(response) => return response,
    };
    let url = match parse_url(&body) {
        Ok(url) => url,
        Err(err) => return error_response(&state, &err),
    };

    match state.orchestrator.probe(&url).await {
        Ok(info) => Json(json!({
            "title": info.title,
            "duration": info.duration,
            "thumbnail": info.thumbnail,
            "uploader": info.uploader,
            "has_drm": info.has_drm,
        }))
        .into_response(),
        Err(err) => error_response(&state, &err),
    }
}

/// GET /api/file/{filename} — streams a stored artifact as an attachment.
pub async fn file(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    let path = match state.orchestrator.store().resolve(&filename) {
        Ok(path) => path,
        Err(err) => return error_response(&state, &err),
    };
    match stream::attachment_response(&path, &filename).await {
        Ok(response) => response,
        Err(err) => error_response(&state, &err),
    }
}

/// GET /api/list — lists stored files.
pub async fn list(State(state): State<AppState>) -> Response {
    match state.orchestrator.store().list() {
        Ok(files) => {
            let files: Vec<_> = files
                .iter()
                .map(|entry| {
                    json!({
                        "filename": entry.filename,
                        "size": entry.size,
                        "download_url": format!("/api/file/{}", entry.filename),
                    })
                })
                .collect();
            Json(json!(files)).into_response()
        }
        Err(err) => error_response(&state, &err),
    }
}

/// GET /health — liveness probe.
pub async fn health() -> Response {
    Json(json!({ "status": "healthy" })).into_response()
}
