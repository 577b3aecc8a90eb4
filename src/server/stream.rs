//! File streaming responses.
//!
//! Stored artifacts are served as chunked attachment downloads instead of
//! being read into memory, so a 2 GiB video costs the server one small
//! buffer.

use std::path::Path;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use tokio_util::io::ReaderStream;

use crate::core::error::{AppError, AppResult};

/// Chunk size for streamed file responses.
const STREAM_CHUNK_BYTES: usize = 8192;

/// MIME type by extension; generic fallback for anything unrecognized.
fn content_type(filename: &str) -> &'static str {
    match filename.rsplit('.').next().map(|e| e.to_lowercase()).as_deref() {
        Some("mp4") => "video/mp4",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("webm") => "video/webm",
        Some("opus") | Some("ogg") => "audio/ogg",
        Some("aac") => "audio/aac",
        _ => "application/octet-stream",
    }
}

/// Builds a chunked attachment response for a stored file.
pub async fn attachment_response(path: &Path, filename: &str) -> AppResult<Response> {
    let file = tokio::fs::File::open(path).await?;
    let stream = ReaderStream::with_capacity(file, STREAM_CHUNK_BYTES);

    let disposition = format!("attachment; filename=\"{}\"", filename);
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, HeaderValue::from_static(content_type(filename)))
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Extraction(format!("Failed to build file response: {}", e)))
}
