//! Streaming of lesson files with single-range support for video seeking.

pub mod range;

use std::io::SeekFrom;
use std::path::Path;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::library::ResolvedFile;

pub use range::{parse_range, ByteRange};

const CHUNK_SIZE: usize = 64 * 1024;

/// MIME type by file extension (case-insensitive).
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).unwrap_or_default();

    match ext.as_str() {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ts" => "video/mp2t",
        "m3u8" => "application/x-mpegURL",
        "pdf" => "application/pdf",
        "html" => "text/html",
        _ => "application/octet-stream",
    }
}

pub fn is_video(content_type: &str) -> bool {
    content_type.starts_with("video/")
}

/// What was sent, for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeOutcome {
    pub status: StatusCode,
    pub bytes: u64,
}

/// Builds the response for a resolved file.
///
/// Video files honor a `Range` header (206); everything else, and requests without
/// `Range`, get the whole file (200). The body is streamed; when the client goes away the
/// stream is dropped and the file closed.
pub async fn serve_file(file: &ResolvedFile, range_header: Option<&str>) -> AppResult<(Response, ServeOutcome)> {
    let content_type = content_type_for(&file.path);
    let video = is_video(content_type);

    let range = match range_header {
        Some(v) if video => Some(parse_range(v, file.size)?),
        _ => None,
    };

    let mut handle = tokio::fs::File::open(&file.path).await?;

    match range {
        Some(r) => {
            handle.seek(SeekFrom::Start(r.start)).await.map_err(|e| {
                AppError::IoError(format!("seek to {} failed in {}: {}", r.start, file.path.display(), e))
            })?;
            let stream = ReaderStream::with_capacity(handle.take(r.length()), CHUNK_SIZE);

            let res = (
                StatusCode::PARTIAL_CONTENT,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_RANGE, r.content_range(file.size)),
                    (header::CONTENT_LENGTH, r.length().to_string()),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                ],
                Body::from_stream(stream),
            )
                .into_response();
            Ok((res, ServeOutcome { status: StatusCode::PARTIAL_CONTENT, bytes: r.length() }))
        }
        None => {
            let stream = ReaderStream::with_capacity(handle.take(file.size), CHUNK_SIZE);
            let mut res = (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_LENGTH, file.size.to_string()),
                ],
                Body::from_stream(stream),
            )
                .into_response();
            if video {
                res.headers_mut().insert(header::ACCEPT_RANGES, header::HeaderValue::from_static("bytes"));
            }
            Ok((res, ServeOutcome { status: StatusCode::OK, bytes: file.size }))
        }
    }
}
