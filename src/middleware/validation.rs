use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::AppConfig;

/// An Axum middleware that rejects obviously malicious or oversized requests early.
///
/// This middleware checks for:
/// - Path traversal attempts in the request URI (raw and percent-encoded).
/// - Content length above `server.max_body_bytes` on POST/PUT.
///
/// Containment of file paths is enforced again when a path is resolved below the
/// courses root; this layer only catches the cheap cases before routing.
pub async fn validate_request_middleware(
    State(cfg): State<Arc<AppConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let uri_path = req.uri().path();
    if contains_path_traversal(uri_path) {
        tracing::warn!("Rejected request with traversal pattern: {}", sanitize_for_logging(uri_path));
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": "INVALID_PATH",
                    "message": "Path traversal detected in request",
                },
                "status": 400,
            })),
        )
            .into_response();
    }

    if matches!(req.method(), &axum::http::Method::POST | &axum::http::Method::PUT) {
        if let Some(content_length) = req.headers().get("content-length") {
            if let Ok(length_str) = content_length.to_str() {
                if let Ok(length) = length_str.parse::<usize>() {
                    let max_body_size = cfg.server.max_body_bytes;
                    if length > max_body_size {
                        return (
                            StatusCode::PAYLOAD_TOO_LARGE,
                            Json(json!({
                                "error": {
                                    "code": "PAYLOAD_TOO_LARGE",
                                    "message": format!("Request body exceeds maximum size of {} bytes", max_body_size),
                                },
                                "status": 413,
                            })),
                        )
                            .into_response();
                    }
                }
            }
        }
    }

    next.run(req).await
}

/// Check if a URI path contains a `.` or `..` segment or a null byte, also in single or
/// double percent-encoded form.
///
/// Only whole segments count: names like `..Extras` or `Wait....mp4` are fine.
pub fn contains_path_traversal(path: &str) -> bool {
    let once = decode_lossy(path);
    let twice = decode_lossy(&once);
    let found = [path, once.as_str(), twice.as_str()].into_iter().any(has_dot_segment);
    found
}

fn has_dot_segment(path: &str) -> bool {
    path.contains('\0') || path.split(['/', '\\']).any(|seg| seg == ".." || seg == ".")
}

fn decode_lossy(path: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(path.as_bytes())).into_owned()
}

/// Sanitizes user input for logging purposes.
///
/// Removes control characters, limits the length to 200 characters and escapes quotes.
pub fn sanitize_for_logging(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .take(200)
        .collect::<String>()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\'', "\\\'")
}
