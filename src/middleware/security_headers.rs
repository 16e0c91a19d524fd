//! Security headers middleware for HTTP responses.
//!
//! Lesson files are loaded cross-origin by the player (video elements, iframes for HTML
//! and PDF lessons), so frame and cross-origin resource policies are left unset here.

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::config::AppConfig;

/// Adds security-related HTTP headers and caching policy to all responses.
///
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: no-referrer`
/// - Optional `Content-Security-Policy` on JSON responses via `[security].csp`
/// - JSON responses: `Cache-Control: no-store` (catalog and cache must never be stale)
/// - Lesson files: `Cache-Control: no-cache` unless already set; the same URL can point
///   at a different file once the courses root is switched
pub async fn security_headers_middleware(
    State(cfg): State<Arc<AppConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let is_lesson_file = req.uri().path().starts_with("/courses/");
    let mut res = next.run(req).await;
    let headers = res.headers_mut();

    headers.insert(HeaderName::from_static("x-content-type-options"), HeaderValue::from_static("nosniff"));
    headers.insert(HeaderName::from_static("referrer-policy"), HeaderValue::from_static("no-referrer"));

    let ct_val: Option<String> = headers.get(CONTENT_TYPE).and_then(|ct| {
        ct.to_str()
            .map_err(|e| {
                tracing::warn!("Invalid UTF-8 in Content-Type header: {}", e);
                e
            })
            .ok()
            .map(|s| s.to_string())
    });
    let is_json = ct_val.as_deref().is_some_and(|s| s.starts_with("application/json"));

    if is_json {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        if let Some(csp) = cfg.security.as_ref().and_then(|s| s.csp.as_deref()) {
            if !csp.trim().is_empty() {
                if let Ok(val) = HeaderValue::from_str(csp) {
                    headers.insert(HeaderName::from_static("content-security-policy"), val);
                }
            }
        }
    } else if is_lesson_file && !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    }

    res
}
