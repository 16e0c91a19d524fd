//! # Kursbrowser Backend Library
//!
//! Backend for a local course player: indexes a directory tree of downloaded course
//! material (videos, PDFs, HTML pages) into a tree of courses, modules and lessons, and
//! serves the files, including byte-range streaming for video seeking.
//!
//! ## Core Components
//!
//! - [`config`]: Layered application configuration
//! - [`durations`]: Persisted cache of measured video durations
//! - [`error`]: Centralized error handling and HTTP error responses
//! - [`indexer`]: Recursive course indexer with natural title ordering
//! - [`library`]: The switchable courses root and path resolution below it
//! - [`media`]: Content types and range-aware file streaming
//! - [`metrics`]: Request counters
//! - [`middleware`]: Request validation and security headers
//! - [`routes`]: HTTP API endpoint handlers
//! - [`state`]: Shared application state
//! - [`types`]: Catalog and API data types

pub mod config;
pub mod durations;
pub mod error;
pub mod indexer;
pub mod library;
pub mod media;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::{
    routing::{get, put},
    Router,
};
use tower_http::compression::predicate::{DefaultPredicate, Predicate};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use state::AppState;

/// Builds the complete HTTP application for the given state.
pub fn build_router(state: AppState) -> Router {
    let cfg = state.config.clone();

    let mut app = Router::new()
        .route("/healthz", get(routes::health::healthz))
        .route("/readyz", get(routes::health::readyz))
        .route("/metrics", get(routes::health::metrics))
        .route("/version", get(routes::health::version))
        .route("/courses/{*path}", get(routes::files::serve_course_file))
        .route("/api/courses", get(routes::courses::list_courses))
        .route(
            "/api/video-durations",
            get(routes::durations::get_durations).post(routes::durations::save_durations),
        )
        .route("/api/video-durations/{*path}", put(routes::durations::put_duration))
        .route(
            "/api/config/courses-path",
            get(routes::settings::get_courses_path).post(routes::settings::set_courses_path),
        );

    // Optional: gebaute Player-UI mit SPA-Fallback auf index.html
    if let Some(ui_dir) = cfg.server.ui_dir.as_deref().filter(|d| !d.trim().is_empty()) {
        let ui_root = PathBuf::from(ui_dir);
        let ui_index = ui_root.join("index.html");
        if ui_root.is_dir() {
            tracing::info!("Serving UI from {}", ui_root.display());
            app = app.fallback_service(
                ServeDir::new(ui_root).append_index_html_on_directories(true).not_found_service(ServeFile::new(ui_index)),
            );
        } else {
            tracing::warn!("server.ui_dir {} is not a directory, UI disabled", ui_root.display());
        }
    }

    // Keine Kompression für Video, Byte-Ranges und Binärdaten: Content-Length und
    // Content-Range müssen den Bytes auf der Platte entsprechen.
    #[derive(Clone)]
    struct NoMediaDefault(DefaultPredicate);
    impl Predicate for NoMediaDefault {
        fn should_compress<B: axum::body::HttpBody>(&self, res: &axum::http::Response<B>) -> bool {
            if res.headers().contains_key(CONTENT_RANGE) {
                return false;
            }
            if let Some(ct) = res.headers().get(CONTENT_TYPE) {
                if let Ok(s) = ct.to_str() {
                    if s.starts_with("video/") || s.starts_with("application/octet-stream") {
                        return false;
                    }
                }
            }
            self.0.should_compress(res)
        }
    }
    let compression = CompressionLayer::new().compress_when(NoMediaDefault(DefaultPredicate::new()));

    let app = app
        .with_state(state)
        .layer(DefaultBodyLimit::max(cfg.server.max_body_bytes))
        .layer(from_fn_with_state(cfg.clone(), middleware::validation::validate_request_middleware))
        .layer(compression)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(cfg.clone(), middleware::security_headers::security_headers_middleware));

    // Der Player läuft auf einem anderen Origin und braucht Range + die Antwort-Header.
    if cfg.server.cors_permissive {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::PUT, Method::OPTIONS])
                .allow_headers([RANGE, CONTENT_TYPE])
                .expose_headers([ACCEPT_RANGES, CONTENT_RANGE, CONTENT_LENGTH]),
        )
    } else {
        app
    }
}
