//! Integration and unit tests for the Kursbrowser backend.
//!
//! ## Test Modules
//!
//! - **indexer_tests**: Catalog building on real directory trees
//! - **api_tests**: Course, file, duration and settings endpoints
//! - **health_api_tests**: Health, readiness, metrics and version endpoints
//! - **durations_tests**: Duration cache persistence and concurrent updates
//! - **error_tests**: Error mapping and validation helpers
//! - **config_tests**: Configuration defaults and validation
//!
//! Individual test modules can be run with:
//! ```bash
//! cargo test indexer_tests
//! cargo test api_tests
//! # etc.
//! ```

pub mod indexer_tests;

use std::path::Path;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{build_router, config::AppConfig, state::AppState};

/// A courses root and a data directory, both temporary, plus state pointing at them.
pub(crate) struct TestEnv {
    pub root: TempDir,
    pub data: TempDir,
    pub state: AppState,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();

        let mut cfg = AppConfig::default();
        cfg.library.root = root.path().to_string_lossy().into_owned();
        cfg.library.concurrency = Some(2);
        cfg.cache.durations_file = data.path().join("video-durations-cache.json").to_string_lossy().into_owned();

        let state = AppState::new(cfg).unwrap();
        Self { root, data, state }
    }

    /// Writes a file below the courses root, creating parent directories.
    pub fn write(&self, rel: &str, content: &[u8]) {
        write_file(self.root.path(), rel, content);
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = build_router(self.state.clone()).oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _, bytes) = self.send(req).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }
}

pub(crate) fn write_file(base: &Path, rel: &str, content: &[u8]) {
    let path = base.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// 1000 bytes of a recognizable, non-repeating-at-100 pattern.
pub(crate) fn sample_video() -> Vec<u8> {
    (0..1000u32).map(|i| (i % 251) as u8).collect()
}
