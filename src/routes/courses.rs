use std::time::Instant;

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    indexer::index_library,
    state::AppState,
    types::{ContentNode, Course},
};

/// `GET /api/courses`: walks the current courses root and returns the catalog.
///
/// Nothing is cached between calls; every request sees the filesystem as it is now.
pub async fn list_courses(State(state): State<AppState>) -> AppResult<Json<Vec<Course>>> {
    state.metrics.inc_catalog_requests();
    let root = state.library.current().await;
    tracing::info!("Indexing courses in {}", root.display());

    let started = Instant::now();
    let courses = index_library(root, state.index_options.clone(), state.index_concurrency).await?;

    let lessons: usize = courses.iter().flat_map(|c| c.content.iter()).map(ContentNode::lesson_count).sum();
    state.metrics.add_indexed(courses.len() as u64, lessons as u64);
    tracing::info!(
        "Indexed {} courses with {} lessons in {} ms",
        courses.len(),
        lessons,
        started.elapsed().as_millis()
    );

    Ok(Json(courses))
}
