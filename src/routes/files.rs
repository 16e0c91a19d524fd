use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};

use crate::{
    error::{AppError, AppResult},
    library::resolve_file,
    media::serve_file,
    middleware::validation::sanitize_for_logging,
    state::AppState,
};

/// `GET /courses/{*path}`: streams a file below the courses root.
///
/// Video files honor a single `Range` (206), everything else is sent whole (200).
pub async fn serve_course_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let root = state.library.current().await;
    let file = resolve_file(&root, &path, state.index_options.follow_symlinks).await?;

    let range = headers
        .get(header::RANGE)
        .map(|v| v.to_str().map_err(|_| AppError::BadRequest("Range header is not valid ASCII".into())))
        .transpose()?;

    tracing::debug!(
        "Serving {} ({} bytes, range={:?})",
        sanitize_for_logging(&path),
        file.size,
        range.map(sanitize_for_logging)
    );

    let (res, outcome) = serve_file(&file, range).await?;
    state.metrics.record_served(outcome.status == StatusCode::PARTIAL_CONTENT, outcome.bytes);
    Ok(res)
}
