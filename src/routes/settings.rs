use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    library::display_root,
    state::AppState,
    types::{CoursesPathResponse, SetCoursesPathResponse},
};

/// `GET /api/config/courses-path`
pub async fn get_courses_path(State(state): State<AppState>) -> Json<CoursesPathResponse> {
    let root = state.library.current().await;
    Json(CoursesPathResponse { path: display_root(&root) })
}

/// `POST /api/config/courses-path` with `{ "path": "..." }`.
///
/// 400 if `path` is missing or not a string, 404 if it does not exist. The previous root
/// stays active on any failure.
pub async fn set_courses_path(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<SetCoursesPathResponse>> {
    let Json(body) = payload?;
    let path = body.get("path").and_then(Value::as_str).ok_or_else(|| AppError::ValidationError {
        field: "path".to_string(),
        message: "path must be a string".to_string(),
    })?;

    let root = state.library.set(path).await?;
    Ok(Json(SetCoursesPathResponse { success: true, path: display_root(&root) }))
}
