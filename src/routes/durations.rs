use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::{
    error::{
        validation::{validate_duration, validate_path},
        AppResult,
    },
    middleware::validation::sanitize_for_logging,
    state::AppState,
    types::{DurationMap, DurationUpdate, SaveDurationsResponse, UpsertDurationResponse},
};

/// `GET /api/video-durations`: the whole cache, `{}` on a fresh installation.
pub async fn get_durations(State(state): State<AppState>) -> AppResult<Json<DurationMap>> {
    let map = state.durations.load_all().await?;
    tracing::debug!("Loaded {} cached durations", map.len());
    Ok(Json(map))
}

/// `POST /api/video-durations`: replaces the whole cache.
pub async fn save_durations(
    State(state): State<AppState>,
    payload: Result<Json<DurationMap>, JsonRejection>,
) -> AppResult<Json<SaveDurationsResponse>> {
    let Json(map) = payload?;
    for (path, duration) in &map {
        validate_path(path)?;
        validate_duration(*duration, path)?;
    }

    let count = state.durations.save_all(map).await?;
    state.metrics.add_duration_updates(count);
    tracing::info!("Saved duration cache with {} entries", count);
    Ok(Json(SaveDurationsResponse { success: true, count }))
}

/// `PUT /api/video-durations/{*path}`: sets the duration of one lesson.
pub async fn put_duration(
    State(state): State<AppState>,
    Path(path): Path<String>,
    payload: Result<Json<DurationUpdate>, JsonRejection>,
) -> AppResult<Json<UpsertDurationResponse>> {
    let Json(update) = payload?;
    validate_path(&path)?;
    validate_duration(update.duration, "duration")?;

    state.durations.upsert(path.clone(), update.duration).await?;
    state.metrics.add_duration_updates(1);
    tracing::info!("Duration for {} set to {}s", sanitize_for_logging(&path), update.duration);
    Ok(Json(UpsertDurationResponse { success: true, path, duration: update.duration }))
}
