use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::api::extract::{StageBody, StageId};
use crate::api::AppState;
use crate::domain::Stage;
use crate::error::AppError;

pub async fn list_stages(State(state): State<AppState>) -> Result<Json<Vec<Stage>>, AppError> {
    let stages = state.repo.list_stages().await?;
    Ok(Json(stages))
}

pub async fn get_stage(
    State(state): State<AppState>,
    StageId(id): StageId,
) -> Result<Json<Stage>, AppError> {
    state
        .repo
        .get_stage(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Stage not found".into()))
}

/// Responds `201 Created` with an empty body and a `Location` header.
pub async fn create_stage(
    State(state): State<AppState>,
    StageBody(payload): StageBody,
) -> Result<impl IntoResponse, AppError> {
    let id = state.repo.insert_stage(&payload).await?;
    tracing::debug!(id, "Created stage");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/stages/{}", id))],
    ))
}

/// Full replace. An unknown id is not an error; nothing is written.
pub async fn update_stage(
    State(state): State<AppState>,
    StageId(id): StageId,
    StageBody(payload): StageBody,
) -> Result<StatusCode, AppError> {
    let rows_affected = state.repo.update_stage(id, &payload).await?;
    tracing::debug!(id, rows_affected, "Updated stage");
    Ok(StatusCode::OK)
}

/// Idempotent: deleting an unknown id also answers 200.
pub async fn delete_stage(
    State(state): State<AppState>,
    StageId(id): StageId,
) -> Result<StatusCode, AppError> {
    let rows_affected = state.repo.delete_stage(id).await?;
    tracing::debug!(id, rows_affected, "Deleted stage");
    Ok(StatusCode::OK)
}
