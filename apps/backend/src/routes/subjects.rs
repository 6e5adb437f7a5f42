//! Subject endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// Trimmed, required subject name
fn validated_name(request: &SubjectRequest) -> Result<&str> {
    request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Subject name is required".to_string()))
}

/// GET /api/subjects
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Subject>>> {
    let subjects = state.db.list_subjects(auth.user_id).await?;
    Ok(Json(subjects))
}

/// POST /api/subjects
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<SubjectRequest>,
) -> Result<(StatusCode, Json<Subject>)> {
    let name = validated_name(&request)?;
    let subject = state
        .db
        .create_subject(auth.user_id, name, request.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(subject)))
}

/// PATCH /api/subjects/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(subject_id): Path<Uuid>,
    Json(request): Json<SubjectRequest>,
) -> Result<Json<Subject>> {
    let name = validated_name(&request)?;
    let subject = state
        .db
        .update_subject(auth.user_id, subject_id, name, request.description.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Subject not found".to_string()))?;

    Ok(Json(subject))
}

/// DELETE /api/subjects/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(subject_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let deleted = state.db.delete_subject(auth.user_id, subject_id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
