//! Card endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use quiz_core::types::is_valid_difficulty;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// Check required fields and the difficulty range
pub fn validate_card(request: CardRequest) -> Result<NewCard> {
    let title = request.title.map(|t| t.trim().to_string()).unwrap_or_default();
    let content = request.content.map(|c| c.trim().to_string()).unwrap_or_default();

    let subject_id = match request.subject_id {
        Some(id) if !title.is_empty() && !content.is_empty() => id,
        _ => {
            return Err(ApiError::BadRequest(
                "title, content and subject_id are required".to_string(),
            ))
        }
    };

    let difficulty = request.difficulty.unwrap_or(1);
    if !is_valid_difficulty(difficulty) {
        return Err(ApiError::BadRequest(format!(
            "difficulty must be between 1 and 5, got {}",
            difficulty
        )));
    }

    Ok(NewCard {
        title,
        content,
        difficulty,
        subject_id,
    })
}

async fn require_subject(state: &AppState, user_id: Uuid, subject_id: Uuid) -> Result<()> {
    if state.db.subject_belongs_to(user_id, subject_id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound("Subject not found".to_string()))
    }
}

/// GET /api/cards?subject_id=
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<CardListQuery>,
) -> Result<Json<Vec<CardWithSubject>>> {
    let cards = state.db.list_cards(auth.user_id, query.subject_id).await?;
    Ok(Json(cards))
}

/// POST /api/cards
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<CardRequest>,
) -> Result<(StatusCode, Json<DbCard>)> {
    let card = validate_card(request)?;
    require_subject(&state, auth.user_id, card.subject_id).await?;

    let card = state.db.create_card(auth.user_id, &card).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// PATCH /api/cards/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(card_id): Path<Uuid>,
    Json(request): Json<CardRequest>,
) -> Result<Json<DbCard>> {
    let card = validate_card(request)?;
    require_subject(&state, auth.user_id, card.subject_id).await?;

    let card = state
        .db
        .update_card(auth.user_id, card_id, &card)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    Ok(Json(card))
}

/// DELETE /api/cards/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(card_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let deleted = state.db.delete_card(auth.user_id, card_id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(difficulty: Option<i32>) -> CardRequest {
        CardRequest {
            title: Some("  Fotossíntese ".to_string()),
            content: Some("processo de conversão de luz em energia".to_string()),
            difficulty,
            subject_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn test_validate_card_defaults_difficulty() {
        let card = validate_card(request(None)).unwrap();
        assert_eq!(card.difficulty, 1);
        assert_eq!(card.title, "Fotossíntese");
    }

    #[test]
    fn test_validate_card_rejects_out_of_range_difficulty() {
        assert!(matches!(
            validate_card(request(Some(6))),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_card(request(Some(0))),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_validate_card_requires_fields() {
        let mut missing_content = request(Some(3));
        missing_content.content = Some("   ".to_string());
        assert!(validate_card(missing_content).is_err());

        let mut missing_subject = request(Some(3));
        missing_subject.subject_id = None;
        assert!(validate_card(missing_subject).is_err());
    }
}
