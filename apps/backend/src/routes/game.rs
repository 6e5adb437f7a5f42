//! Quiz game endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::game::AdvanceOutcome;
use crate::AppState;

const HISTORY_LIMIT: i64 = 20;
const SAVE_FAILED_WARNING: &str = "results may not be saved";

/// Longest answer or draft accepted, in characters.
pub const MAX_ANSWER_CHARS: usize = 2_000;

/// Build and validate the session config of a start request
pub fn game_config(request: &StartGameRequest) -> Result<SessionConfig> {
    let mut config = SessionConfig::new(request.total_cards);
    config.time_per_card = request.time_per_card;
    config.subject_filter = request.subject_id;
    config.validate()?;

    if let Some(seconds) = config.time_per_card {
        if i32::try_from(seconds).is_err() {
            return Err(ApiError::BadRequest(format!(
                "time_per_card is too large: {}",
                seconds
            )));
        }
    }

    Ok(config)
}

/// Reject answers too long to score
pub fn check_answer_length(answer: &str) -> Result<()> {
    if answer.chars().count() > MAX_ANSWER_CHARS {
        return Err(ApiError::BadRequest(format!(
            "answer must be at most {} characters",
            MAX_ANSWER_CHARS
        )));
    }
    Ok(())
}

/// Persist a finished game. A failed write still returns the summary,
/// flagged as unsaved.
pub async fn finish_game(
    db: &Database,
    user_id: Uuid,
    session_id: Uuid,
    summary: SessionSummary,
    config: &SessionConfig,
) -> NextCardResponse {
    let saved = match db.record_result(user_id, &summary, config).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to record game {}: {}", session_id, e);
            false
        }
    };

    NextCardResponse::Completed {
        accuracy: accuracy(summary.correct_count as i32, summary.wrong_count as i32),
        summary,
        saved,
        warning: (!saved).then(|| SAVE_FAILED_WARNING.to_string()),
    }
}

/// POST /api/game/start
/// Draws random cards and starts a session
pub async fn start(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<StartGameRequest>,
) -> Result<Json<GameView>> {
    let config = game_config(&request)?;

    let limit = i64::try_from(config.total_cards).unwrap_or(i64::MAX);
    let cards = state
        .db
        .list_game_cards(auth.user_id, config.subject_filter, limit)
        .await?
        .iter()
        .map(DbCard::to_core_card)
        .collect();

    let view = state.games.start(auth.user_id, cards, config).await?;
    Ok(Json(view))
}

/// GET /api/game/{id}
pub async fn show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GameView>> {
    let view = state.games.view(auth.user_id, session_id).await?;
    Ok(Json(view))
}

/// PUT /api/game/{id}/draft
pub async fn draft(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<GameView>> {
    check_answer_length(&request.answer)?;
    let view = state
        .games
        .update_draft(auth.user_id, session_id, &request.answer)
        .await?;
    Ok(Json(view))
}

/// POST /api/game/{id}/answer
pub async fn answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<GameView>> {
    check_answer_length(&request.answer)?;
    let view = state
        .games
        .submit(auth.user_id, session_id, &request.answer)
        .await?;
    Ok(Json(view))
}

/// POST /api/game/{id}/next
/// Moves to the next card; on the last card records the result
pub async fn next(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<NextCardResponse>> {
    let response = match state.games.advance(auth.user_id, session_id).await? {
        AdvanceOutcome::Next(game) => NextCardResponse::Next { game },
        AdvanceOutcome::Completed { summary, config } => {
            finish_game(&state.db, auth.user_id, session_id, summary, &config).await
        }
    };

    Ok(Json(response))
}

/// DELETE /api/game/{id}
pub async fn abandon(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    state.games.abandon(auth.user_id, session_id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// GET /api/game/history
pub async fn history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<GameHistoryResponse>> {
    let games = state.db.get_recent_games(auth.user_id, HISTORY_LIMIT).await?;
    Ok(Json(GameHistoryResponse { games }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_request(total_cards: usize, time_per_card: Option<u32>) -> StartGameRequest {
        StartGameRequest {
            total_cards,
            time_per_card,
            subject_id: None,
        }
    }

    #[test]
    fn test_answer_length_limit() {
        assert!(check_answer_length("mitocôndria").is_ok());
        assert!(check_answer_length(&"ç".repeat(MAX_ANSWER_CHARS)).is_ok());
        assert!(matches!(
            check_answer_length(&"a".repeat(MAX_ANSWER_CHARS + 1)),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_game_config() {
        let config = game_config(&start_request(10, Some(30))).unwrap();
        assert_eq!(config.total_cards, 10);
        assert_eq!(config.time_per_card, Some(30));

        assert!(matches!(
            game_config(&start_request(0, None)),
            Err(ApiError::Session(_))
        ));
        assert!(matches!(
            game_config(&start_request(5, Some(u32::MAX))),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_finish_game_reports_unsaved_results() {
        let db = Database::connect_lazy("postgres://localhost:1/memory_cards_unreachable").unwrap();
        let summary = SessionSummary {
            score: 30,
            correct_count: 2,
            wrong_count: 1,
            total_cards: 3,
        };

        let response = finish_game(
            &db,
            Uuid::new_v4(),
            Uuid::new_v4(),
            summary,
            &SessionConfig::new(3),
        )
        .await;

        match response {
            NextCardResponse::Completed {
                summary: returned,
                saved,
                warning,
                ..
            } => {
                assert_eq!(returned, summary);
                assert!(!saved);
                assert_eq!(warning.as_deref(), Some("results may not be saved"));
            }
            other => panic!("expected a completed outcome, got {:?}", other),
        }
    }
}
