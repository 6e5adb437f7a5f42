//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from quiz-core
pub use quiz_core::{Card, SessionConfig, SessionStatus, SessionSummary, Verdict};

// === Database Entity Types ===

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Subject grouping cards
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Card stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject_id: Uuid,
    pub title: String,
    pub content: String,
    pub difficulty: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbCard {
    /// Convert to the card type used by quiz sessions
    pub fn to_core_card(&self) -> Card {
        Card {
            id: self.id,
            subject_id: self.subject_id,
            title: self.title.clone(),
            content: self.content.clone(),
            difficulty: self.difficulty.clamp(1, 5) as u8,
        }
    }
}

/// Card joined with its subject name, for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CardWithSubject {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject_id: Uuid,
    pub subject_name: String,
    pub title: String,
    pub content: String,
    pub difficulty: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregated per-user game statistics
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserStats {
    pub user_id: Uuid,
    pub total_games: i32,
    pub total_correct: i32,
    pub total_wrong: i32,
    pub best_streak: i32,
    pub total_score: i32,
    pub updated_at: DateTime<Utc>,
}

impl UserStats {
    /// Zeroed stats for a user who never finished a game
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            total_games: 0,
            total_correct: 0,
            total_wrong: 0,
            best_streak: 0,
            total_score: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Ranking row (stats joined with the user's email)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RankingRow {
    pub user_id: Uuid,
    pub email: String,
    pub total_games: i32,
    pub total_correct: i32,
    pub total_wrong: i32,
    pub best_streak: i32,
    pub total_score: i32,
    pub updated_at: DateTime<Utc>,
}

/// Finished game stored in `game_sessions`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GameRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject_id: Option<Uuid>,
    pub total_cards: i32,
    pub time_per_card: Option<i32>,
    pub score: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub completed_at: DateTime<Utc>,
}

/// Fraction of answered cards that were correct, 0 when nothing was answered.
pub fn accuracy(correct: i32, wrong: i32) -> f64 {
    let answered = correct + wrong;
    if answered <= 0 {
        return 0.0;
    }
    f64::from(correct) / f64::from(answered)
}

/// Mean score per finished game, 0 when no game was played.
pub fn average_score(total_score: i32, total_games: i32) -> f64 {
    if total_games <= 0 {
        return 0.0;
    }
    f64::from(total_score) / f64::from(total_games)
}

// === API Request/Response Types ===

// Auth types
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
}

// Subject types
#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

// Card types
#[derive(Debug, Serialize, Deserialize)]
pub struct CardListQuery {
    pub subject_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CardRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub difficulty: Option<i32>,
    pub subject_id: Option<Uuid>,
}

/// Validated card fields ready for insert/update
#[derive(Debug, Clone)]
pub struct NewCard {
    pub title: String,
    pub content: String,
    pub difficulty: i32,
    pub subject_id: Uuid,
}

// Game types
#[derive(Debug, Serialize, Deserialize)]
pub struct StartGameRequest {
    pub total_cards: usize,
    pub time_per_card: Option<u32>,
    pub subject_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// Card prompt shown while a card is active (never includes the answer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPrompt {
    pub id: Uuid,
    pub title: String,
    pub difficulty: u8,
    pub points: u32,
}

/// Verdict plus the reference content, shown once a card is revealed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reveal {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub answer: String,
    pub reference: String,
}

/// Snapshot of an active game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub current_index: usize,
    pub total_cards: usize,
    pub score: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub time_remaining: Option<u32>,
    pub pending_answer: String,
    pub card: Option<CardPrompt>,
    pub reveal: Option<Reveal>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NextCardResponse {
    Next {
        game: GameView,
    },
    Completed {
        summary: SessionSummary,
        accuracy: f64,
        saved: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GameHistoryResponse {
    pub games: Vec<GameRecord>,
}

// Stats types
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: UserStats,
    pub email: String,
    pub accuracy: f64,
    pub average_score: f64,
}

impl StatsResponse {
    pub fn new(stats: UserStats, email: String) -> Self {
        Self {
            accuracy: accuracy(stats.total_correct, stats.total_wrong),
            average_score: average_score(stats.total_score, stats.total_games),
            stats,
            email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankingEntry {
    pub position: usize,
    #[serde(flatten)]
    pub row: RankingRow,
    pub accuracy: f64,
    pub average_score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankingsResponse {
    pub rankings: Vec<RankingEntry>,
}

impl RankingsResponse {
    /// Number rows in the order the database returned them
    pub fn from_rows(rows: Vec<RankingRow>) -> Self {
        let rankings = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| RankingEntry {
                position: i + 1,
                accuracy: accuracy(row.total_correct, row.total_wrong),
                average_score: average_score(row.total_score, row.total_games),
                row,
            })
            .collect();
        Self { rankings }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_subjects: i64,
    pub total_cards: i64,
    pub total_games: i32,
    pub total_score: i32,
}
