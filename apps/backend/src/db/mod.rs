//! PostgreSQL database operations

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

const LAZY_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that only connects on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(LAZY_ACQUIRE_TIMEOUT)
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Find or create a user by email, making sure a stats row exists
    pub async fn upsert_user(&self, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, email, created_at
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_stats (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Issue a new session token for a user
    pub async fn create_auth_session(&self, user_id: Uuid) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (token, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(&token)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    /// Resolve a session token to its user, refreshing last_seen_at
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE auth_sessions s
            SET last_seen_at = NOW()
            FROM users u
            WHERE s.token = $1 AND u.id = s.user_id
            RETURNING u.id, u.email, u.created_at
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Delete a session token
    pub async fn delete_auth_session(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Subject Repository ===

    /// List a user's subjects, newest first
    pub async fn list_subjects(&self, user_id: Uuid) -> Result<Vec<Subject>> {
        let subjects = sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, user_id, name, description, created_at, updated_at
            FROM subjects
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subjects)
    }

    /// Create a subject
    pub async fn create_subject(
        &self,
        user_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Subject> {
        let subject = sqlx::query_as::<_, Subject>(
            r#"
            INSERT INTO subjects (name, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, description, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(subject)
    }

    /// Update a subject owned by the user
    pub async fn update_subject(
        &self,
        user_id: Uuid,
        subject_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<Subject>> {
        let subject = sqlx::query_as::<_, Subject>(
            r#"
            UPDATE subjects
            SET name = $1, description = $2, updated_at = NOW()
            WHERE id = $3 AND user_id = $4
            RETURNING id, user_id, name, description, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(subject_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subject)
    }

    /// Delete a subject (and, by cascade, its cards)
    pub async fn delete_subject(&self, user_id: Uuid, subject_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1 AND user_id = $2")
            .bind(subject_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the subject exists and belongs to the user
    pub async fn subject_belongs_to(&self, user_id: Uuid, subject_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1 AND user_id = $2)",
        )
        .bind(subject_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // === Card Repository ===

    /// List a user's cards with subject names, optionally filtered by subject
    pub async fn list_cards(
        &self,
        user_id: Uuid,
        subject_id: Option<Uuid>,
    ) -> Result<Vec<CardWithSubject>> {
        let cards = sqlx::query_as::<_, CardWithSubject>(
            r#"
            SELECT c.id, c.user_id, c.subject_id, s.name AS subject_name,
                   c.title, c.content, c.difficulty, c.created_at, c.updated_at
            FROM cards c
            JOIN subjects s ON s.id = c.subject_id
            WHERE c.user_id = $1 AND ($2::uuid IS NULL OR c.subject_id = $2)
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    /// Create a card
    pub async fn create_card(&self, user_id: Uuid, card: &NewCard) -> Result<DbCard> {
        let card = sqlx::query_as::<_, DbCard>(
            r#"
            INSERT INTO cards (title, content, difficulty, subject_id, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, subject_id, title, content, difficulty, created_at, updated_at
            "#,
        )
        .bind(&card.title)
        .bind(&card.content)
        .bind(card.difficulty)
        .bind(card.subject_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(card)
    }

    /// Update a card owned by the user
    pub async fn update_card(
        &self,
        user_id: Uuid,
        card_id: Uuid,
        card: &NewCard,
    ) -> Result<Option<DbCard>> {
        let card = sqlx::query_as::<_, DbCard>(
            r#"
            UPDATE cards
            SET title = $1, content = $2, difficulty = $3, subject_id = $4, updated_at = NOW()
            WHERE id = $5 AND user_id = $6
            RETURNING id, user_id, subject_id, title, content, difficulty, created_at, updated_at
            "#,
        )
        .bind(&card.title)
        .bind(&card.content)
        .bind(card.difficulty)
        .bind(card.subject_id)
        .bind(card_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    /// Delete a card owned by the user
    pub async fn delete_card(&self, user_id: Uuid, card_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1 AND user_id = $2")
            .bind(card_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Draw up to `limit` random cards for a game
    pub async fn list_game_cards(
        &self,
        user_id: Uuid,
        subject_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<DbCard>> {
        let cards = sqlx::query_as::<_, DbCard>(
            r#"
            SELECT id, user_id, subject_id, title, content, difficulty, created_at, updated_at
            FROM cards
            WHERE user_id = $1 AND ($2::uuid IS NULL OR subject_id = $2)
            ORDER BY random()
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(subject_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    // === Results & Stats Repository ===

    /// Store a finished game and fold it into the user's aggregated stats.
    /// A subject deleted mid-game is recorded as NULL.
    pub async fn record_result(
        &self,
        user_id: Uuid,
        summary: &SessionSummary,
        config: &SessionConfig,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO game_sessions (user_id, subject_id, total_cards, time_per_card,
                                       score, correct_answers, wrong_answers, completed, completed_at)
            VALUES ($1, (SELECT id FROM subjects WHERE id = $2), $3, $4, $5, $6, $7, TRUE, NOW())
            "#,
        )
        .bind(user_id)
        .bind(config.subject_filter)
        .bind(to_i32(summary.total_cards))
        .bind(config.time_per_card.map(to_i32))
        .bind(to_i32(summary.score))
        .bind(to_i32(summary.correct_count))
        .bind(to_i32(summary.wrong_count))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_stats (user_id, total_games, total_correct, total_wrong,
                                    best_streak, total_score, updated_at)
            VALUES ($1, 1, $2, $3, $2, $4, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                total_games = user_stats.total_games + 1,
                total_correct = user_stats.total_correct + EXCLUDED.total_correct,
                total_wrong = user_stats.total_wrong + EXCLUDED.total_wrong,
                best_streak = GREATEST(user_stats.best_streak, EXCLUDED.best_streak),
                total_score = user_stats.total_score + EXCLUDED.total_score,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(to_i32(summary.correct_count))
        .bind(to_i32(summary.wrong_count))
        .bind(to_i32(summary.score))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get a user's aggregated stats
    pub async fn get_user_stats(&self, user_id: Uuid) -> Result<Option<UserStats>> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            SELECT user_id, total_games, total_correct, total_wrong,
                   best_streak, total_score, updated_at
            FROM user_stats
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Top users by total score
    pub async fn get_rankings(&self, limit: i64) -> Result<Vec<RankingRow>> {
        let rows = sqlx::query_as::<_, RankingRow>(
            r#"
            SELECT us.user_id, u.email, us.total_games, us.total_correct, us.total_wrong,
                   us.best_streak, us.total_score, us.updated_at
            FROM user_stats us
            JOIN users u ON u.id = us.user_id
            ORDER BY us.total_score DESC, us.updated_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Most recent finished games of a user
    pub async fn get_recent_games(&self, user_id: Uuid, limit: i64) -> Result<Vec<GameRecord>> {
        let games = sqlx::query_as::<_, GameRecord>(
            r#"
            SELECT id, user_id, subject_id, total_cards, time_per_card,
                   score, correct_answers, wrong_answers, completed_at
            FROM game_sessions
            WHERE user_id = $1 AND completed
            ORDER BY completed_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }

    /// Counts shown on the dashboard
    pub async fn get_dashboard(&self, user_id: Uuid) -> Result<DashboardResponse> {
        let total_subjects: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subjects WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let total_cards: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cards WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let stats = self
            .get_user_stats(user_id)
            .await?
            .unwrap_or_else(|| UserStats::empty(user_id));

        Ok(DashboardResponse {
            total_subjects,
            total_cards,
            total_games: stats.total_games,
            total_score: stats.total_score,
        })
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
