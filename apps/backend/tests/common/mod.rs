//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up the router against a database
//! - Helpers for creating users, subjects and cards
//! - Authentication helpers
//!
//! # Requirements
//! Tests built with `TestContext::new` need a PostgreSQL database
//! (set DATABASE_URL). `TestContext::offline` never touches the database and
//! only suits requests rejected before any query runs.

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use uuid::Uuid;

use memory_cards_backend::config::Config;
use memory_cards_backend::db::Database;
use memory_cards_backend::models::{DbCard, NewCard, Subject};
use memory_cards_backend::{router, AppState};

const OFFLINE_DATABASE_URL: &str = "postgres://localhost:1/memory_cards_offline";

/// Test context containing database connection and router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context backed by DATABASE_URL.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        Self::with_database(db, database_url)
    }

    /// Create a test context whose pool never connects.
    pub fn offline() -> Self {
        let db = Database::connect_lazy(OFFLINE_DATABASE_URL).expect("Failed to build lazy pool");
        Self::with_database(db, OFFLINE_DATABASE_URL.to_string())
    }

    fn with_database(db: Database, database_url: String) -> Self {
        let config = Config {
            database_url,
            host: "127.0.0.1".to_string(),
            port: 0,
            max_connections: 5,
            secure_cookies: false,
        };

        let state = AppState::new(db, config);
        let db = state.db.clone();
        let app = router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a user with a unique email and return its ID and session token.
    pub async fn create_test_user(&self) -> (Uuid, String) {
        let email = fixtures::unique_email();
        let user = self
            .db
            .upsert_user(&email)
            .await
            .expect("Failed to create test user");
        let token = self
            .db
            .create_auth_session(user.id)
            .await
            .expect("Failed to create session");
        (user.id, token)
    }

    /// Create a subject for a user.
    pub async fn create_subject(&self, user_id: Uuid, name: &str) -> Subject {
        self.db
            .create_subject(user_id, name, None)
            .await
            .expect("Failed to create subject")
    }

    /// Create a card for a user.
    pub async fn create_card(
        &self,
        user_id: Uuid,
        subject_id: Uuid,
        content: &str,
        difficulty: i32,
    ) -> DbCard {
        let card = NewCard {
            title: format!("Card about {}", content),
            content: content.to_string(),
            difficulty,
            subject_id,
        };
        self.db
            .create_card(user_id, &card)
            .await
            .expect("Failed to create card")
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Clean up test data for a user.
    ///
    /// Dependent rows go with the user through ON DELETE CASCADE.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}
