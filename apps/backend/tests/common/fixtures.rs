//! Test fixtures and factory functions for request bodies.

use serde_json::json;
use uuid::Uuid;

/// Generate a unique email to avoid collisions between test runs.
pub fn unique_email() -> String {
    format!("test_{}@example.com", &Uuid::new_v4().to_string()[..8])
}

/// Create a sign-in request body.
pub fn sign_in_request(email: &str) -> serde_json::Value {
    json!({ "email": email })
}

/// Create a subject request body.
pub fn subject_request(name: &str, description: Option<&str>) -> serde_json::Value {
    json!({ "name": name, "description": description })
}

/// Create a card request body.
pub fn card_request(
    subject_id: Uuid,
    title: &str,
    content: &str,
    difficulty: Option<i32>,
) -> serde_json::Value {
    let mut body = json!({
        "title": title,
        "content": content,
        "subject_id": subject_id,
    });
    if let Some(d) = difficulty {
        body["difficulty"] = json!(d);
    }
    body
}

/// Create a start game request body.
pub fn start_game_request(
    total_cards: usize,
    time_per_card: Option<u32>,
    subject_id: Option<Uuid>,
) -> serde_json::Value {
    json!({
        "total_cards": total_cards,
        "time_per_card": time_per_card,
        "subject_id": subject_id,
    })
}

/// Create an answer request body.
pub fn answer_request(answer: &str) -> serde_json::Value {
    json!({ "answer": answer })
}
