//! Cards API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable before running.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;

use common::fixtures;
use common::TestContext;

/// Test card creation defaults difficulty to 1.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_card_default_difficulty() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user().await;
    let subject = ctx.create_subject(user_id, "Biologia").await;

    let response = server
        .post("/api/cards")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::card_request(
            subject.id,
            "Fotossíntese",
            "processo de conversão de luz em energia",
            None,
        ))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["difficulty"], 1);
    assert_eq!(body["subject_id"], subject.id.to_string());

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test out-of-range difficulty is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_card_invalid_difficulty() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user().await;
    let subject = ctx.create_subject(user_id, "Biologia").await;

    for difficulty in [0, 6] {
        let response = server
            .post("/api/cards")
            .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
            .json(&fixtures::card_request(
                subject.id,
                "Célula",
                "unidade básica da vida",
                Some(difficulty),
            ))
            .await;
        response.assert_status_bad_request();
    }

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test a card cannot be attached to another user's subject.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_card_foreign_subject() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (owner_id, _) = ctx.create_test_user().await;
    let (other_id, other_token) = ctx.create_test_user().await;
    let subject = ctx.create_subject(owner_id, "Privado").await;

    let response = server
        .post("/api/cards")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&other_token))
        .json(&fixtures::card_request(subject.id, "Título", "conteúdo", Some(2)))
        .await;

    response.assert_status_not_found();

    // Cleanup
    ctx.cleanup_user(owner_id).await;
    ctx.cleanup_user(other_id).await;
}

/// Test listing cards filtered by subject includes the subject name.
#[tokio::test]
#[ignore = "requires database"]
async fn test_list_cards_by_subject() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user().await;
    let biology = ctx.create_subject(user_id, "Biologia").await;
    let history = ctx.create_subject(user_id, "História").await;
    ctx.create_card(user_id, biology.id, "mitocôndria", 2).await;
    ctx.create_card(user_id, biology.id, "ribossomo", 3).await;
    ctx.create_card(user_id, history.id, "revolução francesa", 4).await;

    let response = server
        .get("/api/cards")
        .add_query_param("subject_id", biology.id)
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;

    response.assert_status_ok();
    let cards: serde_json::Value = response.json();
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|c| c["subject_name"] == "Biologia"));

    let response = server
        .get("/api/cards")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    let all: serde_json::Value = response.json();
    assert_eq!(all.as_array().unwrap().len(), 3);

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test updating and deleting a card.
#[tokio::test]
#[ignore = "requires database"]
async fn test_update_and_delete_card() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user().await;
    let subject = ctx.create_subject(user_id, "Geografia").await;
    let card = ctx.create_card(user_id, subject.id, "brasilia", 1).await;

    let response = server
        .patch(&format!("/api/cards/{}", card.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::card_request(
            subject.id,
            "Capital do Brasil",
            "Brasília",
            Some(3),
        ))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["content"], "Brasília");
    assert_eq!(body["difficulty"], 3);

    let response = server
        .delete(&format!("/api/cards/{}", card.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["deleted"], true);

    let response = server
        .patch(&format!("/api/cards/{}", card.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::card_request(subject.id, "x", "y", None))
        .await;
    response.assert_status_not_found();

    // Cleanup
    ctx.cleanup_user(user_id).await;
}
