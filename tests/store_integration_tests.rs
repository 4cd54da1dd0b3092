//! SupabaseStore against a stubbed PostgREST endpoint.

use anyhow::Result;
use lovenote::config::StoreConfig;
use lovenote::store::{LetterStore, NewLetter, SupabaseStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> SupabaseStore {
    SupabaseStore::new(&StoreConfig {
        url: server.uri(),
        api_key: "test-key".to_string(),
        table: "user_letters".to_string(),
    })
    .expect("client builds")
}

fn record_json(view_count: i64) -> serde_json::Value {
    json!({
        "letter_id": "abc123",
        "sender_name": "Alex",
        "recipient_name": "Sam",
        "title": null,
        "message": "Hi",
        "view_count": view_count,
        "created_at": "2026-02-14T00:00:00Z"
    })
}

#[tokio::test]
async fn test_fetch_returns_matching_record() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_letters"))
        .and(query_param("letter_id", "eq.abc123"))
        .and(query_param("select", "*"))
        .and(header("apikey", "test-key"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record_json(4)])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let record = store.fetch_by_id("abc123").await?.expect("record found");

    assert_eq!(record.letter_id, "abc123");
    assert_eq!(record.sender_name.as_deref(), Some("Alex"));
    assert_eq!(record.recipient_name.as_deref(), Some("Sam"));
    assert_eq!(record.message, "Hi");
    assert_eq!(record.view_count, 4);

    Ok(())
}

#[tokio::test]
async fn test_fetch_missing_record_is_none() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_letters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    assert!(store.fetch_by_id("missing").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_fetch_server_error_is_err() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = store_for(&server);
    assert!(store.fetch_by_id("abc123").await.is_err());
}

#[tokio::test]
async fn test_fetch_encodes_identifier() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_letters"))
        .and(query_param("letter_id", "eq.a b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    assert!(store.fetch_by_id("a b").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_increment_patches_read_count_plus_one() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_letters"))
        .and(query_param("letter_id", "eq.abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record_json(7)])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/user_letters"))
        .and(query_param("letter_id", "eq.abc123"))
        .and(body_json(json!({ "view_count": 8 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.increment_view_count("abc123").await?;

    Ok(())
}

#[tokio::test]
async fn test_increment_on_missing_record_is_err() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    assert!(store.increment_view_count("gone").await.is_err());
}

#[tokio::test]
async fn test_insert_returns_stored_identifier() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/user_letters"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "letter_id": "stored123",
            "sender_name": "Alex",
            "recipient_name": "Sam",
            "message": "Hi",
            "view_count": 0
        }])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let id = store
        .insert(NewLetter {
            sender_name: "Alex".to_string(),
            recipient_name: "Sam".to_string(),
            message: "Hi".to_string(),
        })
        .await?;

    assert_eq!(id, "stored123");

    Ok(())
}

#[tokio::test]
async fn test_insert_rejection_is_err() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let result = store
        .insert(NewLetter {
            sender_name: "Alex".to_string(),
            recipient_name: "Sam".to_string(),
            message: "Hi".to_string(),
        })
        .await;

    assert!(result.is_err());
}
