//! HTTP API tests
//!
//! Drive the axum router in-process with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use teller_core::adapters::InMemoryRepository;
use teller_core::api::create_router;
use teller_core::config::Config;
use teller_core::domain::HashParams;
use teller_core::services::TokenService;
use teller_core::TellerContext;

const SECRET: &str = "api-test-secret";

// ============================================================================
// Test Helpers
// ============================================================================

async fn test_app() -> (Router, Arc<TellerContext>) {
    let mut config = Config::with_secret(SECRET);
    config.hashing = HashParams::minimal();

    let ctx = TellerContext::with_repository(config, Arc::new(InMemoryRepository::new()))
        .await
        .unwrap();
    let ctx = Arc::new(ctx);
    (create_router(Arc::clone(&ctx)), ctx)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register through the API; returns (id, number, token)
async fn register(app: &Router, email: &str) -> (i64, i64, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/account",
        None,
        Some(json!({
            "first_name": "Api",
            "last_name": "User",
            "email": email,
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");

    (
        body["account"]["id"].as_i64().unwrap(),
        body["account"]["number"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

async fn balance_of(ctx: &TellerContext, number: i64) -> i64 {
    ctx.account_service
        .get_by_number(number)
        .await
        .unwrap()
        .unwrap()
        .balance
}

// ============================================================================
// Account Endpoints
// ============================================================================

#[tokio::test]
async fn test_create_account_returns_account_and_token() {
    let (app, _) = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/account",
        None,
        Some(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "password": "analytical",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["first_name"], "Ada");
    assert_eq!(body["account"]["balance"], 0);
    assert!(body["account"].get("password_hash").is_none());
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_list_accounts_hides_password_hashes() {
    let (app, _) = test_app().await;
    register(&app, "one@example.com").await;
    register(&app, "two@example.com").await;

    let (status, body) = send(&app, Method::GET, "/account", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let accounts = body.as_array().unwrap();
    assert_eq!(accounts.len(), 2);
    assert!(!body.to_string().contains("argon2"));
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let (app, _) = test_app().await;
    register(&app, "dup@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/account",
        None,
        Some(json!({
            "first_name": "Dup",
            "last_name": "User",
            "email": "dup@example.com",
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_invalid_registration_is_bad_request() {
    let (app, _) = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/account",
        None,
        Some(json!({
            "first_name": "Short",
            "last_name": "Password",
            "email": "short@example.com",
            "password": "abc",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn test_get_account_requires_token() {
    let (app, _) = test_app().await;
    let (id, number, token) = register(&app, "get@example.com").await;

    let (status, body) = send(&app, Method::GET, &format!("/account/{id}"), None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "missing-credential" }));

    let (status, body) =
        send(&app, Method::GET, &format!("/account/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["number"], number);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let (app, _) = test_app().await;
    let (_, _, token) = register(&app, "path@example.com").await;

    let (status, body) = send(&app, Method::GET, "/account/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_delete_account() {
    let (app, _) = test_app().await;
    let (id, _, token) = register(&app, "del@example.com").await;

    let (status, body) =
        send(&app, Method::DELETE, &format!("/account/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, _) =
        send(&app, Method::GET, &format!("/account/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        send(&app, Method::DELETE, &format!("/account/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login() {
    let (app, _) = test_app().await;
    let (id, _, _) = register(&app, "login@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "login@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) =
        send(&app, Method::GET, &format!("/account/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    for (email, password) in [
        ("login@example.com", "wrong-password"),
        ("nobody@example.com", "password123"),
    ] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "invalid-credentials" }));
    }
}

// ============================================================================
// Transfers
// ============================================================================

#[tokio::test]
async fn test_transfer_debits_only_the_caller() {
    let (app, ctx) = test_app().await;
    let (_, a, token_a) = register(&app, "a@example.com").await;
    let (_, b, _) = register(&app, "b@example.com").await;
    let (_, c, _) = register(&app, "c@example.com").await;
    ctx.account_service.credit(a, 100).await.unwrap();
    ctx.account_service.credit(c, 100).await.unwrap();

    // A source account in the body is ignored; the token decides
    let (status, body) = send(
        &app,
        Method::POST,
        "/transfer",
        Some(&token_a),
        Some(json!({ "from_account": c, "to_account": b, "amount": 40 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Transfer is completed" }));
    assert_eq!(balance_of(&ctx, a).await, 60);
    assert_eq!(balance_of(&ctx, b).await, 40);
    assert_eq!(balance_of(&ctx, c).await, 100);
}

#[tokio::test]
async fn test_transfer_insufficient_funds() {
    let (app, ctx) = test_app().await;
    let (_, a, token_a) = register(&app, "a@example.com").await;
    let (_, b, _) = register(&app, "b@example.com").await;
    ctx.account_service.credit(a, 60).await.unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/transfer",
        Some(&token_a),
        Some(json!({ "to_account": b, "amount": 61 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Insufficient funds"));
    assert_eq!(balance_of(&ctx, a).await, 60);
    assert_eq!(balance_of(&ctx, b).await, 0);
}

#[tokio::test]
async fn test_transfer_rejects_bad_input() {
    let (app, ctx) = test_app().await;
    let (_, a, token_a) = register(&app, "a@example.com").await;
    let (_, b, _) = register(&app, "b@example.com").await;
    ctx.account_service.credit(a, 60).await.unwrap();

    let bad_bodies = [
        json!({ "to_account": b, "amount": 0 }),
        json!({ "to_account": b, "amount": -5 }),
        json!({ "to_account": a, "amount": 5 }),
        json!({ "to_account": b, "amount": "40" }),
        json!({ "amount": 5 }),
    ];
    for body in bad_bodies {
        let (status, response) =
            send(&app, Method::POST, "/transfer", Some(&token_a), Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body} gave {response}");
        assert!(response["error"].is_string());
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/transfer",
        Some(&token_a),
        Some(json!({ "to_account": 42, "amount": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(balance_of(&ctx, a).await, 60);
}

#[tokio::test]
async fn test_malformed_json_body() {
    let (app, _) = test_app().await;
    let (_, _, token) = register(&app, "json@example.com").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/transfer")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transfer_auth_failures() {
    let (app, ctx) = test_app().await;
    let (_, a, _) = register(&app, "a@example.com").await;
    let (_, b, _) = register(&app, "b@example.com").await;
    ctx.account_service.credit(a, 100).await.unwrap();
    let body = json!({ "to_account": b, "amount": 10 });

    let (status, response) =
        send(&app, Method::POST, "/transfer", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["error"], "missing-credential");

    let (status, response) =
        send(&app, Method::POST, "/transfer", Some("not-a-token"), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["error"], "malformed-token");

    let forged = TokenService::new("someone-else", 3600).unwrap().issue(a).unwrap();
    let (status, response) =
        send(&app, Method::POST, "/transfer", Some(&forged), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["error"], "bad-signature");

    let tokens = TokenService::new(SECRET, 60).unwrap();
    let expired = tokens
        .issue_at(a, Utc::now() - Duration::seconds(3600))
        .unwrap();
    let (status, response) =
        send(&app, Method::POST, "/transfer", Some(&expired), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["error"], "expired");

    assert_eq!(balance_of(&ctx, a).await, 100);
    assert_eq!(balance_of(&ctx, b).await, 0);
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
