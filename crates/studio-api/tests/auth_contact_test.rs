//! Login and contact form integration tests.
//!
//! Run with: `cargo test -p studio-api --test auth_contact_test -- --ignored`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum::http::StatusCode;
use helpers::{setup_test_app, TEST_ADMIN_PASSWORD, TEST_ADMIN_USERNAME};
use serde_json::{json, Value};

async fn login(app: &helpers::TestApp) -> String {
    let response = app
        .client()
        .post("/api/auth/login")
        .json(&json!({
            "username": TEST_ADMIN_USERNAME,
            "password": TEST_ADMIN_PASSWORD
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_login_with_seeded_admin() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/auth/login")
        .json(&json!({
            "username": TEST_ADMIN_USERNAME,
            "password": TEST_ADMIN_PASSWORD
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["admin"]["username"], TEST_ADMIN_USERNAME);
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);

    // The issued token opens admin routes
    let token = body["token"].as_str().unwrap();
    let messages = app
        .client()
        .get("/api/contact")
        .authorization_bearer(token)
        .await;
    assert_eq!(messages.status_code(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_login_rejects_bad_credentials() {
    let app = setup_test_app().await;

    for (username, password) in [
        (TEST_ADMIN_USERNAME, "wrong-password"),
        ("nobody", TEST_ADMIN_PASSWORD),
    ] {
        let response = app
            .client()
            .post("/api/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid credentials");
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_contact_message_lifecycle() {
    let app = setup_test_app().await;
    let token = login(&app).await;

    let created = app
        .client()
        .post("/api/contact")
        .json(&json!({
            "name": "Ana Torres",
            "email": "ana@example.com",
            "phone": "  ",
            "subject": "Vivienda unifamiliar",
            "message": "Quisiera agendar una reunión."
        }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let id = created.json::<Value>()["id"].as_str().unwrap().to_string();

    let list: Value = app
        .client()
        .get("/api/contact")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["is_read"], false);
    assert!(list[0]["phone"].is_null());

    let read = app
        .client()
        .put(&format!("/api/contact/{id}/read"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(read.status_code(), StatusCode::OK);

    let list: Value = app
        .client()
        .get("/api/contact")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(list[0]["is_read"], true);

    let deleted = app
        .client()
        .delete(&format!("/api/contact/{id}"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);

    let again = app
        .client()
        .delete(&format!("/api/contact/{id}"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_health_with_database() {
    let app = setup_test_app().await;

    let body: Value = app.client().get("/health").await.json();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "healthy");
}
