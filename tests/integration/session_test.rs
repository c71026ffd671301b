//! Integration tests for the request gate and session management.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Duration;

use folio_entity::user::UserRole;
use helpers::{EMAIL, PASSWORD, TestApp};

async fn signed_in(app: &TestApp, ip: &str) -> (String, String) {
    let response = app.sign_in(EMAIL, PASSWORD, ip).await;
    assert_eq!(response.status, StatusCode::OK);
    (
        response.body["sessionId"].as_str().unwrap().to_string(),
        response.cookie("access_token").unwrap(),
    )
}

async fn list_sessions(app: &TestApp, access: &str) -> helpers::TestResponse {
    app.request(
        "GET",
        "/api/auth/sessions",
        None,
        &[("access_token", access)],
        "203.0.113.1",
    )
    .await
}

#[tokio::test]
async fn test_gate_rejects_missing_and_bad_tokens() {
    let app = TestApp::new().await;

    let missing = app
        .request("GET", "/api/auth/sessions", None, &[], "203.0.113.1")
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error(), "no-token");

    let garbage = app
        .request(
            "GET",
            "/api/auth/sessions",
            None,
            &[("access_token", "not.a.jwt")],
            "203.0.113.1",
        )
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.error(), "invalid-token");
}

#[tokio::test]
async fn test_gate_accepts_bearer_header() {
    let app = TestApp::new().await;
    let (_, access) = signed_in(&app, "203.0.113.1").await;

    let req = Request::builder()
        .method("GET")
        .uri("/api/auth/sessions")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .body(Body::empty())
        .unwrap();
    let response = app.send(req).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_access_token_expires_after_fifteen_minutes() {
    let app = TestApp::new().await;
    let (_, access) = signed_in(&app, "203.0.113.1").await;

    app.clock.advance(Duration::minutes(16));
    let response = app
        .request(
            "GET",
            "/api/auth/sessions",
            None,
            &[("access_token", &access)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "invalid-token");
}

#[tokio::test]
async fn test_list_marks_current_session() {
    let app = TestApp::new().await;
    let (laptop, access) = signed_in(&app, "203.0.113.1").await;
    app.clock.advance(Duration::seconds(5));
    let (phone, _) = signed_in(&app, "203.0.113.2").await;

    let response = app
        .request(
            "GET",
            "/api/auth/sessions",
            None,
            &[("access_token", &access)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let sessions = response.body.as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    // Newest first.
    assert_eq!(sessions[0]["sessionId"], phone.as_str());
    assert_eq!(sessions[0]["isCurrent"], false);
    assert_eq!(sessions[0]["ipAddress"], "203.0.113.2");
    assert_eq!(sessions[1]["sessionId"], laptop.as_str());
    assert_eq!(sessions[1]["isCurrent"], true);
    assert_eq!(sessions[1]["userAgent"], "folio-tests/1.0");
}

#[tokio::test]
async fn test_revoke_single_session() {
    let app = TestApp::new().await;
    let (_, access) = signed_in(&app, "203.0.113.1").await;
    let (phone, phone_access) = signed_in(&app, "203.0.113.2").await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/auth/sessions?sessionId={phone}"),
            None,
            &[("access_token", &access)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["revoked"], 1);
    assert_eq!(response.body["signedOut"], false);
    assert!(response.set_cookie("access_token").is_none());

    let revoked = app
        .request(
            "GET",
            "/api/auth/sessions",
            None,
            &[("access_token", &phone_access)],
            "203.0.113.2",
        )
        .await;
    assert_eq!(revoked.error(), "session-not-found");

    let again = app
        .request(
            "DELETE",
            &format!("/api/auth/sessions?sessionId={phone}"),
            None,
            &[("access_token", &access)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cannot_revoke_another_principals_session() {
    let app = TestApp::new().await;
    app.create_user("editor@example.com", PASSWORD, UserRole::Editor)
        .await;
    let (_, owner_access) = signed_in(&app, "203.0.113.1").await;
    let editor = app
        .sign_in("editor@example.com", PASSWORD, "203.0.113.9")
        .await;
    let editor_session = editor.body["sessionId"].as_str().unwrap();

    let response = app
        .request(
            "DELETE",
            &format!("/api/auth/sessions?sessionId={editor_session}"),
            None,
            &[("access_token", &owner_access)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let editor_access = editor.cookie("access_token").unwrap();
    let still_there = app
        .request(
            "GET",
            "/api/auth/sessions",
            None,
            &[("access_token", &editor_access)],
            "203.0.113.9",
        )
        .await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_all_signs_caller_out() {
    let app = TestApp::new().await;
    let (_, access) = signed_in(&app, "203.0.113.1").await;
    signed_in(&app, "203.0.113.2").await;
    signed_in(&app, "203.0.113.3").await;

    let response = app
        .request(
            "DELETE",
            "/api/auth/sessions?all=true",
            None,
            &[("access_token", &access)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["revoked"], 3);
    assert_eq!(response.body["signedOut"], true);
    assert!(response.set_cookie("access_token").unwrap().contains("Max-Age=0"));

    let after = app
        .request(
            "GET",
            "/api/auth/sessions",
            None,
            &[("access_token", &access)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(after.error(), "session-not-found");
}

#[tokio::test]
async fn test_revoke_requires_a_selector() {
    let app = TestApp::new().await;
    let (_, access) = signed_in(&app, "203.0.113.1").await;

    let response = app
        .request(
            "DELETE",
            "/api/auth/sessions",
            None,
            &[("access_token", &access)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "validation-error");
}

#[tokio::test]
async fn test_early_activity_keeps_session_expiry() {
    let app = TestApp::new().await;
    let (_, access) = signed_in(&app, "203.0.113.1").await;
    let first = list_sessions(&app, &access).await;
    let expires = first.body[0]["expiresAt"].as_i64().unwrap();

    app.clock.advance(Duration::minutes(10));
    let later = list_sessions(&app, &access).await;
    assert_eq!(later.status, StatusCode::OK);
    assert_eq!(later.body[0]["expiresAt"].as_i64().unwrap(), expires);
}
