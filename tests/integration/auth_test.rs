//! Integration tests for the sign-in, refresh, and sign-out flows.

mod helpers;

use axum::http::{StatusCode, header};
use chrono::Duration;
use serde_json::json;

use folio_core::clock::Clock;
use helpers::{EMAIL, PASSWORD, TestApp};

#[tokio::test]
async fn test_signin_sets_cookie_contract() {
    let app = TestApp::new().await;
    let response = app.sign_in(EMAIL, PASSWORD, "203.0.113.1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["sessionId"].as_str().is_some());

    let access = response.set_cookie("access_token").expect("access cookie");
    assert!(access.contains("HttpOnly"));
    assert!(access.contains("Path=/"));
    assert!(access.contains("Max-Age=900"));
    assert!(access.contains("SameSite=Lax"));

    let refresh = response.set_cookie("refresh_token").expect("refresh cookie");
    assert!(refresh.contains("HttpOnly"));
    assert!(refresh.contains("Max-Age=604800"));
}

#[tokio::test]
async fn test_signin_email_is_case_insensitive() {
    let app = TestApp::new().await;
    let response = app
        .sign_in("OWNER@Example.COM", PASSWORD, "203.0.113.1")
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_email_matches_wrong_password() {
    let app = TestApp::new().await;

    let wrong = app.sign_in(EMAIL, "not the password", "203.0.113.1").await;
    let unknown = app
        .sign_in("nobody@example.com", PASSWORD, "203.0.113.2")
        .await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, unknown.body);
    assert_eq!(wrong.error(), "invalid-credentials");
}

#[tokio::test]
async fn test_malformed_body_is_rejected_before_any_lookup() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/signin",
            Some(json!({ "email": "not-an-email", "password": "" })),
            &[],
            "203.0.113.1",
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "validation-error");
    assert!(response.body["details"]["fields"]["email"].is_array());

    let missing = app
        .request(
            "POST",
            "/api/auth/signin",
            Some(json!({ "email": EMAIL })),
            &[],
            "203.0.113.1",
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.principal(EMAIL).await.failed_login_attempts, 0);
}

#[tokio::test]
async fn test_lockout_after_five_failures() {
    let app = TestApp::new().await;

    for i in 1..=5 {
        let response = app
            .sign_in(EMAIL, "wrong password", &format!("198.51.100.{i}"))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error(), "invalid-credentials");
    }
    let principal = app.principal(EMAIL).await;
    assert_eq!(principal.failed_login_attempts, 5);
    assert!(principal.is_locked(app.clock.now()));

    let locked = app.sign_in(EMAIL, PASSWORD, "198.51.100.6").await;
    assert_eq!(locked.status, StatusCode::LOCKED);
    assert_eq!(locked.error(), "account-locked");
    assert_eq!(locked.body["details"]["minutesRemaining"], 30);
    assert_eq!(app.principal(EMAIL).await.failed_login_attempts, 5);

    app.clock.advance(Duration::minutes(30));
    let unlocked = app.sign_in(EMAIL, PASSWORD, "198.51.100.7").await;
    assert_eq!(unlocked.status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_per_ip() {
    let app = TestApp::new().await;

    for _ in 0..5 {
        let response = app
            .sign_in("nobody@example.com", "whatever", "192.0.2.50")
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let limited = app.sign_in(EMAIL, PASSWORD, "192.0.2.50").await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.error(), "rate-limited");
    let retry_after: u64 = limited.headers[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0);
    assert_eq!(limited.body["details"]["retryAfter"], retry_after);

    // Another address is unaffected.
    assert_eq!(
        app.sign_in(EMAIL, PASSWORD, "192.0.2.51").await.status,
        StatusCode::OK
    );

    app.clock.advance(Duration::minutes(15));
    assert_eq!(
        app.sign_in(EMAIL, PASSWORD, "192.0.2.50").await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_rate_limit_ignores_spoofed_forwarding_headers() {
    let app = TestApp::new().await;

    let mut statuses = Vec::new();
    for i in 0..6 {
        let spoofed = format!("198.51.100.{i}");
        let response = app
            .sign_in_with_headers(
                "nobody@example.com",
                "whatever",
                "203.0.113.50",
                &[("x-forwarded-for", &spoofed), ("x-real-ip", &spoofed)],
            )
            .await;
        statuses.push(response.status);
    }

    assert_eq!(&statuses[..5], &[StatusCode::UNAUTHORIZED; 5]);
    assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_trusted_proxy_forwards_client_address() {
    let app = TestApp::with_config(|config| {
        config.server.trusted_proxies = vec!["10.0.0.1".parse().unwrap()];
    })
    .await;

    // Five failures from one client behind the proxy exhaust its window.
    for _ in 0..5 {
        let response = app
            .sign_in_with_headers(
                "nobody@example.com",
                "whatever",
                "10.0.0.1",
                &[("x-forwarded-for", "192.0.2.60")],
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
    let limited = app
        .sign_in_with_headers(EMAIL, PASSWORD, "10.0.0.1", &[("x-forwarded-for", "192.0.2.60")])
        .await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);

    // A different client through the same proxy has its own window, and the
    // session records the forwarded address.
    let other = app
        .sign_in_with_headers(EMAIL, PASSWORD, "10.0.0.1", &[("x-forwarded-for", "192.0.2.61")])
        .await;
    assert_eq!(other.status, StatusCode::OK);
    let access = other.cookie("access_token").unwrap();
    let listed = app
        .request(
            "GET",
            "/api/auth/sessions",
            None,
            &[("access_token", &access)],
            "10.0.0.1",
        )
        .await;
    assert_eq!(listed.body[0]["ipAddress"], "192.0.2.61");
}

#[tokio::test]
async fn test_refresh_rotates_session_and_cookies() {
    let app = TestApp::new().await;
    let signed_in = app.sign_in(EMAIL, PASSWORD, "203.0.113.1").await;
    let old_session = signed_in.body["sessionId"].as_str().unwrap().to_string();
    let refresh = signed_in.cookie("refresh_token").unwrap();

    let rotated = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            &[("refresh_token", &refresh)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(rotated.status, StatusCode::OK);
    let new_session = rotated.body["sessionId"].as_str().unwrap();
    assert_ne!(new_session, old_session);
    assert!(rotated.set_cookie("access_token").unwrap().contains("Max-Age=900"));
    assert!(rotated.set_cookie("refresh_token").unwrap().contains("Max-Age=604800"));

    let access = rotated.cookie("access_token").unwrap();
    let listed = app
        .request(
            "GET",
            "/api/auth/sessions",
            None,
            &[("access_token", &access)],
            "203.0.113.1",
        )
        .await;
    let ids: Vec<&str> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["sessionId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![new_session]);
}

#[tokio::test]
async fn test_refresh_replay_signs_out_everywhere() {
    let app = TestApp::new().await;
    let laptop = app.sign_in(EMAIL, PASSWORD, "203.0.113.1").await;
    let phone = app.sign_in(EMAIL, PASSWORD, "203.0.113.2").await;
    let stolen = laptop.cookie("refresh_token").unwrap();

    let first = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            &[("refresh_token", &stolen)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let replay = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            &[("refresh_token", &stolen)],
            "192.0.2.99",
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.error(), "replay-detected");
    assert!(replay.set_cookie("refresh_token").unwrap().contains("Max-Age=0"));

    for access in [
        first.cookie("access_token").unwrap(),
        phone.cookie("access_token").unwrap(),
    ] {
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
        assert_eq!(response.error(), "session-not-found");
    }
}

#[tokio::test]
async fn test_refresh_requires_a_valid_refresh_token() {
    let app = TestApp::new().await;

    let missing = app
        .request("POST", "/api/auth/refresh", None, &[], "203.0.113.1")
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error(), "no-token");

    let signed_in = app.sign_in(EMAIL, PASSWORD, "203.0.113.1").await;
    let access = signed_in.cookie("access_token").unwrap();
    let wrong_kind = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            &[("refresh_token", &access)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(wrong_kind.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_kind.error(), "invalid-token");

    let refresh = signed_in.cookie("refresh_token").unwrap();
    app.clock.advance(Duration::days(7));
    let expired = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            &[("refresh_token", &refresh)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(expired.error(), "invalid-token");
}

#[tokio::test]
async fn test_signout_always_succeeds_and_clears_cookies() {
    let app = TestApp::new().await;

    let anonymous = app
        .request("POST", "/api/auth/signout", None, &[], "203.0.113.1")
        .await;
    assert_eq!(anonymous.status, StatusCode::OK);
    assert!(anonymous.set_cookie("access_token").unwrap().contains("Max-Age=0"));
    assert!(anonymous.set_cookie("refresh_token").unwrap().contains("Max-Age=0"));

    let signed_in = app.sign_in(EMAIL, PASSWORD, "203.0.113.1").await;
    let access = signed_in.cookie("access_token").unwrap();
    let refresh = signed_in.cookie("refresh_token").unwrap();

    let out = app
        .request(
            "POST",
            "/api/auth/signout",
            None,
            &[("access_token", &access), ("refresh_token", &refresh)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(out.status, StatusCode::OK);

    // The session is gone, so the refresh token now reads as a replay.
    let after = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            &[("refresh_token", &refresh)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(after.error(), "replay-detected");
}

#[tokio::test]
async fn test_signout_with_expired_access_uses_refresh_token() {
    let app = TestApp::new().await;
    let signed_in = app.sign_in(EMAIL, PASSWORD, "203.0.113.1").await;
    let access = signed_in.cookie("access_token").unwrap();
    let refresh = signed_in.cookie("refresh_token").unwrap();

    app.clock.advance(Duration::minutes(16));
    let out = app
        .request(
            "POST",
            "/api/auth/signout",
            None,
            &[("access_token", &access), ("refresh_token", &refresh)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(out.status, StatusCode::OK);

    let remaining = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            &[("refresh_token", &refresh)],
            "203.0.113.1",
        )
        .await;
    assert_eq!(remaining.error(), "replay-detected");
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app
        .request("GET", "/api/health", None, &[], "203.0.113.1")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}
