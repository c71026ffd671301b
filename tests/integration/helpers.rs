//! Shared test helpers for integration tests.
//!
//! Every `TestApp` runs the full router against the in-memory credential
//! store and session store, driven by a `ManualClock`.

#![allow(dead_code)]

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use folio_auth::PasswordHasher;
use folio_cache::CacheManager;
use folio_core::clock::ManualClock;
use folio_core::config::{AppConfig, PasswordHashConfig};
use folio_database::{CredentialStore, MemoryCredentialStore};
use folio_entity::user::{NewPrincipal, Principal, UserRole};

pub const EMAIL: &str = "owner@example.com";
pub const PASSWORD: &str = "correct horse battery staple";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Credential store behind the router
    pub credentials: Arc<MemoryCredentialStore>,
    /// Clock shared by every component
    pub clock: Arc<ManualClock>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application with one admin principal.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Like [`TestApp::new`], with `configure` applied to the config first.
    pub async fn with_config(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.cache.provider = "memory".to_string();
        config.auth.password_hash = PasswordHashConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        };
        configure(&mut config);

        let clock = Arc::new(ManualClock::starting_now());
        let cache = Arc::new(
            CacheManager::new(&config.cache, clock.clone())
                .await
                .expect("Failed to init cache"),
        );
        let credentials = Arc::new(MemoryCredentialStore::new());

        let state = folio_api::build_state(
            Arc::new(config.clone()),
            credentials.clone(),
            cache,
            clock.clone(),
        )
        .expect("Failed to build state");

        let app = Self {
            router: folio_api::build_app(state),
            credentials,
            clock,
            config,
        };
        app.create_user(EMAIL, PASSWORD, UserRole::Admin).await;
        app
    }

    /// Insert a principal directly into the credential store.
    pub async fn create_user(&self, email: &str, password: &str, role: UserRole) -> Principal {
        let hasher = PasswordHasher::new(&self.config.auth.password_hash).expect("hasher");
        self.credentials
            .create(NewPrincipal {
                email: email.to_string(),
                password_hash: hasher.hash_password(password).expect("hash"),
                role,
            })
            .await
            .expect("Failed to create user")
    }

    /// Current state of a principal.
    pub async fn principal(&self, email: &str) -> Principal {
        self.credentials
            .find_by_email(email)
            .await
            .expect("lookup")
            .expect("principal exists")
    }

    /// Send a request from socket peer `ip`, with optional JSON body and
    /// cookies.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        cookies: &[(&str, &str)],
        ip: &str,
    ) -> TestResponse {
        self.request_with_headers(method, path, body, cookies, ip, &[])
            .await
    }

    /// [`TestApp::request`] with extra request headers.
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        cookies: &[(&str, &str)],
        ip: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let peer: IpAddr = ip.parse().expect("peer address");
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::USER_AGENT, "folio-tests/1.0")
            .extension(ConnectInfo(SocketAddr::new(peer, 40_000)));

        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        if !cookies.is_empty() {
            let cookie = cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            req = req.header(header::COOKIE, cookie);
        }

        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a prepared request.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sign in as `email` from `ip`, adding `headers`.
    pub async fn sign_in_with_headers(
        &self,
        email: &str,
        password: &str,
        ip: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        self.request_with_headers(
            "POST",
            "/api/auth/signin",
            Some(serde_json::json!({ "email": email, "password": password })),
            &[],
            ip,
            headers,
        )
        .await
    }

    /// Sign in as `email` from `ip`.
    pub async fn sign_in(&self, email: &str, password: &str, ip: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/auth/signin",
            Some(serde_json::json!({ "email": email, "password": password })),
            &[],
            ip,
        )
        .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The full `Set-Cookie` header for `name`.
    pub fn set_cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{name}=")))
            .map(str::to_string)
    }

    /// The value set for cookie `name`.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.set_cookie(name)?;
        let pair = header.split(';').next()?;
        pair.split_once('=').map(|(_, v)| v.to_string())
    }

    /// The error code of a failed response.
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
