#![allow(dead_code)]

use std::{env, sync::Arc};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use common_auth::{JwtConfig, Principal, Role};
use http_body_util::BodyExt;
use rating_service::repository::InMemoryRepository;
use rating_service::{build_router, AppState};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::util::ServiceExt;
use tower_http::cors::CorsLayer;

pub const TEST_SECRET: &str = "rating-test-secret";
pub const TEST_ISSUER: &str = "store-rating";
pub const PASSWORD: &str = "CorrectHorseBatteryStaple!";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn error_code(&self) -> Option<&str> {
        self.headers
            .get(common_http_errors::ERROR_CODE_HEADER)
            .and_then(|value| value.to_str().ok())
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

/// Full router over an in-memory repository.
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(
            Arc::new(InMemoryRepository::new()),
            JwtConfig::new(TEST_SECRET, TEST_ISSUER),
        )
        .expect("app state");
        let router = build_router(state.clone(), CorsLayer::new());
        Self { state, router }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    /// `kind` is the signup path suffix: `user`, `store-owner` or `admin`.
    pub async fn signup(&self, kind: &str, name: &str, email: &str) -> TestResponse {
        self.post(
            &format!("/api/auth/signup/{kind}"),
            None,
            serde_json::json!({
                "name": name,
                "email": email,
                "password": PASSWORD,
                "address": "1 Main Street",
            }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/auth/login",
            None,
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Signs up and logs in, returning the new user's id and bearer token.
    pub async fn account(&self, kind: &str, name: &str, email: &str) -> (i64, String) {
        let created = self.signup(kind, name, email).await;
        assert_eq!(created.status, StatusCode::CREATED, "signup failed: {}", created.body);
        let id = created.body["id"].as_i64().expect("user id");

        let login = self.login(email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "login failed: {}", login.body);
        let token = login.body["token"].as_str().expect("token").to_string();
        (id, token)
    }

    /// Issues a token directly, bypassing the credential store.
    pub fn token_for(&self, id: i64, role: Role, email: &str) -> String {
        self.state
            .token_signer
            .issue(&Principal::new(id, role, email))
            .expect("issue token")
            .token
    }

    pub async fn create_store(&self, token: &str, name: &str) -> i64 {
        let response = self
            .post(
                "/api/stores",
                Some(token),
                serde_json::json!({ "name": name, "email": "shop@example.com", "address": "2 High Street" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "store failed: {}", response.body);
        response.body["id"].as_i64().expect("store id")
    }
}

/// External Postgres for repository tests, selected by `RATING_TEST_DATABASE_URL`.
pub struct TestDatabase {
    pool: PgPool,
}

impl TestDatabase {
    pub async fn setup() -> Result<Option<Self>> {
        let Ok(database_url) = env::var("RATING_TEST_DATABASE_URL") else {
            eprintln!(
                "Skipping rating-service Postgres tests: set RATING_TEST_DATABASE_URL to run them."
            );
            return Ok(None);
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .context("failed to connect to RATING_TEST_DATABASE_URL")?;
        rating_service::db::run_migrations(&pool).await?;

        Ok(Some(Self { pool }))
    }

    pub fn pool_clone(&self) -> PgPool {
        self.pool.clone()
    }
}

/// Unique per test run so repeated runs against one database do not collide.
pub fn unique_email(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{prefix}-{nanos}@example.com")
}
