use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{FromRef, State},
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use common_auth::{JwtConfig, JwtVerifier, TokenSigner};
use common_http_errors::ApiError;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::error;

use crate::auth_handlers::{
    change_password, login_user, protected, signup_admin, signup_store_owner, signup_user,
};
use crate::config::AppConfig;
use crate::metrics::{track_http_errors, ApiMetrics};
use crate::rating_handlers::{
    create_rating, get_rating, list_ratings, owner_reviews, user_ratings,
};
use crate::repository::Repository;
use crate::store_handlers::{create_store, get_store, list_stores, owner_stores};
use crate::user_handlers::{admin_probe, admin_stats, create_user, list_users};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub jwt_verifier: Arc<JwtVerifier>,
    pub token_signer: Arc<TokenSigner>,
    pub metrics: Arc<ApiMetrics>,
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_verifier.clone()
    }
}

impl FromRef<AppState> for Arc<ApiMetrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

impl AppState {
    /// Signer and verifier share one secret and issuer.
    pub fn new(repo: Arc<dyn Repository>, jwt: JwtConfig) -> Result<Self> {
        let metrics = ApiMetrics::new().context("Failed to register metrics")?;
        Ok(Self {
            repo,
            jwt_verifier: Arc::new(JwtVerifier::new(jwt.clone())),
            token_signer: Arc::new(TokenSigner::new(jwt)),
            metrics: Arc::new(metrics),
        })
    }
}

pub fn cors_layer(config: &AppConfig) -> Result<CorsLayer> {
    let origins = config
        .cors_allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION]))
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/protected", get(protected))
        .route("/api/auth/signup/user", post(signup_user))
        .route("/api/auth/signup/store-owner", post(signup_store_owner))
        .route("/api/auth/signup/admin", post(signup_admin))
        .route("/api/auth/login", post(login_user))
        .route("/api/auth/update-password", put(change_password))
        .route("/api/admin", get(admin_probe))
        .route("/api/admin/stats", get(admin_stats))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/stores", post(create_store).get(list_stores))
        .route("/api/stores/owner", get(owner_stores))
        .route("/api/stores/:id", get(get_store))
        .route("/api/ratings", post(create_rating).get(list_ratings))
        .route("/api/ratings/user/:id", get(user_ratings))
        .route("/api/ratings/owner", get(owner_reviews))
        .route("/api/ratings/:id", get(get_rating))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_http_errors,
        ))
        .with_state(state)
        .layer(cors)
}

async fn root() -> &'static str {
    "Hello world"
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_endpoint(State(metrics): State<Arc<ApiMetrics>>) -> Response {
    match metrics.render() {
        Ok(response) => response,
        Err(err) => {
            error!(error = ?err, "Failed to encode metrics");
            ApiError::internal("Failed to encode metrics").into_response()
        }
    }
}
