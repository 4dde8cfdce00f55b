use axum::{extract::State, http::StatusCode, Json};
use common_auth::Role;
use common_security::RequireRole;
use serde::Deserialize;

use crate::access::Admins;
use crate::auth_handlers::{register, MessageResponse, SignupRequest};
use crate::error::{ServiceError, ServiceResult};
use crate::extract::JsonBody;
use crate::repository::{PlatformStats, PublicUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireRole<Admins>,
) -> ServiceResult<Json<Vec<PublicUser>>> {
    let users = state
        .repo
        .list_users()
        .await
        .map_err(ServiceError::storage("Failed to fetch users"))?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

pub async fn create_user(
    State(state): State<AppState>,
    _admin: RequireRole<Admins>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> ServiceResult<(StatusCode, Json<PublicUser>)> {
    let role = match request.role.as_deref().map(str::trim) {
        None | Some("") => Role::User,
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|err| ServiceError::validation("invalid_role", err.to_string()))?,
    };

    let signup = SignupRequest {
        name: request.name,
        email: request.email,
        password: request.password,
        address: request.address,
    };
    let user = register(state.repo.as_ref(), signup, role).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn admin_probe(admin: RequireRole<Admins>) -> Json<MessageResponse> {
    MessageResponse::new(format!("Hello {}, welcome Admin!", admin.auth.claims.email))
}

pub async fn admin_stats(
    State(state): State<AppState>,
    _admin: RequireRole<Admins>,
) -> ServiceResult<Json<PlatformStats>> {
    let stats = state
        .repo
        .stats()
        .await
        .map_err(ServiceError::storage("Failed to fetch stats"))?;
    Ok(Json(stats))
}
