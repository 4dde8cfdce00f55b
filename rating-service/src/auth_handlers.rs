use axum::{extract::State, http::StatusCode, Json};
use chrono::SecondsFormat;
use common_auth::{AuthContext, Principal, Role, TokenSigner};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::extract::JsonBody;
use crate::passwords::{hash_password, verify_password};
use crate::repository::{NewUserRecord, PublicUser, Repository, RepositoryError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: String,
    pub user: LoginUser,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Creates a user with a role fixed by the caller, never by the request body.
pub async fn register(
    repo: &dyn Repository,
    request: SignupRequest,
    role: Role,
) -> ServiceResult<PublicUser> {
    let SignupRequest {
        name,
        email,
        password,
        address,
    } = request;

    let name = required(name, "invalid_name", "Name is required")?;
    let email = required(email, "invalid_email", "Email is required")?;

    let existing = repo
        .find_user_by_email(&email)
        .await
        .map_err(ServiceError::storage("Failed to register user"))?;
    if existing.is_some() {
        return Err(ServiceError::EmailTaken);
    }

    let password_digest =
        hash_password(&password).map_err(ServiceError::hashing("Failed to register user"))?;

    let user = repo
        .create_user(NewUserRecord {
            name,
            email,
            password_digest,
            address: address.filter(|value| !value.trim().is_empty()),
            role,
        })
        .await
        .map_err(|err| match err {
            RepositoryError::UniqueViolation { .. } => ServiceError::EmailTaken,
            other => ServiceError::storage("Failed to register user")(other),
        })?;

    info!(user_id = user.id, role = %user.role, "registered user");
    Ok(user.into())
}

/// Unknown email and wrong password fail identically.
pub async fn login(
    repo: &dyn Repository,
    signer: &TokenSigner,
    request: LoginRequest,
) -> ServiceResult<LoginResponse> {
    let user = repo
        .find_user_by_email(request.email.trim())
        .await
        .map_err(ServiceError::storage("Login failed"))?
        .ok_or(ServiceError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_digest) {
        return Err(ServiceError::InvalidCredentials);
    }

    let principal = Principal::new(user.id, user.role, user.email.clone());
    let issued = signer
        .issue(&principal)
        .map_err(|source| ServiceError::TokenIssue {
            context: "Login failed",
            source,
        })?;

    Ok(LoginResponse {
        token: issued.token,
        token_type: issued.token_type,
        expires_at: issued
            .expires_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        user: LoginUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    })
}

/// Changes the caller's own password. The existing token stays valid.
pub async fn update_password(
    repo: &dyn Repository,
    principal: &Principal,
    request: UpdatePasswordRequest,
) -> ServiceResult<()> {
    let (email, current_password, new_password) = match (
        non_blank(request.email),
        non_blank_secret(request.current_password),
        non_blank_secret(request.new_password),
    ) {
        (Some(email), Some(current), Some(new)) => (email, current, new),
        _ => {
            return Err(ServiceError::validation(
                "missing_fields",
                "Email, current password, and new password are required",
            ))
        }
    };

    let user = repo
        .find_user_by_id(principal.id)
        .await
        .map_err(ServiceError::storage("Failed to update password"))?
        .ok_or(ServiceError::not_found("user_not_found", "User not found"))?;

    if user.email != email {
        return Err(ServiceError::EmailMismatch);
    }

    if !verify_password(&current_password, &user.password_digest) {
        return Err(ServiceError::IncorrectPassword);
    }

    let digest = hash_password(&new_password)
        .map_err(ServiceError::hashing("Failed to update password"))?;
    let updated = repo
        .update_password(user.id, &digest)
        .await
        .map_err(ServiceError::storage("Failed to update password"))?;
    if !updated {
        return Err(ServiceError::not_found("user_not_found", "User not found"));
    }

    info!(user_id = user.id, "password updated");
    Ok(())
}

fn required(value: String, code: &'static str, message: &'static str) -> ServiceResult<String> {
    non_blank(Some(value)).ok_or_else(|| ServiceError::validation(code, message))
}

/// Emails and names are stored trimmed.
fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Passwords are checked for blankness but kept exactly as typed.
fn non_blank_secret(value: Option<String>) -> Option<String> {
    value.filter(|secret| !secret.trim().is_empty())
}

pub async fn signup_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignupRequest>,
) -> ServiceResult<(StatusCode, Json<PublicUser>)> {
    let user = register(state.repo.as_ref(), request, Role::User).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn signup_store_owner(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignupRequest>,
) -> ServiceResult<(StatusCode, Json<PublicUser>)> {
    let user = register(state.repo.as_ref(), request, Role::StoreOwner).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn signup_admin(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignupRequest>,
) -> ServiceResult<(StatusCode, Json<PublicUser>)> {
    let user = register(state.repo.as_ref(), request, Role::Admin).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ServiceResult<Json<LoginResponse>> {
    match login(state.repo.as_ref(), &state.token_signer, request).await {
        Ok(response) => {
            state.metrics.login_attempt("success");
            Ok(Json(response))
        }
        Err(err) => {
            let outcome = match err {
                ServiceError::InvalidCredentials => "invalid_credentials",
                _ => "error",
            };
            state.metrics.login_attempt(outcome);
            Err(err)
        }
    }
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthContext,
    JsonBody(request): JsonBody<UpdatePasswordRequest>,
) -> ServiceResult<Json<MessageResponse>> {
    update_password(state.repo.as_ref(), &auth.principal(), request).await?;
    Ok(MessageResponse::new("Password updated successfully"))
}

pub async fn protected(auth: AuthContext) -> Json<MessageResponse> {
    MessageResponse::new(format!("Hello {}, you are authorized!", auth.claims.email))
}
