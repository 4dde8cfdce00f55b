use axum::response::{IntoResponse, Response};
use common_auth::AuthError;
use common_http_errors::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("No token provided")]                    MissingToken,
    #[error("Unauthorized. No user info found")]     Unauthenticated,
    #[error("Invalid or expired token")]             InvalidToken,
    #[error("Forbidden. Insufficient permissions.")] Forbidden,
    #[error("Access denied")]                        NotOwner,
}

impl From<AuthError> for SecurityError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingAuthorization => SecurityError::MissingToken,
            _ => SecurityError::InvalidToken,
        }
    }
}

impl From<SecurityError> for ApiError {
    fn from(e: SecurityError) -> Self {
        match e {
            SecurityError::MissingToken | SecurityError::Unauthenticated => {
                ApiError::unauthorized("unauthenticated", e.to_string())
            }
            SecurityError::InvalidToken => ApiError::forbidden("invalid_token", e.to_string()),
            SecurityError::Forbidden => ApiError::forbidden("forbidden", e.to_string()),
            SecurityError::NotOwner => ApiError::forbidden("forbidden", e.to_string()),
        }
    }
}

impl IntoResponse for SecurityError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
