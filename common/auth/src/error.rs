use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingAuthorization,
    #[error("token verification failed: {0}")]
    Verification(String),
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl AuthError {
    /// Status and machine code for the failure class.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::MissingAuthorization => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AuthError::Verification(_) | AuthError::InvalidClaim(_, _) => {
                (StatusCode::FORBIDDEN, "invalid_token")
            }
            AuthError::Signing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "token_issue"),
        }
    }

    /// Message safe to hand back to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "No token provided",
            AuthError::Verification(_) | AuthError::InvalidClaim(_, _) => {
                "Invalid or expired token"
            }
            AuthError::Signing(_) => "Unable to issue authentication token",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            code,
            message: self.public_message(),
        };
        let mut resp = (status, Json(body)).into_response();
        resp.headers_mut()
            .insert("X-Error-Code", HeaderValue::from_static(code));
        resp
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Verification(value.to_string())
    }
}
