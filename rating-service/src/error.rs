use std::borrow::Cow;

use axum::response::{IntoResponse, Response};
use common_auth::AuthError;
use common_http_errors::ApiError;
use common_security::SecurityError;
use thiserror::Error;
use tracing::{error, warn};

use crate::passwords::PasswordError;
use crate::repository::RepositoryError;

/// Domain failures of the rating API, each with a fixed status and message.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("You already reviewed this store")]
    DuplicateRating,
    #[error("{message}")]
    NotFound {
        code: &'static str,
        message: &'static str,
    },
    #[error("{message}")]
    Validation {
        code: &'static str,
        message: Cow<'static, str>,
    },
    #[error("Email does not match logged-in user")]
    EmailMismatch,
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error(transparent)]
    Security(#[from] SecurityError),
    #[error("{context}: {source}")]
    TokenIssue {
        context: &'static str,
        #[source]
        source: AuthError,
    },
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: RepositoryError,
    },
    #[error("{context}: {source}")]
    Hashing {
        context: &'static str,
        #[source]
        source: PasswordError,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str, message: &'static str) -> Self {
        Self::NotFound { code, message }
    }

    /// Wraps an unclassified storage failure; `context` becomes the 500 message.
    pub fn storage(context: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| Self::Storage { context, source }
    }

    pub fn hashing(context: &'static str) -> impl FnOnce(PasswordError) -> Self {
        move |source| match source {
            PasswordError::Empty => Self::validation("invalid_password", source.to_string()),
            other => Self::Hashing {
                context,
                source: other,
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::EmailTaken => ApiError::bad_request("email_taken", err.to_string()),
            ServiceError::InvalidCredentials => {
                ApiError::bad_request("invalid_credentials", err.to_string())
            }
            ServiceError::DuplicateRating => {
                ApiError::bad_request("duplicate_rating", err.to_string())
            }
            ServiceError::NotFound { code, message } => ApiError::not_found(code, message),
            ServiceError::Validation { code, message } => ApiError::bad_request(code, message),
            ServiceError::EmailMismatch => ApiError::forbidden("email_mismatch", err.to_string()),
            ServiceError::IncorrectPassword => {
                ApiError::unauthorized("incorrect_password", err.to_string())
            }
            ServiceError::Security(inner) => inner.into(),
            ServiceError::TokenIssue { context, .. }
            | ServiceError::Storage { context, .. }
            | ServiceError::Hashing { context, .. } => ApiError::internal(context),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match &self {
            ServiceError::TokenIssue { .. }
            | ServiceError::Storage { .. }
            | ServiceError::Hashing { .. } => error!(error = ?self, "{}", self),
            _ => warn!(error = %self, "request rejected"),
        }
        ApiError::from(self).into_response()
    }
}

/// Parses a numeric path segment, failing with a 400 carrying `message`.
pub fn parse_id(raw: &str, message: &'static str) -> ServiceResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ServiceError::validation("invalid_id", message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(err: ServiceError) -> (StatusCode, &'static str) {
        let api = ApiError::from(err);
        (api.status(), api.code())
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(status_of(ServiceError::EmailTaken), (StatusCode::BAD_REQUEST, "email_taken"));
        assert_eq!(
            status_of(ServiceError::InvalidCredentials),
            (StatusCode::BAD_REQUEST, "invalid_credentials")
        );
        assert_eq!(
            status_of(ServiceError::DuplicateRating),
            (StatusCode::BAD_REQUEST, "duplicate_rating")
        );
        assert_eq!(status_of(ServiceError::EmailMismatch).0, StatusCode::FORBIDDEN);
        assert_eq!(status_of(ServiceError::IncorrectPassword).0, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(ServiceError::Security(SecurityError::Forbidden)).0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ServiceError::Security(SecurityError::Unauthenticated)).0,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn storage_errors_hide_the_cause() {
        let err = ServiceError::storage("Failed to create rating")(RepositoryError::InvalidRow(
            "secret detail".into(),
        ));
        match ApiError::from(err) {
            ApiError::Internal { message } => assert_eq!(message, "Failed to create rating"),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn blank_password_is_a_validation_error() {
        let err = ServiceError::hashing("Failed to register user")(PasswordError::Empty);
        assert_eq!(status_of(err), (StatusCode::BAD_REQUEST, "invalid_password"));
    }

    #[test]
    fn parse_id_rejects_non_numeric() {
        assert_eq!(parse_id("42", "Invalid store ID").expect("numeric"), 42);
        assert!(matches!(
            parse_id("abc", "Invalid store ID"),
            Err(ServiceError::Validation { code: "invalid_id", .. })
        ));
    }
}
