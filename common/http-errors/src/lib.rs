use std::borrow::Cow;

use axum::{http::{StatusCode, HeaderValue}, response::{IntoResponse, Response}, Json};
use serde::Serialize;

pub const ERROR_CODE_HEADER: &str = "X-Error-Code";

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: Cow<'static, str>,
}

/// Client-facing error envelope. Internal failures carry only a fixed message;
/// the underlying cause is logged by the caller before conversion.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized { code: &'static str, message: Cow<'static, str> },
    Forbidden { code: &'static str, message: Cow<'static, str> },
    BadRequest { code: &'static str, message: Cow<'static, str> },
    NotFound { code: &'static str, message: Cow<'static, str> },
    Internal { message: Cow<'static, str> },
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self { Self::BadRequest { code, message: message.into() } }
    pub fn forbidden(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self { Self::Forbidden { code, message: message.into() } }
    pub fn unauthorized(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self { Self::Unauthorized { code, message: message.into() } }
    pub fn not_found(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self { Self::NotFound { code, message: message.into() } }
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self { Self::Internal { message: message.into() } }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized { code, .. }
            | ApiError::Forbidden { code, .. }
            | ApiError::BadRequest { code, .. }
            | ApiError::NotFound { code, .. } => *code,
            ApiError::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match self {
            ApiError::Unauthorized { message, .. }
            | ApiError::Forbidden { message, .. }
            | ApiError::BadRequest { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Internal { message } => message,
        };
        let mut resp = (status, Json(ErrorBody { code, message })).into_response();
        if let Ok(val) = HeaderValue::from_str(code) {
            resp.headers_mut().insert(ERROR_CODE_HEADER, val);
        }
        resp
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
