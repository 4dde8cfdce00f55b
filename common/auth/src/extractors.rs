use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderValue};
use tracing::warn;

use crate::claims::{Claims, Principal};
use crate::error::AuthError;
use crate::verifier::JwtVerifier;

/// Authentication gate: extracts the bearer token and verifies it.
///
/// A missing header, or one that is not `Bearer <token>`, is treated as no
/// token at all (401). A token that fails verification is rejected with 403.
/// The resulting principal lives only as long as the request that produced it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    pub fn principal(&self) -> Principal {
        self.claims.principal()
    }

    pub fn user_id(&self) -> i64 {
        self.claims.id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<JwtVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<JwtVerifier>::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(parse_bearer)
            .ok_or(AuthError::MissingAuthorization)?;

        let claims = verifier.verify(&token).map_err(|err| {
            warn!(error = %err, "JWT verification error");
            err
        })?;

        Ok(Self { claims })
    }
}

fn parse_bearer(value: &HeaderValue) -> Option<String> {
    let raw = value.to_str().ok()?.trim();
    let token = raw.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token.to_owned())
}
