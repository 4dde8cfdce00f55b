use std::marker::PhantomData;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use common_auth::{AuthContext, JwtVerifier, Principal};

use crate::roles::{ensure_role, RolePolicy};
use crate::SecurityError;

/// Runs the authentication gate, then the role policy declared by `P`.
pub struct RequireRole<P> {
    pub auth: AuthContext,
    _policy: PhantomData<fn() -> P>,
}

impl<P> RequireRole<P> {
    pub fn principal(&self) -> Principal {
        self.auth.principal()
    }
}

#[async_trait]
impl<S, P> FromRequestParts<S> for RequireRole<P>
where
    Arc<JwtVerifier>: FromRef<S>,
    S: Send + Sync,
    P: RolePolicy,
{
    type Rejection = SecurityError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        ensure_role(Some(&auth.principal()), P::ALLOWED)?;
        Ok(Self { auth, _policy: PhantomData })
    }
}
