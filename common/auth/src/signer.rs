use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::claims::{ClaimsRepr, Principal};
use crate::config::{JwtConfig, TOKEN_TTL_SECONDS};
use crate::error::{AuthError, AuthResult};

/// Issues signed identity tokens. Holds no per-request state.
pub struct TokenSigner {
    config: JwtConfig,
    encoding_key: EncodingKey,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub token_type: &'static str,
}

impl TokenSigner {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret());
        Self {
            config,
            encoding_key,
        }
    }

    pub fn issue(&self, principal: &Principal) -> AuthResult<IssuedToken> {
        self.issue_at(principal, Utc::now())
    }

    /// Signs `{id, role, email}` with an expiry of exactly one day after `now`.
    pub fn issue_at(&self, principal: &Principal, now: DateTime<Utc>) -> AuthResult<IssuedToken> {
        let expires_at = now + Duration::seconds(TOKEN_TTL_SECONDS);
        let claims = ClaimsRepr {
            id: principal.id,
            role: principal.role.as_str().to_string(),
            email: principal.email.clone(),
            iss: self.config.issuer.clone(),
            exp: expires_at.timestamp(),
            iat: Some(now.timestamp()),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Signing(err.to_string()))?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at,
            token_type: "Bearer",
        })
    }
}
