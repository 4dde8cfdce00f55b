use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};
use crate::roles::Role;

/// The authenticated identity attached to a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
    pub email: String,
}

impl Principal {
    pub fn new(id: i64, role: Role, email: impl Into<String>) -> Self {
        Self {
            id,
            role,
            email: email.into(),
        }
    }
}

/// Application-focused representation of verified JWT claims.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    pub id: i64,
    pub role: Role,
    pub email: String,
    pub issuer: String,
    pub expires_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl Claims {
    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.role, self.email.clone())
    }
}

/// Wire shape of the token payload, shared by the signer and the verifier.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ClaimsRepr {
    pub id: i64,
    pub role: String,
    pub email: String,
    pub iss: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = AuthError;

    fn try_from(value: ClaimsRepr) -> AuthResult<Self> {
        let role = value
            .role
            .parse::<Role>()
            .map_err(|_| AuthError::InvalidClaim("role", value.role.clone()))?;

        let expires_at = Utc
            .timestamp_opt(value.exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("exp", value.exp.to_string()))?;

        let issued_at = match value.iat {
            Some(iat) => Some(
                Utc.timestamp_opt(iat, 0)
                    .single()
                    .ok_or_else(|| AuthError::InvalidClaim("iat", iat.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            id: value.id,
            role,
            email: value.email,
            issuer: value.iss,
            expires_at,
            issued_at,
        })
    }
}
