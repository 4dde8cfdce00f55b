use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

use crate::claims::{Claims, ClaimsRepr};
use crate::config::JwtConfig;
use crate::error::AuthResult;

/// Stateless verifier: signature, issuer and expiry are checked all-or-nothing.
#[derive(Clone)]
pub struct JwtVerifier {
    config: JwtConfig,
    decoding_key: DecodingKey,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret());
        Self {
            config,
            decoding_key,
        }
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = true;
        validation.leeway = self.config.leeway_seconds.into();

        let token_data = decode::<ClaimsRepr>(token, &self.decoding_key, &validation)?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(user_id = claims.id, role = %claims.role, "verified JWT successfully");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::Principal;
    use crate::config::TOKEN_TTL_SECONDS;
    use crate::error::AuthError;
    use crate::roles::Role;
    use crate::signer::TokenSigner;
    use chrono::{Duration, Utc};

    fn config() -> JwtConfig {
        JwtConfig::new("test-secret", "test-issuer")
    }

    #[test]
    fn verify_round_trips_issued_claims() {
        let signer = TokenSigner::new(config());
        let verifier = JwtVerifier::new(config());
        let principal = Principal::new(42, Role::StoreOwner, "owner@example.com");

        let issued = signer.issue(&principal).expect("issue token");
        let claims = verifier.verify(&issued.token).expect("verification succeeds");

        assert_eq!(claims.principal(), principal);
        assert_eq!(claims.issuer, "test-issuer");
        let lifetime = claims.expires_at - claims.issued_at.expect("iat present");
        assert_eq!(lifetime.num_seconds(), TOKEN_TTL_SECONDS);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let signer = TokenSigner::new(config());
        let verifier = JwtVerifier::new(config());
        let principal = Principal::new(1, Role::User, "user@example.com");

        let stale = Utc::now() - Duration::seconds(TOKEN_TTL_SECONDS + 60);
        let issued = signer.issue_at(&principal, stale).expect("issue token");
        let err = verifier.verify(&issued.token).expect_err("expired token");
        assert!(matches!(err, AuthError::Verification(_)));
    }

    #[test]
    fn verify_rejects_foreign_signature() {
        let signer = TokenSigner::new(JwtConfig::new("other-secret", "test-issuer"));
        let verifier = JwtVerifier::new(config());
        let principal = Principal::new(1, Role::Admin, "admin@example.com");

        let issued = signer.issue(&principal).expect("issue token");
        assert!(verifier.verify(&issued.token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let signer = TokenSigner::new(config());
        let verifier = JwtVerifier::new(config());
        let principal = Principal::new(1, Role::User, "user@example.com");

        let issued = signer.issue(&principal).expect("issue token");
        let mut parts: Vec<String> = issued.token.split('.').map(str::to_string).collect();
        parts[1].push('A');
        let tampered = parts.join(".");
        assert!(verifier.verify(&tampered).is_err());
    }

    #[test]
    fn verify_rejects_wrong_issuer() {
        let signer = TokenSigner::new(JwtConfig::new("test-secret", "someone-else"));
        let verifier = JwtVerifier::new(config());
        let principal = Principal::new(3, Role::User, "user@example.com");

        let issued = signer.issue(&principal).expect("issue token");
        assert!(verifier.verify(&issued.token).is_err());
    }

    #[test]
    fn verify_canonicalises_mixed_case_role() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let now = Utc::now();
        let repr = ClaimsRepr {
            id: 9,
            role: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            iss: "test-issuer".to_string(),
            exp: (now + Duration::minutes(5)).timestamp(),
            iat: Some(now.timestamp()),
        };
        let token = encode(&Header::default(), &repr, &EncodingKey::from_secret(b"test-secret"))
            .expect("encode");

        let claims = JwtVerifier::new(config()).verify(&token).expect("mixed case accepted");
        assert_eq!(claims.role, Role::Admin);
    }
}
