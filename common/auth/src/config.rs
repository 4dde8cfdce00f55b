/// Token lifetime: exactly one day from issuance.
pub const TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Runtime configuration shared by the token signer and verifier.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC secret used for HS256 signatures.
    secret: Vec<u8>,
    /// Issuer claim (iss) stamped on issue and required on verify.
    pub issuer: String,
    /// Allowable clock skew in seconds when validating exp.
    pub leeway_seconds: u32,
}

impl JwtConfig {
    /// Construct config with zero leeway so expiry is enforced to the second.
    pub fn new(secret: impl AsRef<[u8]>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            issuer: issuer.into(),
            leeway_seconds: 0,
        }
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}
