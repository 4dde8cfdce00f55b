pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod roles;
pub mod signer;
pub mod verifier;

pub use claims::{Claims, Principal};
pub use config::{JwtConfig, TOKEN_TTL_SECONDS};
pub use error::{AuthError, AuthResult};
pub use extractors::AuthContext;
pub use roles::{Role, UnknownRole};
pub use signer::TokenSigner;
pub use verifier::JwtVerifier;
