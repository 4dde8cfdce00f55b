use common_auth::{Principal, Role};
use tracing::warn;

use crate::SecurityError;

/// Route-declared allow-list of roles.
pub trait RolePolicy {
    const ALLOWED: &'static [Role];
}

/// Permits when the principal's role is in `allowed`.
///
/// Roles are canonicalised when the token is verified, so comparing enum
/// values here is already case-insensitive with respect to the wire form.
pub fn ensure_role(principal: Option<&Principal>, allowed: &[Role]) -> Result<(), SecurityError> {
    let Some(principal) = principal else {
        return Err(SecurityError::Unauthenticated);
    };
    if allowed.contains(&principal.role) { return Ok(()); }
    warn!(user_id = principal.id, role = %principal.role, ?allowed, "role_check_failed");
    Err(SecurityError::Forbidden)
}
