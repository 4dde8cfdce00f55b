use common_auth::Principal;
use tracing::warn;

use crate::SecurityError;

/// Self-or-admin rule for acting on a user-scoped resource.
pub fn ensure_owner_or_admin(principal: &Principal, target_user_id: i64) -> Result<(), SecurityError> {
    if principal.id == target_user_id || principal.role.is_admin() { return Ok(()); }
    warn!(user_id = principal.id, target_user_id, "ownership_check_failed");
    Err(SecurityError::NotOwner)
}
