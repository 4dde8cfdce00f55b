//! Allow-lists declared by the protected routes.

use common_auth::Role;
use common_security::RolePolicy;

/// Only normal users may rate stores or read their own ratings.
pub struct Raters;

impl RolePolicy for Raters {
    const ALLOWED: &'static [Role] = &[Role::User];
}

/// Store creation and "my stores" listing.
pub struct StoreManagers;

impl RolePolicy for StoreManagers {
    const ALLOWED: &'static [Role] = &[Role::StoreOwner, Role::Admin];
}

/// Reviews across the caller's own stores.
pub struct StoreOwners;

impl RolePolicy for StoreOwners {
    const ALLOWED: &'static [Role] = &[Role::StoreOwner];
}

pub struct Admins;

impl RolePolicy for Admins {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}
