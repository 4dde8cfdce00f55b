use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of roles a principal can hold.
///
/// Roles travel as upper-case strings (`USER`, `STORE_OWNER`, `ADMIN`) in
/// tokens and in the `users.role` column. Parsing is case-insensitive so that
/// `"admin"`, `"Admin"` and `"ADMIN"` all canonicalise to [`Role::Admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Role {
    User,
    StoreOwner,
    Admin,
}

pub const ROLE_USER: &str = "USER";
pub const ROLE_STORE_OWNER: &str = "STORE_OWNER";
pub const ROLE_ADMIN: &str = "ADMIN";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::StoreOwner, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::StoreOwner => ROLE_STORE_OWNER,
            Role::Admin => ROLE_ADMIN,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownRole(value.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
