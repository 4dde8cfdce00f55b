pub mod context;
pub mod error;
pub mod policy;
pub mod roles;

pub use context::RequireRole;
pub use error::SecurityError;
pub use policy::ensure_owner_or_admin;
pub use roles::{ensure_role, RolePolicy};
