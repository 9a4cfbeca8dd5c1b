//! Well-known role name constants.
//!
//! These must match the `role` CHECK constraint in the users migration.

pub const ROLE_CITIZEN: &str = "citizen";
pub const ROLE_AUTHORITY: &str = "authority";

/// Whether `role` is one of the recognized role names.
pub fn is_valid_role(role: &str) -> bool {
    role == ROLE_CITIZEN || role == ROLE_AUTHORITY
}
