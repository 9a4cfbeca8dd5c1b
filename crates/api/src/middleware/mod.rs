//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`auth::OptionalAuthUser`] -- Like `AuthUser` but tolerates anonymous requests.
//! - [`rbac::RequireAuthority`] -- Requires the `authority` role.

pub mod auth;
pub mod rbac;
