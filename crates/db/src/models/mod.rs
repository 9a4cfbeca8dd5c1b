//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A safe `Serialize` response type where the row has private fields

pub mod notification;
pub mod report;
pub mod user;
