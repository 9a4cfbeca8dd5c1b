//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod notification_repo;
pub mod report_repo;
pub mod user_repo;

pub use notification_repo::NotificationRepo;
pub use report_repo::ReportRepo;
pub use user_repo::UserRepo;
