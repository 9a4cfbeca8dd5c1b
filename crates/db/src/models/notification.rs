//! Notification entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use roadwatch_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub report_id: Option<DbId>,
    pub phone_number: String,
    pub message: String,
    /// One of `sent`, `failed`, `mocked`.
    pub status: String,
    pub provider_ref: Option<String>,
    pub error: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for recording an outbound SMS attempt.
#[derive(Debug)]
pub struct CreateNotification {
    pub report_id: Option<DbId>,
    pub phone_number: String,
    pub message: String,
    pub status: String,
    pub provider_ref: Option<String>,
    pub error: Option<String>,
}
