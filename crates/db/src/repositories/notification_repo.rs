//! Repository for the `notifications` table.

use sqlx::PgPool;

use roadwatch_core::types::DbId;

use crate::models::notification::{CreateNotification, Notification};

/// Column list for `notifications` queries.
const COLUMNS: &str =
    "id, report_id, phone_number, message, status, provider_ref, error, created_at";

/// Provides CRUD operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Record an outbound SMS attempt, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (report_id, phone_number, message, status,
                                        provider_ref, error)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.report_id)
            .bind(&input.phone_number)
            .bind(&input.message)
            .bind(&input.status)
            .bind(&input.provider_ref)
            .bind(&input.error)
            .fetch_one(pool)
            .await
    }

    /// List notifications newest first, capped at `limit`.
    pub async fn list(pool: &PgPool, limit: i64) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications ORDER BY created_at DESC LIMIT $1"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List notifications linked to one report, newest first.
    pub async fn list_for_report(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications WHERE report_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }
}
