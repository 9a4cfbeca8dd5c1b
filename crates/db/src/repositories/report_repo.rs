//! Repository for the `reports` table.
//!
//! The audit trail is a JSONB array appended to in the same UPDATE statement
//! that sets the status, so concurrent actions on one report can never lose
//! an entry or apply a stale status.

use sqlx::{PgPool, QueryBuilder};

use roadwatch_core::lifecycle::AuditEntry;
use roadwatch_core::types::DbId;

use crate::models::report::{CreateReport, Report, ReportFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, image_url, annotated_image_url, location, \
                       latitude, longitude, detection_count, total_area_m2, \
                       mean_confidence, severity, material, bags_required, \
                       estimated_cost, status, drone_status, audit, \
                       created_at, updated_at";

/// Provides CRUD operations for reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Insert a new report with its initial audit entry, returning the row.
    ///
    /// Status starts at `Pending`; the audit array starts with exactly the
    /// given entry (normally the implicit `uploaded` action).
    pub async fn create(
        pool: &PgPool,
        input: &CreateReport,
        initial_entry: &AuditEntry,
    ) -> Result<Report, sqlx::Error> {
        let audit = serde_json::json!([initial_entry]);
        let query = format!(
            "INSERT INTO reports (user_id, image_url, annotated_image_url, location,
                                  latitude, longitude, detection_count, total_area_m2,
                                  mean_confidence, severity, material, bags_required,
                                  estimated_cost, audit)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(input.user_id)
            .bind(&input.image_url)
            .bind(&input.annotated_image_url)
            .bind(&input.location)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.detection_count)
            .bind(input.total_area_m2)
            .bind(input.mean_confidence)
            .bind(&input.severity)
            .bind(&input.material)
            .bind(input.bags_required)
            .bind(input.estimated_cost)
            .bind(audit)
            .fetch_one(pool)
            .await
    }

    /// Find a report by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List reports matching the filter, newest first.
    pub async fn list(pool: &PgPool, filter: &ReportFilter) -> Result<Vec<Report>, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM reports WHERE TRUE"));
        if let Some(status) = &filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(severity) = &filter.severity {
            qb.push(" AND severity = ").push_bind(severity);
        }
        qb.push(" ORDER BY created_at DESC");
        qb.build_query_as::<Report>().fetch_all(pool).await
    }

    /// List one user's reports, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Report>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reports WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Atomically apply one lifecycle action: set the status and drone tag,
    /// append one audit entry, and bump `updated_at`, all in a single UPDATE.
    ///
    /// Returns `None` if no report with the given `id` exists.
    pub async fn append_action(
        pool: &PgPool,
        id: DbId,
        status: &str,
        drone_status: &str,
        entry: &AuditEntry,
    ) -> Result<Option<Report>, sqlx::Error> {
        let entry_json = serde_json::to_value(entry)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let query = format!(
            "UPDATE reports
             SET status = $2,
                 drone_status = $3,
                 audit = audit || $4::jsonb,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(status)
            .bind(drone_status)
            .bind(entry_json)
            .fetch_optional(pool)
            .await
    }

    /// Append one audit entry without touching the lifecycle columns.
    ///
    /// For actions that leave the status unchanged, so a transition committed
    /// by a concurrent request is never overwritten with a stale status.
    ///
    /// Returns `None` if no report with the given `id` exists.
    pub async fn append_audit(
        pool: &PgPool,
        id: DbId,
        entry: &AuditEntry,
    ) -> Result<Option<Report>, sqlx::Error> {
        let entry_json = serde_json::to_value(entry)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let query = format!(
            "UPDATE reports
             SET audit = audit || $2::jsonb,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(entry_json)
            .fetch_optional(pool)
            .await
    }
}
