//! Report entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use roadwatch_core::lifecycle::AuditEntry;
use roadwatch_core::types::{DbId, Timestamp};

/// Full report row from the `reports` table.
///
/// `audit` is the raw JSONB array; use [`Report::audit_entries`] for the
/// typed form.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub image_url: String,
    pub annotated_image_url: Option<String>,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub detection_count: i32,
    pub total_area_m2: f64,
    pub mean_confidence: f64,
    pub severity: String,
    pub material: String,
    pub bags_required: i32,
    pub estimated_cost: f64,
    pub status: String,
    pub drone_status: String,
    pub audit: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Report {
    /// Decode the JSONB audit array into typed entries.
    pub fn audit_entries(&self) -> Result<Vec<AuditEntry>, serde_json::Error> {
        serde_json::from_value(self.audit.clone())
    }
}

/// DTO for inserting a new report.
///
/// The caller provides the already-computed aggregate and estimate fields;
/// the initial `uploaded` audit entry is appended by the repository.
#[derive(Debug)]
pub struct CreateReport {
    pub user_id: Option<DbId>,
    pub image_url: String,
    pub annotated_image_url: Option<String>,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub detection_count: i32,
    pub total_area_m2: f64,
    pub mean_confidence: f64,
    pub severity: String,
    pub material: String,
    pub bags_required: i32,
    pub estimated_cost: f64,
}

/// Equality filters for report listings. `None` fields are not filtered.
#[derive(Debug, Default, Deserialize)]
pub struct ReportFilter {
    pub status: Option<String>,
    pub severity: Option<String>,
}
