//! Handlers for the `/reports` resource: submission, listing, lifecycle
//! actions, and authority notification.
//!
//! Submission runs the full measurement pipeline: decode the photo, call the
//! detection gateway, convert pixel boxes to physical area via the lane-width
//! heuristic, classify severity, estimate repair cost, and persist the report
//! with its initial audit entry.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roadwatch_core::costing::estimate_repair;
use roadwatch_core::error::CoreError;
use roadwatch_core::geometry::{aggregate, DEFAULT_DISTANCE_FACTOR};
use roadwatch_core::lifecycle::{actions, apply_action, AuditEntry, ReportStatus};
use roadwatch_core::roles::ROLE_AUTHORITY;
use roadwatch_core::severity::Severity;
use roadwatch_core::types::DbId;
use roadwatch_db::models::notification::{CreateNotification, Notification};
use roadwatch_db::models::report::{CreateReport, Report, ReportFilter};
use roadwatch_db::repositories::{NotificationRepo, ReportRepo, UserRepo};
use roadwatch_inference::media::{annotate, image_dimensions};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::middleware::rbac::RequireAuthority;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `coordinates` multipart field, sent as a JSON object.
#[derive(Debug, Deserialize)]
struct Coordinates {
    lat: f64,
    lng: f64,
}

/// Request body for `POST /reports/{id}/action`.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    pub notes: Option<String>,
}

/// Response for `POST /reports/{id}/notify`.
#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub report: Report,
    pub notification: Notification,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/reports (multipart)
///
/// Fields:
/// - `image` (file, required) -- the pothole photo
/// - `location` (text, required) -- human-readable address or description
/// - `coordinates` (JSON text, required) -- `{"lat": .., "lng": ..}`
/// - `distance_factor` (text, optional) -- camera distance correction, default 1.0
///
/// Anonymous submissions are accepted; an Authorization header, when present,
/// attributes the report to the caller.
pub async fn submit(
    State(state): State<AppState>,
    OptionalAuthUser(auth_user): OptionalAuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Report>)> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut location: Option<String> = None;
    let mut coordinates: Option<Coordinates> = None;
    let mut distance_factor = DEFAULT_DISTANCE_FACTOR;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("photo.jpg").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                image = Some((filename, data.to_vec()));
            }
            "location" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                location = Some(text);
            }
            "coordinates" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let parsed: Coordinates = serde_json::from_str(&text)
                    .map_err(|e| AppError::BadRequest(format!("Invalid coordinates: {e}")))?;
                coordinates = Some(parsed);
            }
            "distance_factor" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                distance_factor = text
                    .parse()
                    .map_err(|_| AppError::BadRequest("Invalid distance_factor".into()))?;
            }
            _ => {} // ignore unknown fields
        }
    }

    let (filename, image_bytes) =
        image.ok_or_else(|| AppError::BadRequest("Missing required field: image".into()))?;
    let location =
        location.ok_or_else(|| AppError::BadRequest("Missing required field: location".into()))?;
    let coords = coordinates
        .ok_or_else(|| AppError::BadRequest("Missing required field: coordinates".into()))?;

    if location.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Location must not be empty".into(),
        )));
    }
    if !(-90.0..=90.0).contains(&coords.lat) || !(-180.0..=180.0).contains(&coords.lng) {
        return Err(AppError::Core(CoreError::Validation(
            "Coordinates out of range".into(),
        )));
    }
    if distance_factor <= 0.0 {
        return Err(AppError::Core(CoreError::Validation(
            "distance_factor must be positive".into(),
        )));
    }

    let (image_width, _image_height) = image_dimensions(&image_bytes)
        .map_err(|e| AppError::BadRequest(format!("Unreadable image: {e}")))?;

    // Detection gateway. Provider failures surface as 502, not 500.
    let detections = state
        .detector
        .infer(&image_bytes, &filename)
        .await
        .map_err(|e| AppError::Core(CoreError::Gateway(e.to_string())))?;

    let summary = aggregate(&detections, image_width, distance_factor);
    let severity = Severity::classify(summary.total_area_m2);
    let estimate = estimate_repair(severity, summary.total_area_m2);

    // Store the original photo and, when there are detections, an annotated
    // copy. Annotation failure only loses the overlay, never the report.
    let photo_id = Uuid::new_v4();
    let ext = extension_of(&filename);
    let image_url = state
        .storage
        .store(
            image_bytes.clone(),
            &format!("{photo_id}.{ext}"),
            content_type_for(ext),
        )
        .await
        .map_err(|e| AppError::InternalError(format!("Photo storage failed: {e}")))?;

    let annotated_image_url = if summary.detections.is_empty() {
        None
    } else {
        match annotate(&image_bytes, &summary.detections) {
            Ok(png) => Some(
                state
                    .storage
                    .store(png, &format!("{photo_id}_annotated.png"), "image/png")
                    .await
                    .map_err(|e| AppError::InternalError(format!("Photo storage failed: {e}")))?,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Annotation failed; storing original only");
                None
            }
        }
    };

    let mut initial_entry = AuditEntry::new(actions::UPLOADED);
    if let Some(user) = &auth_user {
        initial_entry = initial_entry.with_actor(user.user_id, &user.role);
    }

    let report = ReportRepo::create(
        &state.pool,
        &CreateReport {
            user_id: auth_user.map(|u| u.user_id),
            image_url,
            annotated_image_url,
            location,
            latitude: coords.lat,
            longitude: coords.lng,
            detection_count: summary.count as i32,
            total_area_m2: summary.total_area_m2,
            mean_confidence: summary.mean_confidence,
            severity: severity.as_str().to_string(),
            material: estimate.material.to_string(),
            bags_required: estimate.bags_required as i32,
            estimated_cost: estimate.estimated_cost,
        },
        &initial_entry,
    )
    .await?;

    tracing::info!(
        report_id = %report.id,
        detections = summary.count,
        severity = %report.severity,
        "Report submitted"
    );
    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /api/v1/reports?status=&severity=
///
/// Authority-only listing of all reports, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAuthority(_user): RequireAuthority,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<DataResponse<Vec<Report>>>> {
    if let Some(status) = &filter.status {
        ReportStatus::parse(status)?;
    }
    if let Some(severity) = &filter.severity {
        Severity::parse(severity)?;
    }
    let reports = ReportRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: reports }))
}

/// GET /api/v1/reports/{id}
///
/// Visible to the report's owner, any authority, or any authenticated user
/// when the report was submitted anonymously.
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Report>> {
    let report = ReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "report",
            id,
        })?;

    ensure_can_view(&report, &user)?;
    Ok(Json(report))
}

/// GET /api/v1/users/{id}/reports
///
/// A citizen may list their own reports; authorities may list anyone's.
pub async fn list_for_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Report>>>> {
    if user.user_id != user_id && user.role != ROLE_AUTHORITY {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot list another user's reports".into(),
        )));
    }
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "user",
            id: user_id,
        })?;
    let reports = ReportRepo::list_by_user(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: reports }))
}

/// POST /api/v1/reports/{id}/action
///
/// Authority-only lifecycle transition. Unrecognized actions leave the status
/// unchanged but are still appended to the audit trail.
pub async fn action(
    State(state): State<AppState>,
    RequireAuthority(user): RequireAuthority,
    Path(id): Path<DbId>,
    Json(input): Json<ActionRequest>,
) -> AppResult<Json<Report>> {
    let report = ReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "report",
            id,
        })?;

    let current = ReportStatus::parse(&report.status)
        .map_err(|e| AppError::InternalError(format!("Corrupt report status: {e}")))?;
    let outcome = apply_action(current, &input.action);

    if !outcome.recognized {
        tracing::warn!(report_id = %id, action = %input.action, "Unrecognized action recorded");
    }

    let entry = AuditEntry::new(&input.action)
        .with_actor(user.user_id, &user.role)
        .with_notes(input.notes);

    // Status-preserving actions only append to the trail, so they can never
    // clobber a transition committed by a concurrent request.
    let updated = if outcome.next_status == current {
        ReportRepo::append_audit(&state.pool, id, &entry).await?
    } else {
        ReportRepo::append_action(
            &state.pool,
            id,
            outcome.next_status.as_str(),
            outcome.drone_status.as_str(),
            &entry,
        )
        .await?
    }
    .ok_or(CoreError::NotFound {
        entity: "report",
        id,
    })?;

    Ok(Json(updated))
}

/// POST /api/v1/reports/{id}/notify
///
/// Send an SMS summary of the report to the road authority dispatch number,
/// record the delivery outcome, and mark the report as `Reported`. Allowed
/// for the report's owner or any authority.
pub async fn notify(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<NotifyResponse>> {
    let report = ReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "report",
            id,
        })?;

    // Same visibility rule as reads: owner, authority, or anyone
    // authenticated when the report is anonymous.
    ensure_can_view(&report, &user).map_err(|_| {
        AppError::Core(CoreError::Forbidden(
            "Only the report owner or an authority may notify".into(),
        ))
    })?;

    let message = format!(
        "Pothole report {}: {} severity, {:.2} m2 across {} detection(s) at {}. Est. repair: {} ({} bags, INR {:.2}).",
        report.id,
        report.severity,
        report.total_area_m2,
        report.detection_count,
        report.location,
        report.material,
        report.bags_required,
        report.estimated_cost,
    );

    let outcome = state.sms.send(&state.config.authority_phone, &message).await;

    let notification = NotificationRepo::create(
        &state.pool,
        &CreateNotification {
            report_id: Some(report.id),
            phone_number: state.config.authority_phone.clone(),
            message,
            status: outcome.status.as_str().to_string(),
            provider_ref: outcome.provider_ref,
            error: outcome.error,
        },
    )
    .await?;

    // The notification attempt itself advances the lifecycle, whether or not
    // the SMS provider accepted the message.
    let current = ReportStatus::parse(&report.status)
        .map_err(|e| AppError::InternalError(format!("Corrupt report status: {e}")))?;
    let transition = apply_action(current, actions::NOTIFY_AUTHORITY);
    let entry = AuditEntry::new(actions::NOTIFY_AUTHORITY).with_actor(user.user_id, &user.role);

    let updated = if transition.next_status == current {
        ReportRepo::append_audit(&state.pool, id, &entry).await?
    } else {
        ReportRepo::append_action(
            &state.pool,
            id,
            transition.next_status.as_str(),
            transition.drone_status.as_str(),
            &entry,
        )
        .await?
    }
    .ok_or(CoreError::NotFound {
        entity: "report",
        id,
    })?;

    Ok(Json(NotifyResponse {
        report: updated,
        notification,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Owner, authority, or anyone authenticated when the report is anonymous.
fn ensure_can_view(report: &Report, user: &AuthUser) -> Result<(), AppError> {
    match report.user_id {
        Some(owner_id) if owner_id == user.user_id => Ok(()),
        Some(_) if user.role == ROLE_AUTHORITY => Ok(()),
        Some(_) => Err(AppError::Core(CoreError::Forbidden(
            "Not allowed to view this report".into(),
        ))),
        None => Ok(()),
    }
}

/// Lowercased file extension, defaulting to `jpg`.
fn extension_of(filename: &str) -> &'static str {
    match filename.rsplit('.').next().map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "png" => "png",
        Some(ext) if ext == "webp" => "webp",
        _ => "jpg",
    }
}

fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}
