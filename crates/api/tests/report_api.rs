//! HTTP-level integration tests for report submission, lifecycle actions,
//! and authority notification.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use sqlx::PgPool;

use common::{body_json, get_auth, post_json, post_json_auth, post_multipart, MultipartForm};
use roadwatch_core::geometry::Detection;
use roadwatch_inference::MockDetector;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// One 160x80 px detection in a 640 px wide photo.
///
/// scale = 3.5 / 640 m per px, so the box measures roughly 0.38 m2:
/// Moderate severity, Cold Mix Asphalt, 4 bags at 480 each.
fn one_detection() -> Arc<MockDetector> {
    Arc::new(MockDetector::with_detections(vec![Detection {
        x: 320.0,
        y: 240.0,
        width: 160.0,
        height: 80.0,
        confidence: 0.9,
    }]))
}

async fn signup_and_login(pool: &PgPool, name: &str, email: &str, role: Option<&str>) -> String {
    let mut body = serde_json::json!({
        "name": name,
        "email": email,
        "password": "test_password_123!",
    });
    if let Some(role) = role {
        body["role"] = serde_json::json!(role);
    }
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": email, "password": "test_password_123!" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

fn submission_form() -> MultipartForm {
    MultipartForm::new()
        .file("image", "road.png", "image/png", &common::sample_png(640, 480))
        .text("location", "Corner of 5th and Main")
        .text("coordinates", r#"{"lat": 40.7128, "lng": -74.006}"#)
}

async fn submit_report(
    pool: &PgPool,
    detector: Arc<MockDetector>,
    token: Option<&str>,
) -> serde_json::Value {
    let app = common::build_test_app_with_detector(pool.clone(), detector);
    let response = post_multipart(app, "/api/v1/reports", token, submission_form()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Anonymous submission with zero detections still creates a Pending report.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_anonymous_submit_zero_detections(pool: PgPool) {
    let report = submit_report(&pool, Arc::new(MockDetector::default()), None).await;

    assert_eq!(report["status"], "Pending");
    assert_eq!(report["drone_status"], "unassigned");
    assert_eq!(report["detection_count"], 0);
    assert_eq!(report["total_area_m2"], 0.0);
    assert_eq!(report["severity"], "Minor");
    assert!(report["user_id"].is_null(), "anonymous report has no owner");
    assert!(
        report["annotated_image_url"].is_null(),
        "nothing to annotate without detections"
    );

    let audit = report["audit"].as_array().unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0]["action"], "uploaded");
    assert!(audit[0].get("actor_id").is_none());
}

/// A detected pothole produces measured area, severity, and a cost estimate.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_submit_with_detection_estimates_repair(pool: PgPool) {
    let token = signup_and_login(&pool, "Reporter", "reporter@test.com", None).await;
    let report = submit_report(&pool, one_detection(), Some(&token)).await;

    assert_eq!(report["detection_count"], 1);
    let area = report["total_area_m2"].as_f64().unwrap();
    assert!((area - 0.3828125).abs() < 1e-9, "unexpected area {area}");
    assert_eq!(report["severity"], "Moderate");
    assert_eq!(report["material"], "Cold Mix Asphalt");
    assert_eq!(report["bags_required"], 4);
    assert_eq!(report["estimated_cost"], 1920.0);
    assert_eq!(report["mean_confidence"], 0.9);
    assert!(report["user_id"].is_string(), "authed report records owner");
    assert!(
        report["annotated_image_url"]
            .as_str()
            .unwrap()
            .starts_with("/uploads/"),
        "annotated copy stored locally"
    );

    let audit = report["audit"].as_array().unwrap();
    assert_eq!(audit[0]["action"], "uploaded");
    assert!(audit[0]["actor_id"].is_string());
}

/// Missing fields and bad coordinates are rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_submit_validation(pool: PgPool) {
    // No image field.
    let form = MultipartForm::new()
        .text("location", "somewhere")
        .text("coordinates", r#"{"lat": 0, "lng": 0}"#);
    let app = common::build_test_app(pool.clone());
    let response = post_multipart(app, "/api/v1/reports", None, form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Latitude out of range.
    let form = MultipartForm::new()
        .file("image", "road.png", "image/png", &common::sample_png(64, 64))
        .text("location", "somewhere")
        .text("coordinates", r#"{"lat": 91.0, "lng": 0}"#);
    let app = common::build_test_app(pool.clone());
    let response = post_multipart(app, "/api/v1/reports", None, form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Garbage image bytes.
    let form = MultipartForm::new()
        .file("image", "road.png", "image/png", b"not a png")
        .text("location", "somewhere")
        .text("coordinates", r#"{"lat": 0, "lng": 0}"#);
    let app = common::build_test_app(pool);
    let response = post_multipart(app, "/api/v1/reports", None, form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

/// Owners and authorities can read a report; other citizens cannot.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_report_visibility(pool: PgPool) {
    let owner = signup_and_login(&pool, "Owner", "owner@test.com", None).await;
    let other = signup_and_login(&pool, "Other", "other@test.com", None).await;
    let authority = signup_and_login(&pool, "Auth", "auth@test.com", Some("authority")).await;

    let report = submit_report(&pool, Arc::new(MockDetector::default()), Some(&owner)).await;
    let uri = format!("/api/v1/reports/{}", report["id"].as_str().unwrap());

    let response = get_auth(common::build_test_app(pool.clone()), &uri, &owner).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(common::build_test_app(pool.clone()), &uri, &authority).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(common::build_test_app(pool), &uri, &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A citizen's report listing is private to them and authorities.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_user_reports_listing(pool: PgPool) {
    let owner = signup_and_login(&pool, "Owner", "owner@test.com", None).await;
    let other = signup_and_login(&pool, "Other", "other@test.com", None).await;

    let report = submit_report(&pool, Arc::new(MockDetector::default()), Some(&owner)).await;
    let owner_id = report["user_id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/users/{owner_id}/reports");

    let response = get_auth(common::build_test_app(pool.clone()), &uri, &owner).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = get_auth(common::build_test_app(pool), &uri, &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Authority listings filter by status and severity.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_report_list_filters(pool: PgPool) {
    let authority = signup_and_login(&pool, "Auth", "auth@test.com", Some("authority")).await;

    submit_report(&pool, Arc::new(MockDetector::default()), None).await;
    submit_report(&pool, one_detection(), None).await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/reports?severity=Moderate",
        &authority,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    // Unknown filter values are rejected, not silently empty.
    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/reports?status=Bogus",
        &authority,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Lifecycle actions
// ---------------------------------------------------------------------------

/// The full authority workflow walks Pending -> Reported -> Inspected ->
/// In Progress -> Resolved, with the drone tag derived at each step and the
/// audit trail growing by exactly one entry per action.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_action_lifecycle(pool: PgPool) {
    let authority = signup_and_login(&pool, "Auth", "auth@test.com", Some("authority")).await;
    let report = submit_report(&pool, Arc::new(MockDetector::default()), None).await;
    let uri = format!("/api/v1/reports/{}/action", report["id"].as_str().unwrap());

    let steps = [
        ("notify_authority", "Reported", "unassigned"),
        ("dispatch_drone", "Inspected", "unassigned"),
        ("schedule_repair", "In Progress", "in_progress"),
        ("repair_done", "Resolved", "completed"),
    ];

    for (i, (action, status, drone)) in steps.iter().enumerate() {
        let body = serde_json::json!({ "action": action });
        let response =
            post_json_auth(common::build_test_app(pool.clone()), &uri, &authority, body).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], *status);
        assert_eq!(json["drone_status"], *drone);

        let audit = json["audit"].as_array().unwrap();
        assert_eq!(audit.len(), i + 2, "uploaded plus one entry per action");
        assert_eq!(audit[i + 1]["action"], *action);
        assert_eq!(audit[i + 1]["actor_role"], "authority");
    }
}

/// Unknown actions are audited without changing the status.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_action_audited_unchanged(pool: PgPool) {
    let authority = signup_and_login(&pool, "Auth", "auth@test.com", Some("authority")).await;
    let report = submit_report(&pool, Arc::new(MockDetector::default()), None).await;
    let uri = format!("/api/v1/reports/{}/action", report["id"].as_str().unwrap());

    let body = serde_json::json!({ "action": "paint_it_gold", "notes": "requested by mayor" });
    let response = post_json_auth(common::build_test_app(pool), &uri, &authority, body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "Pending", "status must not change");

    let audit = json["audit"].as_array().unwrap();
    assert_eq!(audit.len(), 2);
    assert_eq!(audit[1]["action"], "paint_it_gold");
    assert_eq!(audit[1]["notes"], "requested by mayor");
}

/// Citizens cannot apply lifecycle actions.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_citizen_cannot_apply_action(pool: PgPool) {
    let citizen = signup_and_login(&pool, "Citizen", "citizen@test.com", None).await;
    let report = submit_report(&pool, Arc::new(MockDetector::default()), Some(&citizen)).await;
    let uri = format!("/api/v1/reports/{}/action", report["id"].as_str().unwrap());

    let body = serde_json::json!({ "action": "repair_done" });
    let response = post_json_auth(common::build_test_app(pool), &uri, &citizen, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Actions on a missing report return 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_action_missing_report(pool: PgPool) {
    let authority = signup_and_login(&pool, "Auth", "auth@test.com", Some("authority")).await;

    let uri = format!("/api/v1/reports/{}/action", uuid::Uuid::new_v4());
    let body = serde_json::json!({ "action": "notify_authority" });
    let response = post_json_auth(common::build_test_app(pool), &uri, &authority, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Notify
// ---------------------------------------------------------------------------

/// The owner can notify: the SMS attempt is recorded (mocked in tests) and
/// the report advances to Reported.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_owner_notify_records_notification(pool: PgPool) {
    let owner = signup_and_login(&pool, "Owner", "owner@test.com", None).await;
    let authority = signup_and_login(&pool, "Auth", "auth@test.com", Some("authority")).await;

    let report = submit_report(&pool, one_detection(), Some(&owner)).await;
    let uri = format!("/api/v1/reports/{}/notify", report["id"].as_str().unwrap());

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        &owner,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["report"]["status"], "Reported");
    assert_eq!(json["notification"]["status"], "mocked");
    assert_eq!(json["notification"]["report_id"], report["id"]);
    let message = json["notification"]["message"].as_str().unwrap();
    assert!(message.contains("Moderate"));
    assert!(message.contains("INR 1920.00"), "cost is quoted in rupees");

    // The delivery log is visible to authorities.
    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/notifications",
        &authority,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

/// A non-owner citizen cannot trigger notification.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_non_owner_cannot_notify(pool: PgPool) {
    let owner = signup_and_login(&pool, "Owner", "owner@test.com", None).await;
    let other = signup_and_login(&pool, "Other", "other@test.com", None).await;

    let report = submit_report(&pool, Arc::new(MockDetector::default()), Some(&owner)).await;
    let uri = format!("/api/v1/reports/{}/notify", report["id"].as_str().unwrap());

    let response =
        post_json_auth(common::build_test_app(pool), &uri, &other, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
