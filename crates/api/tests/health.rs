//! Health endpoint integration test.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

use common::{body_json, get};

/// GET /health returns 200 with status "ok" when the database is reachable.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_health_ok(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert!(json["version"].is_string());
}

/// The health endpoint carries the request-id middleware like everything else.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_health_sets_request_id(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/health").await;
    assert!(
        response.headers().contains_key("x-request-id"),
        "x-request-id header must be present"
    );
}
