//! Shared helpers for HTTP-level integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::util::ServiceExt;

use roadwatch_api::config::ServerConfig;
use roadwatch_api::router::build_app_router;
use roadwatch_api::state::AppState;
use roadwatch_cloud::sms::MockSms;
use roadwatch_cloud::storage::StorageRouter;
use roadwatch_inference::provider::DetectionProvider;
use roadwatch_inference::MockDetector;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(uploads_dir: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        uploads_dir: uploads_dir.to_string(),
        authority_phone: "+15550100000".to_string(),
        jwt: roadwatch_api::auth::jwt::JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router with the production middleware stack,
/// mock gateways, and a throwaway uploads directory.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_detector(pool, Arc::new(MockDetector::default()))
}

/// Like [`build_test_app`] but with a caller-supplied detection gateway.
pub fn build_test_app_with_detector(pool: PgPool, detector: Arc<dyn DetectionProvider>) -> Router {
    let uploads_dir = tempfile::tempdir()
        .expect("tempdir creation should succeed")
        .keep();
    let config = test_config(uploads_dir.to_str().unwrap());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: Arc::new(StorageRouter::local_only(uploads_dir)),
        detector,
        sms: Arc::new(MockSms),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a multipart form; `token` may be `None` for anonymous submissions.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    token: Option<&str>,
    form: MultipartForm,
) -> Response<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header(
        CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", form.boundary),
    );
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(form.finish())).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Decode a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes: Bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collection should succeed")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

// ---------------------------------------------------------------------------
// Multipart body builder
// ---------------------------------------------------------------------------

/// Minimal multipart/form-data body builder for tests.
pub struct MultipartForm {
    pub boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "----roadwatch-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}

/// Encode a small solid-color PNG for upload tests.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([30, 30, 30, 255]));
    let mut out = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut out),
        image::ImageFormat::Png,
    )
    .expect("PNG encoding should succeed");
    out
}
