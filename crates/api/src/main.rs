use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roadwatch_api::config::ServerConfig;
use roadwatch_api::router::build_app_router;
use roadwatch_api::state::AppState;
use roadwatch_cloud::sms::{MockSms, SmsSender, TwilioSms};
use roadwatch_cloud::storage::{LocalStorage, ObjectStorage, S3Storage, StorageRouter};
use roadwatch_inference::provider::DetectionProvider;
use roadwatch_inference::{MockDetector, RoboflowDetector};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roadwatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = roadwatch_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    roadwatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    roadwatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Gateways ---
    let storage = Arc::new(build_storage(&config).await);
    let detector = build_detector();
    let sms = build_sms();

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage,
        detector,
        sms,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Build the photo store: S3 primary with local fallback when a bucket is
/// configured and `USE_LOCAL_STORAGE` is not set, otherwise local only.
async fn build_storage(config: &ServerConfig) -> StorageRouter {
    let local = LocalStorage::new(&config.uploads_dir);

    let use_local = std::env::var("USE_LOCAL_STORAGE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    if use_local {
        tracing::info!(dir = %config.uploads_dir, "Using local photo storage");
        return StorageRouter::new(None, local);
    }

    match std::env::var("S3_BUCKET") {
        Ok(bucket) => {
            let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".into());
            tracing::info!(%bucket, %region, "Using S3 photo storage with local fallback");
            let s3: Arc<dyn ObjectStorage> =
                Arc::new(S3Storage::from_env(bucket, region).await);
            StorageRouter::new(Some(s3), local)
        }
        Err(_) => {
            tracing::info!(dir = %config.uploads_dir, "S3_BUCKET not set; using local photo storage");
            StorageRouter::new(None, local)
        }
    }
}

/// Build the detection gateway: Roboflow when credentials are present,
/// otherwise a mock that reports zero detections.
fn build_detector() -> Arc<dyn DetectionProvider> {
    let configured = std::env::var("ROBOFLOW_API_KEY").is_ok()
        && std::env::var("ROBOFLOW_MODEL_ID").is_ok();
    if configured {
        tracing::info!("Using Roboflow detection gateway");
        Arc::new(RoboflowDetector::from_env())
    } else {
        tracing::warn!("ROBOFLOW_API_KEY/ROBOFLOW_MODEL_ID not set; detection is mocked");
        Arc::new(MockDetector::default())
    }
}

/// Build the SMS gateway: Twilio when credentials are present, otherwise a
/// mock that logs and records outcomes as `mocked`.
fn build_sms() -> Arc<dyn SmsSender> {
    match TwilioSms::from_env() {
        Some(twilio) => {
            tracing::info!("Using Twilio SMS gateway");
            Arc::new(twilio)
        }
        None => {
            tracing::warn!("Twilio credentials not set; SMS delivery is mocked");
            Arc::new(MockSms)
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
