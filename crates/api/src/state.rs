use std::sync::Arc;

use roadwatch_cloud::sms::SmsSender;
use roadwatch_cloud::storage::StorageRouter;
use roadwatch_inference::provider::DetectionProvider;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: roadwatch_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Photo storage with S3 primary and local fallback.
    pub storage: Arc<StorageRouter>,
    /// Pothole detection gateway.
    pub detector: Arc<dyn DetectionProvider>,
    /// Outbound SMS gateway.
    pub sms: Arc<dyn SmsSender>,
}
