//! In-process detector for tests and local development.

use async_trait::async_trait;

use roadwatch_core::geometry::Detection;

use crate::provider::{DetectionProvider, InferenceError};

/// Returns a canned set of detections without any network call.
#[derive(Debug, Clone, Default)]
pub struct MockDetector {
    detections: Vec<Detection>,
}

impl MockDetector {
    /// Detector that always reports the given detections.
    pub fn with_detections(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

#[async_trait]
impl DetectionProvider for MockDetector {
    async fn infer(
        &self,
        _image: &[u8],
        _filename: &str,
    ) -> Result<Vec<Detection>, InferenceError> {
        Ok(self.detections.clone())
    }
}
