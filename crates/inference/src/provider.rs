//! The swappable detection-provider interface.

use async_trait::async_trait;

use roadwatch_core::geometry::Detection;

/// Errors from the detection gateway.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Inference API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider response could not be decoded.
    #[error("Malformed inference response: {0}")]
    Decode(String),

    /// The uploaded image could not be read.
    #[error("Unreadable image: {0}")]
    Image(String),
}

/// A pothole detection backend.
///
/// Implementations perform one round-trip per image and return center-form
/// pixel boxes with confidences. They never retry -- timeout and retry policy
/// belong to the caller.
#[async_trait]
pub trait DetectionProvider: Send + Sync {
    /// Run detection over the raw image bytes.
    ///
    /// An image with no potholes yields an empty list, not an error.
    async fn infer(&self, image: &[u8], filename: &str) -> Result<Vec<Detection>, InferenceError>;
}
