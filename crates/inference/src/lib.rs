//! Detection gateway: clients for the external pothole-detection service.
//!
//! The backend never runs a model itself -- it consumes the output contract
//! of a hosted inference API through the [`provider::DetectionProvider`]
//! trait, with a deterministic mock for tests and offline environments.

pub mod media;
pub mod mock;
pub mod provider;
pub mod roboflow;

pub use mock::MockDetector;
pub use provider::{DetectionProvider, InferenceError};
pub use roboflow::RoboflowDetector;
