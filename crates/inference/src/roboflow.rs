//! HTTP client for the hosted Roboflow detection API.

use async_trait::async_trait;
use serde::Deserialize;

use roadwatch_core::geometry::Detection;

use crate::provider::{DetectionProvider, InferenceError};

/// Default base URL for the serverless inference endpoint.
pub const DEFAULT_API_URL: &str = "https://serverless.roboflow.com";

/// Client for one Roboflow-hosted model.
pub struct RoboflowDetector {
    client: reqwest::Client,
    api_url: String,
    model_id: String,
    api_key: String,
}

/// Top-level response from the detect endpoint.
#[derive(Debug, Deserialize)]
struct InferResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

/// One prediction: center-form pixel box plus confidence.
#[derive(Debug, Deserialize)]
struct Prediction {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    confidence: f64,
}

impl RoboflowDetector {
    /// Create a client for the given model.
    pub fn new(api_url: String, model_id: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            model_id,
            api_key,
        }
    }

    /// Build a client from environment variables.
    ///
    /// | Env Var              | Required | Default                             |
    /// |----------------------|----------|-------------------------------------|
    /// | `ROBOFLOW_API_KEY`   | **yes**  | --                                  |
    /// | `ROBOFLOW_MODEL_ID`  | **yes**  | --                                  |
    /// | `INFERENCE_API_URL`  | no       | `https://serverless.roboflow.com`   |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing -- detection is mandatory for
    /// this provider, so misconfiguration should fail at startup.
    pub fn from_env() -> Self {
        let api_key =
            std::env::var("ROBOFLOW_API_KEY").expect("ROBOFLOW_API_KEY must be set");
        let model_id =
            std::env::var("ROBOFLOW_MODEL_ID").expect("ROBOFLOW_MODEL_ID must be set");
        let api_url =
            std::env::var("INFERENCE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        Self::new(api_url, model_id, api_key)
    }
}

#[async_trait]
impl DetectionProvider for RoboflowDetector {
    async fn infer(&self, image: &[u8], filename: &str) -> Result<Vec<Detection>, InferenceError> {
        let part = reqwest::multipart::Part::bytes(image.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| InferenceError::Decode(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/{}", self.api_url, self.model_id))
            .query(&[("api_key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: InferResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;

        tracing::debug!(
            model = %self.model_id,
            predictions = parsed.predictions.len(),
            "Detection request completed"
        );

        Ok(parsed
            .predictions
            .into_iter()
            .map(|p| Detection {
                x: p.x,
                y: p.y,
                width: p.width,
                height: p.height,
                confidence: p.confidence,
            })
            .collect())
    }
}
