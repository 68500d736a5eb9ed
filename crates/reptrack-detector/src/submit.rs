//! Ways a capture loop can hand frames to a detector.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::frame::FrameRequest;
use crate::reading::FrameReading;
use crate::relay::FrameRelay;

/// Something that turns one frame into a reading
#[async_trait]
pub trait FrameSubmitter: Send + Sync {
    /// Submit a single frame
    ///
    /// # Errors
    ///
    /// Returns an error if the request itself is rejected or cannot be delivered.
    /// Detector failures are not errors; they come back as the fallback reading.
    async fn submit(&self, request: FrameRequest) -> Result<FrameReading>;
}

/// Runs the detector in-process
pub struct LocalSubmitter {
    relay: Arc<FrameRelay>,
}

impl LocalSubmitter {
    #[must_use]
    pub fn new(relay: Arc<FrameRelay>) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl FrameSubmitter for LocalSubmitter {
    async fn submit(&self, request: FrameRequest) -> Result<FrameReading> {
        let frame = request.validate()?;
        Ok(self.relay.relay(&frame).await)
    }
}

/// Posts frames to a running `reptrack-server`
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitter {
    /// Create a submitter for the server at `base_url`, e.g. `http://127.0.0.1:3000`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/process-frame", base_url.trim_end_matches('/')),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FrameSubmitter for HttpSubmitter {
    async fn submit(&self, request: FrameRequest) -> Result<FrameReading> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.endpoint))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Frame endpoint error ({status}): {error_text}");
        }

        response
            .json::<FrameReading>()
            .await
            .context("Failed to parse frame reading")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::DetectorSettings;

    #[test]
    fn test_http_endpoint_joins_path() {
        let submitter = HttpSubmitter::new("http://127.0.0.1:3000/").unwrap();
        assert_eq!(
            submitter.endpoint(),
            "http://127.0.0.1:3000/api/process-frame"
        );
    }

    #[tokio::test]
    async fn test_local_submitter_rejects_incomplete_request() {
        let relay = Arc::new(FrameRelay::new(DetectorSettings::default(), 1));
        let submitter = LocalSubmitter::new(relay);

        let err = submitter
            .submit(FrameRequest {
                image_data: Some("aGVsbG8=".to_string()),
                exercise_type: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing exerciseType");
    }
}
