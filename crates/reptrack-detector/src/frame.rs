//! Frame submission payloads.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of a frame submission, as posted by a capture client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRequest {
    /// Base64 JPEG, optionally as a `data:image/jpeg;base64,` URL
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub exercise_type: Option<String>,
}

/// A frame request with both fields present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFrame {
    pub image_data: String,
    pub exercise_type: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameRequestError {
    #[error("Missing imageData")]
    MissingImageData,
    #[error("Missing exerciseType")]
    MissingExerciseType,
}

impl FrameRequest {
    #[must_use]
    pub fn new(image_data: impl Into<String>, exercise_type: impl Into<String>) -> Self {
        Self {
            image_data: Some(image_data.into()),
            exercise_type: Some(exercise_type.into()),
        }
    }

    /// Check that both fields are present and non-empty
    ///
    /// # Errors
    ///
    /// Returns the first missing field
    pub fn validate(self) -> Result<ValidFrame, FrameRequestError> {
        let image_data = self
            .image_data
            .filter(|s| !s.is_empty())
            .ok_or(FrameRequestError::MissingImageData)?;
        let exercise_type = self
            .exercise_type
            .filter(|s| !s.trim().is_empty())
            .ok_or(FrameRequestError::MissingExerciseType)?;

        Ok(ValidFrame {
            image_data,
            exercise_type,
        })
    }
}

/// Decode a base64 frame, stripping a `data:...;base64,` prefix if present
///
/// # Errors
///
/// Returns an error if the payload is not valid base64
pub fn decode_image_data(image_data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match image_data.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map_or(image_data, |(_, data)| data),
        None => image_data,
    };
    STANDARD.decode(payload.trim())
}

/// Encode raw JPEG bytes as a data URL, the format browsers produce from a canvas
#[must_use]
pub fn encode_jpeg(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
}
