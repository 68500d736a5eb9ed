//! Detector readings and the ways producing one can fail.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Rep count reported for a single frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReading {
    pub count: u32,
    /// Percentage, 0-100
    pub form_score: u32,
    pub state: String,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl FrameReading {
    /// Form score shown when the detector could not produce a reading
    pub const FALLBACK_FORM_SCORE: u32 = 85;

    /// Neutral reading substituted for any detector failure
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            count: 0,
            form_score: Self::FALLBACK_FORM_SCORE,
            state: "ready".to_string(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Why the detector did not produce a reading
#[derive(Debug, Error)]
pub enum DetectionFailure {
    #[error("frame is not valid base64: {0}")]
    InvalidFrame(#[from] base64::DecodeError),
    #[error("failed to write frame to temp file: {0}")]
    TempFile(#[source] std::io::Error),
    #[error("failed to start detector: {0}")]
    Launch(#[source] std::io::Error),
    #[error("detector exited with {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
    #[error("detector did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("unparseable detector output {output:?}: {source}")]
    UnparseableOutput {
        output: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("detector reported an error: {0}")]
    Reported(String),
}

/// What the detector script prints on success, or its own error object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetectorOutput {
    Reading {
        count: u32,
        form_score: f64,
        state: String,
        #[serde(default)]
        timestamp: Option<i64>,
    },
    Error {
        error: String,
    },
}

/// Parse the detector's stdout into a reading
///
/// Fractional form scores are rounded and clamped to 0-100; a missing
/// timestamp is replaced with the current time.
///
/// # Errors
///
/// Returns `UnparseableOutput` for anything but a single reading object and
/// `Reported` when the detector printed `{"error": ...}`
pub fn parse_detector_output(stdout: &str) -> Result<FrameReading, DetectionFailure> {
    let output = stdout.trim();
    let parsed: DetectorOutput =
        serde_json::from_str(output).map_err(|source| DetectionFailure::UnparseableOutput {
            output: output.to_string(),
            source,
        })?;

    match parsed {
        DetectorOutput::Reading {
            count,
            form_score,
            state,
            timestamp,
        } => Ok(FrameReading {
            count,
            form_score: normalize_form_score(form_score),
            state,
            timestamp: timestamp.unwrap_or_else(|| Utc::now().timestamp_millis()),
        }),
        DetectorOutput::Error { error } => Err(DetectionFailure::Reported(error)),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalize_form_score(score: f64) -> u32 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u32
}
