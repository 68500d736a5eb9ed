//! Frame relay - hands one frame to the external detector process.
//!
//! Every failure is reported as a [`DetectionFailure`] by [`FrameRelay::detect`];
//! [`FrameRelay::relay`] turns those into the fixed fallback reading so callers
//! facing the user never see an error for a single bad frame.

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::Semaphore;

use crate::frame::{decode_image_data, ValidFrame};
use crate::reading::{parse_detector_output, DetectionFailure, FrameReading};

/// How to launch the detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorSettings {
    /// Interpreter or executable, e.g. `python`
    pub program: String,
    /// Script passed as the first argument
    pub script: PathBuf,
    pub timeout: Duration,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            script: PathBuf::from("scripts").join("exercise_detector.py"),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Relays frames to the detector, at most `max_concurrent` processes at a time
pub struct FrameRelay {
    settings: DetectorSettings,
    permits: Semaphore,
}

impl FrameRelay {
    #[must_use]
    pub fn new(settings: DetectorSettings, max_concurrent: usize) -> Self {
        Self {
            settings,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    /// Run the detector on one frame and return its reading or the failure cause
    ///
    /// # Errors
    ///
    /// Returns the reason no reading could be produced
    pub async fn detect(&self, frame: &ValidFrame) -> Result<FrameReading, DetectionFailure> {
        let bytes = decode_image_data(&frame.image_data)?;

        // Removed from disk when dropped at the end of this call
        let mut temp = tempfile::Builder::new()
            .prefix("reptrack-frame-")
            .suffix(".jpg")
            .tempfile()
            .map_err(DetectionFailure::TempFile)?;
        temp.write_all(&bytes)
            .and_then(|()| temp.flush())
            .map_err(DetectionFailure::TempFile)?;

        // The semaphore is never closed
        let _permit = self.permits.acquire().await.ok();

        let child = Command::new(&self.settings.program)
            .arg(&self.settings.script)
            .arg(temp.path())
            .arg(frame.exercise_type.to_lowercase())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.settings.timeout, child)
            .await
            .map_err(|_| DetectionFailure::TimedOut(self.settings.timeout))?
            .map_err(DetectionFailure::Launch)?;

        if !output.status.success() {
            return Err(DetectionFailure::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_detector_output(&String::from_utf8_lossy(&output.stdout))
    }

    /// Run the detector, substituting the fallback reading for any failure
    pub async fn relay(&self, frame: &ValidFrame) -> FrameReading {
        match self.detect(frame).await {
            Ok(reading) => reading,
            Err(e) => {
                match &e {
                    DetectionFailure::Launch(_) | DetectionFailure::TempFile(_) => {
                        log::error!("Frame detection failed: {e}");
                    }
                    _ => log::warn!("Frame detection failed, using fallback reading: {e}"),
                }
                FrameReading::fallback()
            }
        }
    }
}
