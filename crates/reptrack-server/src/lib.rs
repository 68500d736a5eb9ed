//! reptrack frame server
//!
//! Accepts camera frames over HTTP and answers with the detector's reading.
//! Shared by the `reptrack-server` binary and `reptrack serve`.

pub mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use reptrack_core::Config;
use reptrack_detector::FrameRelay;

pub use handlers::FrameRoutes;

/// Build the relay described by `config`
#[must_use]
pub fn build_relay(config: &Config) -> Arc<FrameRelay> {
    let relay = FrameRelay::new(config.detector_settings(), config.detector.max_concurrent);
    let script = &relay.settings().script;
    if !script.exists() {
        log::warn!(
            "Detector script {} not found, every frame will get the fallback reading",
            script.display()
        );
    }
    Arc::new(relay)
}

/// Serve the frame endpoint on `config.server.addr` until Ctrl-C
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn serve(config: &Config) -> Result<()> {
    let app = FrameRoutes::routes(build_relay(config));

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    log::info!("Frame server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {e}");
            }
        })
        .await
        .context("Frame server failed")?;

    log::info!("Frame server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_build_relay_uses_detector_config() {
        let mut config = Config::default();
        config.detector.program = "python3".to_string();
        config.detector.script = PathBuf::from("/nonexistent/detect.py");
        config.detector.timeout_secs = 0;

        let relay = build_relay(&config);
        let settings = relay.settings();
        assert_eq!(settings.program, "python3");
        assert_eq!(settings.script, PathBuf::from("/nonexistent/detect.py"));
        assert_eq!(settings.timeout, Duration::from_secs(1));
    }
}
