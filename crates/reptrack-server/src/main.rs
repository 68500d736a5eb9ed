//! reptrack frame server
//!
//! Standalone binary for the frame endpoint. Configuration comes from
//! `config.toml` in the data directory plus `REPTRACK_*` overrides.

use anyhow::Result;
use reptrack_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .format_timestamp_secs()
        .init();

    log::info!("Starting reptrack frame server...");

    let config = Config::load()?;
    reptrack_server::serve(&config).await
}
