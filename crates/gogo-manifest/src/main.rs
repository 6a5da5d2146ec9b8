// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! gogo-manifest - Entry point for the manifest generator
//!
//! Mirrors the current GoGo Board 7 firmware releases into the working
//! directory and regenerates the installer manifests. Takes an optional
//! config file path as its only argument.

use gogo_manifest::config::{DEFAULT_CONFIG_PATH, load_config};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gogo_manifest=info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    info!(path = %config_path.display(), "Loading configuration");
    let config = load_config(&config_path)?;
    info!(
        "Generating manifests for {}/{} into {}",
        config.repo_owner,
        config.repo_name,
        config.output_dir.display()
    );

    let report = gogo_manifest::run(&config).await?;

    info!("Run finished: {}", report.summary());
    if !report.is_clean() {
        warn!("Run completed with recoverable failures");
    }
    debug!("Run report: {}", serde_json::to_string(&report)?);

    Ok(())
}
