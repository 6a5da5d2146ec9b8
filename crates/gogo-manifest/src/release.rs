// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! GitHub release listing

use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const USER_AGENT: &str = concat!("gogo-manifest/", env!("CARGO_PKG_VERSION"));

/// GitHub release asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset file name (e.g., "gogo-firmware-v1.2.0.factory.bin")
    pub name: String,
    /// Download URL
    pub browser_download_url: String,
}

/// GitHub release information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Tag name (e.g., "v1.2.0")
    pub tag_name: String,
    /// Release title, null when the release was published without one
    #[serde(default)]
    pub name: Option<String>,
    /// Whether this is a prerelease
    #[serde(default)]
    pub prerelease: bool,
    /// Published timestamp, null for drafts
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Release assets
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.tag_name)
    }
}

/// Lists the releases of a single GitHub repository
#[derive(Debug)]
pub struct ReleaseLister {
    client: reqwest::Client,
    url: String,
}

impl ReleaseLister {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                GeneratorError::ReleaseList(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            url: config.releases_url(),
        })
    }

    /// Fetch the first page of releases, newest first as GitHub returns them
    pub async fn list(&self) -> Result<Vec<Release>> {
        tracing::info!("Fetching releases from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(|e| GeneratorError::ReleaseList(format!("Request failed: {e}")))?;

        if let Some(remaining) = response.headers().get("x-ratelimit-remaining")
            && let Ok(remaining_str) = remaining.to_str()
            && let Ok(remaining_int) = remaining_str.parse::<u32>()
            && remaining_int < 10
        {
            tracing::warn!("GitHub rate limit low: {remaining_int} remaining");
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_owned());
            return Err(GeneratorError::ReleaseList(format!(
                "GitHub API error {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GeneratorError::ReleaseList(format!("Failed to parse response: {e}")))
    }
}

/// First release not flagged as prerelease, in listing order
pub fn select_latest_stable(releases: &[Release]) -> Option<&Release> {
    releases.iter().find(|r| !r.prerelease)
}

/// Overwrite the single-line latest stable tag marker
pub fn write_tag_marker(path: &Path, tag: &str) -> Result<()> {
    std::fs::write(path, format!("{tag}\n"))?;
    Ok(())
}
