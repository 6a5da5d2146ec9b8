// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Configuration module for the manifest generator

use crate::error::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "gogo_manifest.json";

const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

fn default_repo_owner() -> String {
    "LILCMU".to_owned()
}

fn default_repo_name() -> String {
    "gogo7-firmware".to_owned()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_firmware_dir() -> String {
    "firmware".to_owned()
}

fn default_manifest_dir() -> String {
    "manifest".to_owned()
}

fn default_index_file() -> String {
    "manifests.json".to_owned()
}

fn default_tag_marker_file() -> String {
    "tag_latest.txt".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// GitHub owner of the firmware repository
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// GitHub firmware repository name
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// Custom API base URL for testing (overrides default GitHub API)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Root of the generated tree
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Firmware store, relative to `output_dir`
    #[serde(default = "default_firmware_dir")]
    pub firmware_dir: String,

    /// Manifest store, relative to `output_dir`
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: String,

    /// Combined index file name, relative to `output_dir`
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// Latest stable tag marker, relative to `output_dir`
    #[serde(default = "default_tag_marker_file")]
    pub tag_marker_file: String,

    /// Leave out the manifest of an asset whose binary failed to download
    #[serde(default)]
    pub skip_manifest_on_failed_download: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            api_base_url: None,
            output_dir: default_output_dir(),
            firmware_dir: default_firmware_dir(),
            manifest_dir: default_manifest_dir(),
            index_file: default_index_file(),
            tag_marker_file: default_tag_marker_file(),
            skip_manifest_on_failed_download: false,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.repo_owner.trim().is_empty() || self.repo_name.trim().is_empty() {
            return Err(GeneratorError::Config(
                "repo_owner and repo_name must not be empty".to_owned(),
            ));
        }

        if let Some(ref base) = self.api_base_url
            && !base.starts_with("http")
        {
            return Err(GeneratorError::Config(format!(
                "api_base_url must be a valid url: {base}"
            )));
        }

        for (field, value) in [
            ("firmware_dir", &self.firmware_dir),
            ("manifest_dir", &self.manifest_dir),
            ("index_file", &self.index_file),
            ("tag_marker_file", &self.tag_marker_file),
        ] {
            if !is_plain_name(value) {
                return Err(GeneratorError::Config(format!(
                    "{field} must be a single path component, got {value:?}"
                )));
            }
        }

        // Reconciliation would delete the other store's files
        if self.firmware_dir == self.manifest_dir {
            return Err(GeneratorError::Config(
                "firmware_dir and manifest_dir must differ".to_owned(),
            ));
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_base_url(),
            self.repo_owner,
            self.repo_name
        )
    }

    pub fn firmware_path(&self) -> PathBuf {
        self.output_dir.join(&self.firmware_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join(&self.index_file)
    }

    pub fn tag_marker_path(&self) -> PathBuf {
        self.output_dir.join(&self.tag_marker_file)
    }
}

fn is_plain_name(value: &str) -> bool {
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Load the config file at `path`, falling back to defaults when it is absent
pub fn load_config(path: &Path) -> Result<GeneratorConfig> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| GeneratorError::Config(format!("Failed to parse config: {e}")))?
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
        GeneratorConfig::default()
    };

    config.validate()?;
    Ok(config)
}
