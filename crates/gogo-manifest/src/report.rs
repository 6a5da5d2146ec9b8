// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Outcome of a generator run

use serde::Serialize;

/// A recoverable failure: the run carried on without this file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedStep {
    pub file: String,
    pub reason: String,
}

impl FailedStep {
    pub fn new(file: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            file: file.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Tag written to the marker file, if a stable release exists
    pub latest_stable: Option<String>,
    /// Manifest file names written this run
    pub manifests: Vec<String>,
    /// Firmware file names downloaded this run
    pub downloaded: Vec<String>,
    pub failed_downloads: Vec<FailedStep>,
    /// Assets whose manifest was held back because the download failed
    pub skipped_manifests: Vec<String>,
    /// Files deleted from either store
    pub removed: Vec<String>,
    pub failed_removals: Vec<FailedStep>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failed_downloads.is_empty() && self.failed_removals.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "latest stable {}, {} manifests, {} downloads ({} failed), {} removed ({} failed)",
            self.latest_stable.as_deref().unwrap_or("none"),
            self.manifests.len(),
            self.downloaded.len(),
            self.failed_downloads.len(),
            self.removed.len(),
            self.failed_removals.len(),
        )
    }
}
