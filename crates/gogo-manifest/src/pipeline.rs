// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! One generator run: list, select, classify, publish, reconcile

use crate::classify::{ClassifiedAsset, classify_prerelease, classify_stable};
use crate::config::GeneratorConfig;
use crate::downloader::Fetcher;
use crate::error::Result;
use crate::manifest::{CombinedIndex, IndexEntry, InstallManifest, manifest_file_name, write_json};
use crate::reconcile::reconcile_dir;
use crate::release::{ReleaseLister, select_latest_stable, write_tag_marker};
use crate::report::{FailedStep, RunReport};
use std::collections::BTreeSet;

/// Files touched by this run; everything else in the stores is stale
#[derive(Debug, Default)]
struct KeptFiles {
    firmware: BTreeSet<String>,
    manifests: BTreeSet<String>,
}

struct Publisher<'c> {
    config: &'c GeneratorConfig,
    fetcher: Fetcher,
    index: CombinedIndex,
    kept: KeptFiles,
    report: RunReport,
}

impl Publisher<'_> {
    async fn publish(&mut self, classified: &ClassifiedAsset<'_>) -> Result<()> {
        let asset = classified.asset;
        self.kept.firmware.insert(asset.name.clone());

        match self
            .fetcher
            .fetch(asset, &self.config.firmware_path())
            .await
        {
            Ok(_) => self.report.downloaded.push(asset.name.clone()),
            Err(e) => {
                tracing::error!("Error downloading {}: {e}", asset.name);
                self.report
                    .failed_downloads
                    .push(FailedStep::new(asset.name.clone(), e));

                if self.config.skip_manifest_on_failed_download {
                    tracing::warn!("Skipping manifest for {}", asset.name);
                    self.report.skipped_manifests.push(asset.name.clone());
                    return Ok(());
                }
            }
        }

        let file_name = manifest_file_name(classified);
        let manifest = InstallManifest::for_asset(classified, &self.config.firmware_dir);
        write_json(&self.config.manifest_path().join(&file_name), &manifest)?;
        tracing::debug!(
            "Wrote {file_name} for {} ({})",
            classified.role.channel().as_str(),
            classified.role.chip_family().as_str()
        );

        self.index.push(
            classified.role.channel(),
            IndexEntry::for_asset(classified, &self.config.manifest_dir, &file_name),
        );
        self.kept.manifests.insert(file_name.clone());
        self.report.manifests.push(file_name);

        Ok(())
    }
}

/// Bring the output tree in line with the upstream release listing
///
/// Listing failures and failures to write the generated documents abort the
/// run. Download and deletion failures are recorded in the report.
pub async fn run(config: &GeneratorConfig) -> Result<RunReport> {
    config.validate()?;

    let releases = ReleaseLister::new(config)?.list().await?;
    if releases.is_empty() {
        tracing::warn!("Release listing is empty, leaving the output tree untouched");
        return Ok(RunReport::default());
    }

    std::fs::create_dir_all(config.firmware_path())?;
    std::fs::create_dir_all(config.manifest_path())?;

    let latest_stable = select_latest_stable(&releases);
    match latest_stable {
        Some(release) => {
            match release.published_at {
                Some(published) => tracing::info!(
                    "Latest stable version: {} (published {})",
                    release.tag_name,
                    published.format("%Y-%m-%d")
                ),
                None => tracing::info!("Latest stable version: {}", release.tag_name),
            }
            write_tag_marker(&config.tag_marker_path(), &release.tag_name)?;
        }
        None => tracing::warn!("No stable release found"),
    }

    let mut publisher = Publisher {
        config,
        fetcher: Fetcher::new()?,
        index: CombinedIndex::default(),
        kept: KeptFiles::default(),
        report: RunReport {
            latest_stable: latest_stable.map(|r| r.tag_name.clone()),
            ..Default::default()
        },
    };

    if let Some(release) = latest_stable {
        for classified in classify_stable(release) {
            publisher.publish(&classified).await?;
        }
    }

    for release in releases.iter().filter(|r| r.prerelease) {
        tracing::info!("Processing pre-release: {}", release.tag_name);
        for classified in classify_prerelease(release) {
            publisher.publish(&classified).await?;
        }
    }

    let Publisher {
        index,
        kept,
        mut report,
        ..
    } = publisher;

    tracing::info!("Cleaning up unrelated firmware files...");
    let firmware = reconcile_dir(&config.firmware_path(), &kept.firmware)?;
    tracing::info!("Cleaning up unrelated manifest files...");
    let manifests = reconcile_dir(&config.manifest_path(), &kept.manifests)?;
    for outcome in [firmware, manifests] {
        report.removed.extend(outcome.removed);
        report.failed_removals.extend(outcome.failed);
    }

    write_json(&config.index_path(), &index)?;
    tracing::info!("Generated {} ({} entries)", config.index_file, index.len());

    Ok(report)
}
