// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Firmware binary downloader

use crate::error::{GeneratorError, Result};
use crate::release::{Asset, USER_AGENT};
use std::path::{Component, Path, PathBuf};

#[derive(Debug)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GeneratorError::Download(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Download `asset` into `dir`, named exactly like the upstream asset
    pub async fn fetch(&self, asset: &Asset, dir: &Path) -> Result<PathBuf> {
        let dest = asset_path(dir, &asset.name)?;
        tracing::info!(
            "Downloading {} to {}",
            asset.browser_download_url,
            dest.display()
        );

        let response = self
            .client
            .get(&asset.browser_download_url)
            .send()
            .await
            .map_err(|e| GeneratorError::Download(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(GeneratorError::Download(format!(
                "{} returned status {}",
                asset.name,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GeneratorError::Download(format!("Failed to read {}: {e}", asset.name)))?;

        tokio::fs::write(&dest, &bytes).await?;
        tracing::info!("Download complete: {} ({} bytes)", asset.name, bytes.len());

        Ok(dest)
    }
}

/// Store path for an asset; names that would leave the store are refused
fn asset_path(dir: &Path, name: &str) -> Result<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(dir.join(name)),
        _ => Err(GeneratorError::Download(format!(
            "refusing unsafe asset name {name:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tempfile::TempDir;

    fn asset(name: &str, url: String) -> Asset {
        Asset {
            name: name.to_owned(),
            browser_download_url: url,
        }
    }

    #[test]
    fn test_asset_path() {
        let dir = Path::new("/srv/firmware");
        assert_eq!(
            asset_path(dir, "gogo.bin").unwrap(),
            PathBuf::from("/srv/firmware/gogo.bin")
        );
        assert!(asset_path(dir, "../gogo.bin").is_err());
        assert!(asset_path(dir, "nested/gogo.bin").is_err());
        assert!(asset_path(dir, "").is_err());
    }

    #[tokio::test]
    async fn test_fetch_writes_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/download/gogo.bin")
            .with_status(200)
            .with_body(b"\xe9firmware")
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new().unwrap();
        let path = fetcher
            .fetch(
                &asset("gogo.bin", format!("{}/download/gogo.bin", server.url())),
                temp_dir.path(),
            )
            .await
            .unwrap();

        assert_eq!(path, temp_dir.path().join("gogo.bin"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\xe9firmware");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/download/missing.bin")
            .with_status(404)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new().unwrap();
        let result = fetcher
            .fetch(
                &asset("missing.bin", format!("{}/download/missing.bin", server.url())),
                temp_dir.path(),
            )
            .await;

        assert!(matches!(result, Err(GeneratorError::Download(_))));
        assert!(!temp_dir.path().join("missing.bin").exists());
    }
}
