// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Error types for the manifest generator

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("config error: {0}")]
    Config(String),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("release listing failed: {0}")]
    ReleaseList(String),

    #[error("download failed: {0}")]
    Download(String),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
