// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! GoGo Board firmware manifest generator
//!
//! Mirrors the firmware binaries published as GitHub release assets into a
//! local directory and writes the installer manifests consumed by the web
//! flashing page. A single call to [`pipeline::run`] brings the output tree in
//! line with the current upstream release set.

pub mod classify;
pub mod config;
pub mod downloader;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod reconcile;
pub mod release;
pub mod report;

pub use config::{GeneratorConfig, load_config};
pub use error::GeneratorError;
pub use pipeline::run;
pub use report::RunReport;
