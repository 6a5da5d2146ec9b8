// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Asset classification
//!
//! The latest stable release feeds three fixed hardware roles, at most one
//! asset each. Every prerelease `.bin` asset is published as a preview build
//! for whichever chip family its name suggests.

use crate::release::{Asset, Release};
use serde::Serialize;

const FACTORY_SUFFIX: &str = ".factory.bin";
const PRIMARY_FIRMWARE_PREFIX: &str = "gogo-firmware";

/// Target microcontroller of a firmware image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChipFamily {
    #[serde(rename = "ESP32-S3")]
    Esp32S3,
    #[serde(rename = "ESP32-C3")]
    Esp32C3,
}

impl ChipFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Esp32S3 => "ESP32-S3",
            Self::Esp32C3 => "ESP32-C3",
        }
    }
}

/// Section of the combined index an entry is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Gogoboard7,
    CoProcessor,
    Preview,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gogoboard7 => "Gogoboard 7",
            Self::CoProcessor => "Co-Processor",
            Self::Preview => "Preview",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareRole {
    PrimaryBoard,
    CoProcessorTasmota,
    CoProcessorVernier,
    ChipFamilyS3,
    ChipFamilyC3,
}

impl HardwareRole {
    pub fn chip_family(self) -> ChipFamily {
        match self {
            Self::PrimaryBoard | Self::ChipFamilyS3 => ChipFamily::Esp32S3,
            Self::CoProcessorTasmota | Self::CoProcessorVernier | Self::ChipFamilyC3 => {
                ChipFamily::Esp32C3
            }
        }
    }

    pub fn channel(self) -> Channel {
        match self {
            Self::PrimaryBoard => Channel::Gogoboard7,
            Self::CoProcessorTasmota | Self::CoProcessorVernier => Channel::CoProcessor,
            Self::ChipFamilyS3 | Self::ChipFamilyC3 => Channel::Preview,
        }
    }
}

/// An asset together with the role it was assigned and the release it came from
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedAsset<'a> {
    pub role: HardwareRole,
    pub asset: &'a Asset,
    pub release: &'a Release,
}

/// Stable role for an asset name; rules are tried in order and the first one wins
pub fn stable_role(name: &str) -> Option<HardwareRole> {
    if !name.ends_with(FACTORY_SUFFIX) {
        return None;
    }

    if name.contains("gogo-firmware-") {
        Some(HardwareRole::PrimaryBoard)
    } else if name.contains("tasmota32c3") {
        Some(HardwareRole::CoProcessorTasmota)
    } else if name.contains("vernier") {
        Some(HardwareRole::CoProcessorVernier)
    } else {
        None
    }
}

/// One slot per stable role, filled by the first matching asset and never replaced
#[derive(Debug, Default)]
pub struct StableAssets<'a> {
    primary_board: Option<&'a Asset>,
    tasmota: Option<&'a Asset>,
    vernier: Option<&'a Asset>,
}

impl<'a> StableAssets<'a> {
    pub fn from_release(release: &'a Release) -> Self {
        let mut slots = Self::default();
        for asset in &release.assets {
            let Some(role) = stable_role(&asset.name) else {
                continue;
            };
            if !slots.offer(role, asset) {
                tracing::debug!("Ignoring {}: {role:?} already assigned", asset.name);
            }
        }
        slots
    }

    /// Returns false when the slot was already taken
    fn offer(&mut self, role: HardwareRole, asset: &'a Asset) -> bool {
        let slot = match role {
            HardwareRole::PrimaryBoard => &mut self.primary_board,
            HardwareRole::CoProcessorTasmota => &mut self.tasmota,
            HardwareRole::CoProcessorVernier => &mut self.vernier,
            HardwareRole::ChipFamilyS3 | HardwareRole::ChipFamilyC3 => return false,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(asset);
        true
    }

    pub fn get(&self, role: HardwareRole) -> Option<&'a Asset> {
        match role {
            HardwareRole::PrimaryBoard => self.primary_board,
            HardwareRole::CoProcessorTasmota => self.tasmota,
            HardwareRole::CoProcessorVernier => self.vernier,
            HardwareRole::ChipFamilyS3 | HardwareRole::ChipFamilyC3 => None,
        }
    }

    /// Filled slots in index order: primary board, Tasmota, Vernier
    pub fn iter(&self) -> impl Iterator<Item = (HardwareRole, &'a Asset)> + '_ {
        [
            HardwareRole::PrimaryBoard,
            HardwareRole::CoProcessorTasmota,
            HardwareRole::CoProcessorVernier,
        ]
        .into_iter()
        .filter_map(|role| self.get(role).map(|asset| (role, asset)))
    }
}

/// Classify the assets of the latest stable release
pub fn classify_stable(release: &Release) -> Vec<ClassifiedAsset<'_>> {
    StableAssets::from_release(release)
        .iter()
        .map(|(role, asset)| ClassifiedAsset {
            role,
            asset,
            release,
        })
        .collect()
}

/// Chip family of a prerelease binary, judged from its file name
pub fn prerelease_role(name: &str) -> HardwareRole {
    let lower = name.to_lowercase();
    if lower.contains("c3") || lower.contains("-co-") {
        HardwareRole::ChipFamilyC3
    } else {
        HardwareRole::ChipFamilyS3
    }
}

/// Main board firmware first, everything else after in listing order
pub fn order_prerelease_assets(assets: &[Asset]) -> Vec<&Asset> {
    let mut ordered: Vec<&Asset> = assets.iter().collect();
    ordered.sort_by_key(|a| !a.name.starts_with(PRIMARY_FIRMWARE_PREFIX));
    ordered
}

/// Classify every `.bin` asset of a prerelease
pub fn classify_prerelease(release: &Release) -> Vec<ClassifiedAsset<'_>> {
    order_prerelease_assets(&release.assets)
        .into_iter()
        .filter(|a| a.name.ends_with(".bin"))
        .map(|asset| ClassifiedAsset {
            role: prerelease_role(&asset.name),
            asset,
            release,
        })
        .collect()
}
