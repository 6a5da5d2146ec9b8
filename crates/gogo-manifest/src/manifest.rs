// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Installer manifest and combined index documents

use crate::classify::{Channel, ChipFamily, ClassifiedAsset, HardwareRole};
use crate::error::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use std::path::Path;

/// Web installer manifest for a single firmware binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallManifest {
    pub name: String,
    pub version: String,
    pub new_install_prompt_erase: bool,
    pub builds: Vec<Build>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Build {
    #[serde(rename = "chipFamily")]
    pub chip_family: ChipFamily,
    pub improv: bool,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    /// Binary location relative to the manifest's own directory
    pub path: String,
    pub offset: u32,
}

impl InstallManifest {
    pub fn for_asset(classified: &ClassifiedAsset<'_>, firmware_dir: &str) -> Self {
        let version = classified.release.tag_name.clone();
        let name = match classified.role {
            HardwareRole::PrimaryBoard => format!("Gogoboard 7 Firmware ({version})"),
            HardwareRole::CoProcessorTasmota => format!("Co-Processor Tasmota ({version})"),
            HardwareRole::CoProcessorVernier => format!("Co-Processor Vernier ({version})"),
            HardwareRole::ChipFamilyS3 | HardwareRole::ChipFamilyC3 => {
                format!("{} ({version})", classified.asset.name)
            }
        };

        Self {
            name,
            version,
            new_install_prompt_erase: true,
            builds: vec![Build {
                chip_family: classified.role.chip_family(),
                improv: false,
                parts: vec![Part {
                    path: format!("../{firmware_dir}/{}", classified.asset.name),
                    offset: 0,
                }],
            }],
        }
    }
}

/// Manifest file name; fixed per stable role, unique per tag and asset for previews
pub fn manifest_file_name(classified: &ClassifiedAsset<'_>) -> String {
    match classified.role {
        HardwareRole::PrimaryBoard => "gogo_s3.manifest.json".to_owned(),
        HardwareRole::CoProcessorTasmota => "gogo_c3_tasmota.manifest.json".to_owned(),
        HardwareRole::CoProcessorVernier => "gogo_c3_vernier.manifest.json".to_owned(),
        HardwareRole::ChipFamilyS3 | HardwareRole::ChipFamilyC3 => format!(
            "preview_{}_{}.manifest.json",
            path_safe(&classified.release.tag_name),
            classified.asset.name
        ),
    }
}

/// Tags such as `release/1.3` must not turn into nested paths
fn path_safe(tag: &str) -> String {
    tag.replace(['/', '\\'], "_")
}

/// Summary of one manifest in the combined index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub path: String,
    pub name: String,
    #[serde(rename = "chipFamilies")]
    pub chip_families: Vec<ChipFamily>,
    pub features: BTreeMap<String, serde_json::Value>,
}

impl IndexEntry {
    pub fn for_asset(
        classified: &ClassifiedAsset<'_>,
        manifest_dir: &str,
        file_name: &str,
    ) -> Self {
        let chip_family = classified.role.chip_family();
        let name = match classified.role {
            HardwareRole::PrimaryBoard => "Gogoboard 7 Firmware".to_owned(),
            HardwareRole::CoProcessorTasmota => "Tasmota (C3)".to_owned(),
            HardwareRole::CoProcessorVernier => "Vernier (C3)".to_owned(),
            // Published index keeps the separator even with an empty suffix
            HardwareRole::ChipFamilyS3 => format!("{} ", classified.release.display_name()),
            HardwareRole::ChipFamilyC3 => format!("{}  (C3)", classified.release.display_name()),
        };

        Self {
            path: format!("{manifest_dir}/{file_name}"),
            name,
            chip_families: vec![chip_family],
            features: BTreeMap::new(),
        }
    }
}

/// Aggregate of every manifest produced by a run, grouped by channel
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CombinedIndex {
    #[serde(rename = "Gogoboard 7")]
    pub gogoboard: Vec<IndexEntry>,
    #[serde(rename = "Co-Processor")]
    pub co_processor: Vec<IndexEntry>,
    #[serde(rename = "Preview")]
    pub preview: Vec<IndexEntry>,
}

impl CombinedIndex {
    pub fn push(&mut self, channel: Channel, entry: IndexEntry) {
        match channel {
            Channel::Gogoboard7 => self.gogoboard.push(entry),
            Channel::CoProcessor => self.co_processor.push(entry),
            Channel::Preview => self.preview.push(entry),
        }
    }

    pub fn channel(&self, channel: Channel) -> &[IndexEntry] {
        match channel {
            Channel::Gogoboard7 => &self.gogoboard,
            Channel::CoProcessor => &self.co_processor,
            Channel::Preview => &self.preview,
        }
    }

    pub fn len(&self) -> usize {
        self.gogoboard.len() + self.co_processor.len() + self.preview.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serialize with 4-space indentation, the layout the installer page was built against
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    std::fs::write(path, to_json_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::{Asset, Release};
    use serde_json::json;

    fn release(tag: &str, name: Option<&str>) -> Release {
        Release {
            tag_name: tag.to_owned(),
            name: name.map(str::to_owned),
            prerelease: false,
            published_at: None,
            assets: Vec::new(),
        }
    }

    fn asset(name: &str) -> Asset {
        Asset {
            name: name.to_owned(),
            browser_download_url: format!("https://example.com/{name}"),
        }
    }

    #[test]
    fn test_primary_board_manifest() {
        let release = release("v1.2.0", Some("GoGo 1.2.0"));
        let asset = asset("gogo-firmware-v1.2.0.factory.bin");
        let classified = ClassifiedAsset {
            role: HardwareRole::PrimaryBoard,
            asset: &asset,
            release: &release,
        };

        let manifest = InstallManifest::for_asset(&classified, "firmware");
        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Gogoboard 7 Firmware (v1.2.0)",
                "version": "v1.2.0",
                "new_install_prompt_erase": true,
                "builds": [{
                    "chipFamily": "ESP32-S3",
                    "improv": false,
                    "parts": [{"path": "../firmware/gogo-firmware-v1.2.0.factory.bin", "offset": 0}]
                }]
            })
        );
        assert_eq!(manifest_file_name(&classified), "gogo_s3.manifest.json");
    }

    #[test]
    fn test_co_processor_manifests() {
        let release = release("v1.2.0", None);
        let tasmota = asset("tasmota32c3.factory.bin");
        let vernier = asset("vernier.factory.bin");

        let classified = ClassifiedAsset {
            role: HardwareRole::CoProcessorTasmota,
            asset: &tasmota,
            release: &release,
        };
        let manifest = InstallManifest::for_asset(&classified, "firmware");
        assert_eq!(manifest.name, "Co-Processor Tasmota (v1.2.0)");
        assert_eq!(manifest.builds[0].chip_family, ChipFamily::Esp32C3);
        assert_eq!(manifest_file_name(&classified), "gogo_c3_tasmota.manifest.json");
        let entry = IndexEntry::for_asset(&classified, "manifest", "gogo_c3_tasmota.manifest.json");
        assert_eq!(entry.name, "Tasmota (C3)");

        let classified = ClassifiedAsset {
            role: HardwareRole::CoProcessorVernier,
            asset: &vernier,
            release: &release,
        };
        let manifest = InstallManifest::for_asset(&classified, "firmware");
        assert_eq!(manifest.name, "Co-Processor Vernier (v1.2.0)");
        assert_eq!(manifest_file_name(&classified), "gogo_c3_vernier.manifest.json");
    }

    #[test]
    fn test_preview_manifest_and_entry() {
        let release = release("v1.3.0-rc1", Some("Preview RC1"));
        let asset = asset("co-processor-c3-build.bin");
        let classified = ClassifiedAsset {
            role: HardwareRole::ChipFamilyC3,
            asset: &asset,
            release: &release,
        };

        let manifest = InstallManifest::for_asset(&classified, "bins");
        assert_eq!(manifest.name, "co-processor-c3-build.bin (v1.3.0-rc1)");
        assert_eq!(manifest.builds[0].parts[0].path, "../bins/co-processor-c3-build.bin");

        let file_name = manifest_file_name(&classified);
        assert_eq!(
            file_name,
            "preview_v1.3.0-rc1_co-processor-c3-build.bin.manifest.json"
        );

        let entry = IndexEntry::for_asset(&classified, "manifest", &file_name);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({
                "path": "manifest/preview_v1.3.0-rc1_co-processor-c3-build.bin.manifest.json",
                "name": "Preview RC1  (C3)",
                "chipFamilies": ["ESP32-C3"],
                "features": {}
            })
        );
    }

    #[test]
    fn test_preview_file_name_flattens_tag_separators() {
        let release = release("release/1.3", None);
        let asset = asset("main-s3-build.bin");
        let classified = ClassifiedAsset {
            role: HardwareRole::ChipFamilyS3,
            asset: &asset,
            release: &release,
        };

        let file_name = manifest_file_name(&classified);
        assert_eq!(file_name, "preview_release_1.3_main-s3-build.bin.manifest.json");

        let entry = IndexEntry::for_asset(&classified, "manifest", &file_name);
        assert_eq!(entry.path, "manifest/preview_release_1.3_main-s3-build.bin.manifest.json");
        // Displayed text keeps the real tag
        assert_eq!(entry.name, "release/1.3 ");
        assert_eq!(InstallManifest::for_asset(&classified, "firmware").version, "release/1.3");
    }

    #[test]
    fn test_preview_s3_entry_name() {
        let release = release("v1.3.0-rc1", None);
        let asset = asset("main-s3-build.bin");
        let classified = ClassifiedAsset {
            role: HardwareRole::ChipFamilyS3,
            asset: &asset,
            release: &release,
        };

        let entry = IndexEntry::for_asset(&classified, "manifest", "x.manifest.json");
        assert_eq!(entry.name, "v1.3.0-rc1 ");
        assert_eq!(entry.chip_families, vec![ChipFamily::Esp32S3]);
    }

    #[test]
    fn test_combined_index_key_order() {
        let mut index = CombinedIndex::default();
        assert!(index.is_empty());

        index.push(
            Channel::Preview,
            IndexEntry {
                path: "manifest/p.manifest.json".to_owned(),
                name: "p ".to_owned(),
                chip_families: vec![ChipFamily::Esp32S3],
                features: BTreeMap::new(),
            },
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.channel(Channel::Preview).len(), 1);

        let text = String::from_utf8(to_json_pretty(&index).unwrap()).unwrap();
        let gogo = text.find("\"Gogoboard 7\"").unwrap();
        let co = text.find("\"Co-Processor\"").unwrap();
        let preview = text.find("\"Preview\"").unwrap();
        assert!(gogo < co && co < preview);
    }

    #[test]
    fn test_to_json_pretty_uses_four_spaces() {
        let text = String::from_utf8(to_json_pretty(&json!({"a": [1]})).unwrap()).unwrap();
        assert_eq!(text, "{\n    \"a\": [\n        1\n    ]\n}");
    }

    #[test]
    fn test_to_json_pretty_writes_utf8_verbatim() {
        let bytes = to_json_pretty(&json!({"name": "Vorschau ü"})).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\n    \"name\": \"Vorschau ü\"\n}");
    }
}
