//! Archive manifests
//!
//! The manifest is the authoritative compatibility gate of an archive: its
//! format version is checked before any template content is read.

use super::{TemplateError, TemplateResult};
use chrono::Utc;
use page_model::{AssetKind, Difficulty, Template, TemplateCategory};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// File names within a template archive
pub const MANIFEST_FILE: &str = "manifest.json";
pub const TEMPLATE_FILE: &str = "template.json";
pub const COLLECTION_FILE: &str = "collection.json";
pub const ASSETS_DIR: &str = "assets/";
pub const SCREENSHOTS_DIR: &str = "screenshots/";
pub const TEMPLATES_DIR: &str = "templates/";

/// Template archive extension
pub const TEMPLATE_EXTENSION: &str = "zip";

/// Archive format version written by this engine
pub const FORMAT_VERSION: &str = "1.1.0";

/// Archive format versions this engine can import
pub const SUPPORTED_VERSIONS: [&str; 2] = ["1.0.0", "1.1.0"];

/// Oldest engine version able to read archives written today
pub const MIN_COMPATIBLE_VERSION: &str = "1.0.0";

/// Size ceiling for a single template archive (50 MB)
pub const MAX_ARCHIVE_SIZE: u64 = 50 * 1024 * 1024;

/// Check a manifest format version against the supported set
pub fn is_supported_version(version: &str) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}

/// SHA-256 hex digest of asset content
pub fn checksum(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Manifest author block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Declared engine compatibility window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compatibility {
    pub min_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_version: Option<String>,
}

/// Asset inventory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestAsset {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// Path of the binary inside the archive
    pub path: String,
    pub size: u64,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// Human/machine-readable description of an exported template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateManifest {
    /// Archive format version
    pub version: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub author: ManifestAuthor,
    /// Creation timestamp (ISO 8601)
    pub created: String,
    /// Version of the template itself
    pub template_version: String,
    pub compatibility: Compatibility,
    #[serde(default)]
    pub assets: Vec<ManifestAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: TemplateCategory,
    pub difficulty: Difficulty,
}

impl TemplateManifest {
    /// Build a manifest describing `template`, with one asset entry per
    /// template asset
    pub fn from_template(template: &Template) -> Self {
        let author = template.author();
        Self {
            version: FORMAT_VERSION.to_string(),
            name: template.name.clone(),
            description: template.description.clone(),
            author: ManifestAuthor {
                name: author.name.clone(),
                email: author.email.clone(),
                website: author.website.clone(),
            },
            created: Utc::now().to_rfc3339(),
            template_version: template.version.clone(),
            compatibility: Compatibility {
                min_version: MIN_COMPATIBLE_VERSION.to_string(),
                max_version: None,
            },
            assets: template
                .assets
                .iter()
                .map(|asset| ManifestAsset {
                    id: asset.id.clone(),
                    name: asset.name.clone(),
                    kind: asset.kind,
                    path: format!("{}{}", ASSETS_DIR, asset.file_name()),
                    size: asset.size,
                    mime_type: asset.mime_type.clone(),
                    checksum: None,
                })
                .collect(),
            dependencies: None,
            license: template.license.clone(),
            tags: template.tags.clone(),
            category: template.category,
            difficulty: template.difficulty,
        }
    }

    /// Whether this manifest's format version can be imported
    pub fn is_supported(&self) -> bool {
        is_supported_version(&self.version)
    }

    /// Look up an asset entry by ID
    pub fn asset(&self, id: &str) -> Option<&ManifestAsset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Parse a manifest, rejecting unsupported format versions before the
    /// rest of the document is interpreted
    pub fn from_slice_checked(data: &[u8]) -> TemplateResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(data)?;
        let version = value
            .get("version")
            .and_then(|v| v.as_str())
            .ok_or_else(|| TemplateError::InvalidFormat("manifest has no version".to_string()))?;

        if !is_supported_version(version) {
            return Err(TemplateError::UnsupportedVersion {
                version: version.to_string(),
                supported: SUPPORTED_VERSIONS.join(", "),
            });
        }

        serde_json::from_value(value)
            .map_err(|e| TemplateError::InvalidFormat(format!("invalid manifest: {}", e)))
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> TemplateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Entry of a collection archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    pub id: String,
    pub name: String,
    /// Folder holding the member's manifest.json and template.json
    pub path: String,
}

/// Top-level manifest of a multi-template archive (collection.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionManifest {
    pub version: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created: String,
    pub templates: Vec<CollectionEntry>,
}

impl CollectionManifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            name: name.into(),
            description: None,
            created: Utc::now().to_rfc3339(),
            templates: Vec::new(),
        }
    }
}
