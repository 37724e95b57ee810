//! Template assets (images, video, fonts, ...)

use serde::{Deserialize, Serialize};

/// Kind of binary resource bundled with a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetKind {
    Image,
    Video,
    Audio,
    Document,
    Font,
    Icon,
}

impl AssetKind {
    /// Classify an asset by its MIME type
    pub fn from_mime(mime_type: &str) -> Self {
        let mime = mime_type.to_ascii_lowercase();
        if mime == "image/x-icon" || mime == "image/vnd.microsoft.icon" {
            Self::Icon
        } else if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime.starts_with("audio/") {
            Self::Audio
        } else if mime.starts_with("font/") || mime.contains("font") {
            Self::Font
        } else {
            Self::Document
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::Audio => "AUDIO",
            Self::Document => "DOCUMENT",
            Self::Font => "FONT",
            Self::Icon => "ICON",
        };
        write!(f, "{}", name)
    }
}

/// A binary resource owned by the template that bundled it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateAsset {
    /// Asset identifier, referenced from section content
    pub id: String,
    /// Original file name
    pub name: String,
    /// Resource kind
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// MIME type
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    /// Location the binary content can be fetched from
    pub url: String,
}

impl TemplateAsset {
    /// Create an asset, classifying its kind from the MIME type
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let mime_type = mime_type.into();
        Self {
            id: id.into(),
            name: name.into(),
            kind: AssetKind::from_mime(&mime_type),
            mime_type,
            size: 0,
            url: url.into(),
        }
    }

    /// Set the size in bytes
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// File name safe to use as a single path component
    pub fn file_name(&self) -> String {
        let base = self
            .name
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or_default()
            .trim();
        if base.is_empty() || base == "." || base == ".." {
            self.id.clone()
        } else {
            base.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(AssetKind::from_mime("image/png"), AssetKind::Image);
        assert_eq!(AssetKind::from_mime("image/x-icon"), AssetKind::Icon);
        assert_eq!(AssetKind::from_mime("video/mp4"), AssetKind::Video);
        assert_eq!(AssetKind::from_mime("audio/mpeg"), AssetKind::Audio);
        assert_eq!(AssetKind::from_mime("font/woff2"), AssetKind::Font);
        assert_eq!(AssetKind::from_mime("application/pdf"), AssetKind::Document);
    }

    #[test]
    fn test_file_name_strips_directories() {
        let asset = TemplateAsset::new("a1", "../../etc/logo.png", "image/png", "https://x/logo.png");
        assert_eq!(asset.file_name(), "logo.png");

        let unnamed = TemplateAsset::new("a2", "..", "image/png", "https://x/y.png");
        assert_eq!(unnamed.file_name(), "a2");
    }

    #[test]
    fn test_asset_wire_format() {
        let asset = TemplateAsset::new("a1", "logo.png", "image/png", "https://cdn/logo.png")
            .with_size(42);
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["type"], "IMAGE");
        assert_eq!(json["mimeType"], "image/png");
        assert_eq!(json["size"], 42);
    }
}
