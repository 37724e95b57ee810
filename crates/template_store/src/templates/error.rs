//! Error types for template operations

use crate::security::ValidationResult;
use thiserror::Error;

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Template model error
    #[error("Template model error: {0}")]
    Model(#[from] page_model::PageModelError),

    /// Template not found
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Template already exists
    #[error("Template already exists: {0}")]
    AlreadyExists(String),

    /// Invalid archive or template format
    #[error("Invalid template format: {0}")]
    InvalidFormat(String),

    /// Archive has no manifest.json
    #[error("Template archive is missing its manifest (manifest.json)")]
    MissingManifest,

    /// Archive has no template.json
    #[error("Template archive is missing its template data (template.json)")]
    MissingTemplateData,

    /// Another required archive entry is absent
    #[error("Missing required file in archive: {0}")]
    MissingFile(String),

    /// Manifest declares a format version this engine cannot read
    #[error("Unsupported template format version {version} (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },

    /// Archive exceeds the size ceiling
    #[error("Template archive is too large: {size} bytes (limit {limit} bytes)")]
    ArchiveTooLarge { size: u64, limit: u64 },

    /// Structural errors or critical security issues block the import
    #[error("Template validation failed: {}", .0.summary())]
    ValidationFailed(Box<ValidationResult>),

    /// Export failed
    #[error("Failed to export template: {0}")]
    Export(Box<TemplateError>),

    /// Import failed
    #[error("Failed to import template: {0}")]
    Import(Box<TemplateError>),

    /// Preview failed
    #[error("Failed to preview template: {0}")]
    Preview(Box<TemplateError>),
}

impl TemplateError {
    /// The underlying error with operation wrappers removed
    pub fn root_cause(&self) -> &TemplateError {
        match self {
            Self::Export(inner) | Self::Import(inner) | Self::Preview(inner) => inner.root_cause(),
            other => other,
        }
    }

    /// Validation report, if this error was caused by failed validation
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self.root_cause() {
            Self::ValidationFailed(result) => Some(result),
            _ => None,
        }
    }
}

/// Result type for template operations
pub type TemplateResult<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_operation() {
        let err = TemplateError::Import(Box::new(TemplateError::MissingManifest));
        assert!(matches!(err.root_cause(), TemplateError::MissingManifest));
        assert!(err.to_string().starts_with("Failed to import template:"));
        assert!(err.to_string().contains("manifest.json"));
    }

    #[test]
    fn test_missing_entries_are_distinct() {
        let manifest = TemplateError::MissingManifest.to_string();
        let data = TemplateError::MissingTemplateData.to_string();
        assert_ne!(manifest, data);
        assert!(data.contains("template.json"));
    }
}
