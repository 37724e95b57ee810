//! Template Store - Template packaging, import validation and storage
//!
//! This crate handles exporting templates into portable archives, importing
//! and previewing such archives, scanning imported content for dangerous
//! markup, and keeping a directory-backed library of templates.

mod error;
mod settings;
pub mod security;
pub mod templates;

pub use error::*;
pub use settings::*;

// Re-export template packaging functionality
pub use templates::{
    import_collection, import_template, import_template_with, preview_template, AssetFetcher,
    CollectionManifest, EntryReader, EntryWriter, ExportOptions, ExportReport, FetchError,
    FileFetcher, ImportOptions, ImportedCollection, ImportedTemplate, LibraryStats,
    MemoryContainer, MemoryFetcher, TemplateError, TemplateLibrary, TemplateManifest,
    TemplatePackager, TemplatePreview, TemplateResult, TemplateReview, ZipEntryReader,
    ZipEntryWriter, FORMAT_VERSION, MAX_ARCHIVE_SIZE, SUPPORTED_VERSIONS,
};

#[cfg(feature = "http")]
pub use templates::HttpFetcher;

// Re-export security scanning
pub use security::{
    ContentSanitizer, IssueLocation, IssueType, PatternSanitizer, SanitizationLevel,
    SecurityIssue, Severity, TemplateValidator, ValidationResult, ValidatorConfig,
};
