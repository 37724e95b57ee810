//! Template archives: export, import and preview
//!
//! A template archive is a ZIP file containing:
//! - manifest.json: format version, author, compatibility and asset inventory
//! - template.json: the portable template (no server-only fields)
//! - assets/: embedded asset binaries, one per manifest asset entry
//! - screenshots/: preview images named preview-<n>.<ext>

use super::{
    checksum, AssetFetcher, EntryReader, EntryWriter, TemplateError, TemplateManifest,
    TemplateResult, ZipEntryReader, ZipEntryWriter, ASSETS_DIR, MANIFEST_FILE, MAX_ARCHIVE_SIZE,
    SCREENSHOTS_DIR, TEMPLATE_FILE,
};
use crate::security::{
    ContentSanitizer, PatternSanitizer, SanitizationLevel, TemplateValidator, ValidationResult,
    ValidatorConfig,
};
use page_model::{PortableTemplate, Template, TemplateAsset, TemplateAuthor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// File extensions recognized as screenshots
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Extension used for screenshots whose URL carries none
const DEFAULT_SCREENSHOT_EXTENSION: &str = "png";

/// Options controlling export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Fetch and embed asset binaries
    pub include_assets: bool,
    /// Fetch and embed preview images
    pub include_screenshots: bool,
    /// Size ceiling for the finished archive, in bytes
    pub max_archive_size: u64,
    /// License written to the manifest instead of the template's own
    pub license: Option<String>,
    /// Names of templates or packs this template depends on
    pub dependencies: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_assets: true,
            include_screenshots: true,
            max_archive_size: MAX_ARCHIVE_SIZE,
            license: None,
            dependencies: Vec::new(),
        }
    }
}

impl ExportOptions {
    pub fn with_assets(mut self, include: bool) -> Self {
        self.include_assets = include;
        self
    }

    pub fn with_screenshots(mut self, include: bool) -> Self {
        self.include_screenshots = include;
        self
    }

    pub fn with_max_archive_size(mut self, bytes: u64) -> Self {
        self.max_archive_size = bytes;
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }
}

/// Options controlling import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportOptions {
    /// Extract embedded asset binaries
    pub include_assets: bool,
    /// Sanitization applied before validation
    pub sanitization: SanitizationLevel,
    /// Validator configuration
    pub validator: ValidatorConfig,
    /// Size ceiling for the incoming archive, in bytes
    pub max_archive_size: u64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            include_assets: true,
            sanitization: SanitizationLevel::default(),
            validator: ValidatorConfig::default(),
            max_archive_size: MAX_ARCHIVE_SIZE,
        }
    }
}

impl ImportOptions {
    pub fn with_assets(mut self, include: bool) -> Self {
        self.include_assets = include;
        self
    }

    pub fn with_sanitization(mut self, level: SanitizationLevel) -> Self {
        self.sanitization = level;
        self
    }

    pub fn with_validator(mut self, config: ValidatorConfig) -> Self {
        self.validator = config;
        self
    }

    pub fn with_max_archive_size(mut self, bytes: u64) -> Self {
        self.max_archive_size = bytes;
        self
    }
}

/// A finished export and the resources that could not be embedded
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub bytes: Vec<u8>,
    /// IDs of assets whose content could not be fetched
    pub skipped_assets: Vec<String>,
    /// URLs of preview images that could not be fetched
    pub skipped_screenshots: Vec<String>,
}

/// Resources left out while writing one template's entries
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SkippedResources {
    pub assets: Vec<String>,
    pub screenshots: Vec<String>,
}

/// Result of importing a template archive
#[derive(Debug, Clone)]
pub struct ImportedTemplate {
    pub manifest: TemplateManifest,
    /// Sanitized, validated template content
    pub template: PortableTemplate,
    /// Asset binaries keyed by asset ID
    pub assets: HashMap<String, Vec<u8>>,
    /// Screenshot binaries keyed by archive path
    pub screenshots: BTreeMap<String, Vec<u8>>,
    /// Validation report (valid, possibly with warnings and non-critical issues)
    pub validation: ValidationResult,
    /// Non-fatal problems found while reading the archive
    pub warnings: Vec<String>,
    /// Number of text fields rewritten by sanitization
    pub sanitized_fields: usize,
}

impl ImportedTemplate {
    /// Materialize the import as a new template owned by `author`. Asset URLs
    /// are the archive paths joined onto `asset_base_url`.
    pub fn into_template(self, author: TemplateAuthor, asset_base_url: &str) -> Template {
        let base = asset_base_url.trim_end_matches('/');
        let assets = self
            .manifest
            .assets
            .iter()
            .map(|entry| {
                let url = if base.is_empty() {
                    entry.path.clone()
                } else {
                    format!("{}/{}", base, entry.path)
                };
                let mut asset = TemplateAsset::new(&entry.id, &entry.name, &entry.mime_type, url)
                    .with_size(entry.size);
                asset.kind = entry.kind;
                asset
            })
            .collect();
        self.template.into_template(author, assets)
    }
}

/// Lightweight summary of an archive, read without validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePreview {
    pub manifest: TemplateManifest,
    /// `None` when the template data is absent or not readable
    pub section_count: Option<usize>,
    pub asset_count: usize,
    pub screenshot_count: usize,
    pub archive_size: u64,
    /// Whether the manifest's format version can be imported
    pub is_supported: bool,
}

/// Exports templates, fetching asset content through `F`
#[derive(Debug, Clone, Default)]
pub struct TemplatePackager<F> {
    fetcher: F,
}

impl<F: AssetFetcher> TemplatePackager<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Export a template to archive bytes
    pub fn export(&self, template: &Template, options: &ExportOptions) -> TemplateResult<Vec<u8>> {
        self.export_with_report(template, options)
            .map(|report| report.bytes)
    }

    /// Export a template, also reporting resources that were skipped
    pub fn export_with_report(
        &self,
        template: &Template,
        options: &ExportOptions,
    ) -> TemplateResult<ExportReport> {
        self.export_inner(template, options)
            .map_err(|e| TemplateError::Export(Box::new(e)))
    }

    fn export_inner(&self, template: &Template, options: &ExportOptions) -> TemplateResult<ExportReport> {
        let mut writer = ZipEntryWriter::new();
        let skipped = write_template_entries(&mut writer, "", template, options, &self.fetcher)?;
        let bytes = writer.finish()?;
        check_archive_size(bytes.len() as u64, options.max_archive_size)?;

        tracing::info!(
            "Exported template {} ({} bytes, {} asset(s) skipped, {} screenshot(s) skipped)",
            template.id,
            bytes.len(),
            skipped.assets.len(),
            skipped.screenshots.len()
        );

        Ok(ExportReport {
            bytes,
            skipped_assets: skipped.assets,
            skipped_screenshots: skipped.screenshots,
        })
    }
}

/// Insert `-<n>` before the extension: `assets/a-logo.png` -> `assets/a-logo-1.png`
fn numbered_path(path: &str, n: u32) -> String {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, ext) = path.split_at(name_start + dot);
            format!("{}-{}{}", stem, n, ext)
        }
        _ => format!("{}-{}", path, n),
    }
}

/// Reject archives above `limit`
pub(crate) fn check_archive_size(size: u64, limit: u64) -> TemplateResult<()> {
    if size > limit {
        return Err(TemplateError::ArchiveTooLarge { size, limit });
    }
    Ok(())
}

/// Whether an archive path names a screenshot image
pub(crate) fn is_image_path(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Image extension for a screenshot URL, ignoring query and fragment
fn screenshot_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    file.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| DEFAULT_SCREENSHOT_EXTENSION.to_string())
}

/// Write manifest, template data, assets and screenshots of one template
/// under `prefix`. Resources that cannot be fetched are logged and skipped.
pub(crate) fn write_template_entries<W, F>(
    writer: &mut W,
    prefix: &str,
    template: &Template,
    options: &ExportOptions,
    fetcher: &F,
) -> TemplateResult<SkippedResources>
where
    W: EntryWriter + ?Sized,
    F: AssetFetcher + ?Sized,
{
    let mut skipped = SkippedResources::default();
    let mut manifest = TemplateManifest::from_template(template);
    if options.license.is_some() {
        manifest.license = options.license.clone();
    }
    if !options.dependencies.is_empty() {
        manifest.dependencies = Some(options.dependencies.clone());
    }

    // Asset file names must be unique inside the archive
    let mut used_paths = HashSet::new();
    for (entry, asset) in manifest.assets.iter_mut().zip(&template.assets) {
        if used_paths.insert(entry.path.clone()) {
            continue;
        }
        let renamed = format!("{}{}-{}", ASSETS_DIR, asset.id, asset.file_name());
        let mut candidate = renamed.clone();
        let mut counter = 1;
        while !used_paths.insert(candidate.clone()) {
            candidate = numbered_path(&renamed, counter);
            counter += 1;
        }
        entry.path = candidate;
    }

    let mut embedded = Vec::new();
    if options.include_assets {
        for (entry, asset) in manifest.assets.iter_mut().zip(&template.assets) {
            match fetcher.fetch(&asset.url) {
                Ok(data) => {
                    entry.size = data.len() as u64;
                    entry.checksum = Some(checksum(&data));
                    embedded.push((entry.path.clone(), data));
                }
                Err(e) => {
                    tracing::warn!("Skipping asset {} ({}): {}", asset.id, asset.url, e);
                    skipped.assets.push(asset.id.clone());
                }
            }
        }
    }

    writer.write(
        &format!("{}{}", prefix, MANIFEST_FILE),
        manifest.to_json()?.as_bytes(),
    )?;

    let portable = serde_json::to_string_pretty(&template.to_portable())?;
    writer.write(&format!("{}{}", prefix, TEMPLATE_FILE), portable.as_bytes())?;

    for (path, data) in &embedded {
        writer.write(&format!("{}{}", prefix, path), data)?;
    }

    if options.include_screenshots {
        let mut number = 0;
        for url in &template.preview_images {
            match fetcher.fetch(url) {
                Ok(data) => {
                    number += 1;
                    let path = format!(
                        "{}{}preview-{}.{}",
                        prefix,
                        SCREENSHOTS_DIR,
                        number,
                        screenshot_extension(url)
                    );
                    writer.write(&path, &data)?;
                }
                Err(e) => {
                    tracing::warn!("Skipping screenshot {}: {}", url, e);
                    skipped.screenshots.push(url.clone());
                }
            }
        }
    }

    Ok(skipped)
}

/// Import a template archive using the default sanitizer
pub fn import_template(data: &[u8], options: &ImportOptions) -> TemplateResult<ImportedTemplate> {
    import_template_with(data, options, &PatternSanitizer)
}

/// Import a template archive using a caller-supplied sanitizer
pub fn import_template_with<S>(
    data: &[u8],
    options: &ImportOptions,
    sanitizer: &S,
) -> TemplateResult<ImportedTemplate>
where
    S: ContentSanitizer + ?Sized,
{
    import_inner(data, options, sanitizer).map_err(|e| TemplateError::Import(Box::new(e)))
}

fn import_inner<S>(
    data: &[u8],
    options: &ImportOptions,
    sanitizer: &S,
) -> TemplateResult<ImportedTemplate>
where
    S: ContentSanitizer + ?Sized,
{
    check_archive_size(data.len() as u64, options.max_archive_size)?;
    let mut reader = ZipEntryReader::new(data)?;
    let imported = read_template_entries(&mut reader, "", options, sanitizer)?;

    tracing::info!(
        "Imported template {:?} ({} section(s), {} asset(s), {} screenshot(s))",
        imported.template.name,
        imported.template.sections.len(),
        imported.assets.len(),
        imported.screenshots.len()
    );
    Ok(imported)
}

/// Read, sanitize and validate one template stored under `prefix`
pub(crate) fn read_template_entries<R, S>(
    reader: &mut R,
    prefix: &str,
    options: &ImportOptions,
    sanitizer: &S,
) -> TemplateResult<ImportedTemplate>
where
    R: EntryReader + ?Sized,
    S: ContentSanitizer + ?Sized,
{
    let manifest_data = reader
        .read(&format!("{}{}", prefix, MANIFEST_FILE))?
        .ok_or(TemplateError::MissingManifest)?;
    let manifest = TemplateManifest::from_slice_checked(&manifest_data)?;

    let template_data = reader
        .read(&format!("{}{}", prefix, TEMPLATE_FILE))?
        .ok_or(TemplateError::MissingTemplateData)?;
    let value: serde_json::Value = serde_json::from_slice(&template_data)?;

    let validator = TemplateValidator::new(options.validator.clone());
    let shape = validator.check_shape(&value);
    if !shape.is_valid {
        return Err(TemplateError::ValidationFailed(Box::new(shape)));
    }

    let mut template: PortableTemplate = serde_json::from_value(value)
        .map_err(|e| TemplateError::InvalidFormat(format!("invalid template data: {}", e)))?;
    let sanitized_fields = sanitizer.sanitize_template(&mut template, options.sanitization);
    if sanitized_fields > 0 {
        tracing::debug!("Sanitized {} field(s) of {:?}", sanitized_fields, template.name);
    }

    let validation = validator.validate(&template, Some(&manifest));
    if !validation.is_valid {
        return Err(TemplateError::ValidationFailed(Box::new(validation)));
    }

    let mut warnings = Vec::new();
    let mut assets = HashMap::new();
    if options.include_assets {
        for entry in &manifest.assets {
            let path = format!("{}{}", prefix, entry.path);
            match reader.read(&path)? {
                Some(data) => {
                    if let Some(expected) = &entry.checksum {
                        if *expected != checksum(&data) {
                            warnings.push(format!("Checksum mismatch for asset {}", entry.id));
                        }
                    }
                    assets.insert(entry.id.clone(), data);
                }
                None => {
                    tracing::warn!("Asset {} missing from archive at {}", entry.id, path);
                    warnings.push(format!("Asset {} not found in archive", entry.id));
                }
            }
        }
    }

    let mut screenshots = BTreeMap::new();
    let screenshot_prefix = format!("{}{}", prefix, SCREENSHOTS_DIR);
    for path in reader.list(&screenshot_prefix) {
        if !is_image_path(&path) {
            continue;
        }
        if let Some(data) = reader.read(&path)? {
            let key = path.strip_prefix(prefix).unwrap_or(&path).to_string();
            screenshots.insert(key, data);
        }
    }

    Ok(ImportedTemplate {
        manifest,
        template,
        assets,
        screenshots,
        validation,
        warnings,
        sanitized_fields,
    })
}

/// Summarize an archive without validating or extracting it
pub fn preview_template(data: &[u8]) -> TemplateResult<TemplatePreview> {
    preview_inner(data).map_err(|e| TemplateError::Preview(Box::new(e)))
}

fn preview_inner(data: &[u8]) -> TemplateResult<TemplatePreview> {
    let mut reader = ZipEntryReader::new(data)?;

    let manifest_data = reader
        .read(MANIFEST_FILE)?
        .ok_or(TemplateError::MissingManifest)?;
    let manifest: TemplateManifest = serde_json::from_slice(&manifest_data)
        .map_err(|e| TemplateError::InvalidFormat(format!("invalid manifest: {}", e)))?;

    let section_count = reader
        .read(TEMPLATE_FILE)?
        .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok())
        .and_then(|value| value.get("sections").and_then(|s| s.as_array()).map(Vec::len));

    let screenshot_count = reader
        .list(SCREENSHOTS_DIR)
        .iter()
        .filter(|path| is_image_path(path))
        .count();

    Ok(TemplatePreview {
        is_supported: manifest.is_supported(),
        asset_count: manifest.assets.len(),
        manifest,
        section_count,
        screenshot_count,
        archive_size: data.len() as u64,
    })
}
