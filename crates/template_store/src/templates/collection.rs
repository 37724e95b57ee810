//! Multi-template collection archives
//!
//! A collection archive holds `collection.json` at the top level and one
//! folder per member under `templates/<templateId>/`, each laid out like a
//! single-template archive.

use super::package::{check_archive_size, read_template_entries, write_template_entries};
use super::{
    AssetFetcher, CollectionEntry, CollectionManifest, EntryReader, EntryWriter, ExportOptions,
    ExportReport, ImportOptions, ImportedTemplate, TemplateError, TemplatePackager,
    TemplateResult, ZipEntryReader, ZipEntryWriter, COLLECTION_FILE, TEMPLATES_DIR,
};
use crate::security::PatternSanitizer;
use page_model::Template;

/// Result of importing a collection archive
#[derive(Debug, Clone)]
pub struct ImportedCollection {
    pub manifest: CollectionManifest,
    /// Members in collection order
    pub templates: Vec<ImportedTemplate>,
}

impl<F: AssetFetcher> TemplatePackager<F> {
    /// Export several templates into one collection archive
    pub fn export_collection(
        &self,
        name: &str,
        templates: &[Template],
        options: &ExportOptions,
    ) -> TemplateResult<Vec<u8>> {
        self.export_collection_with_report(name, templates, options)
            .map(|report| report.bytes)
    }

    /// Export a collection, also reporting resources that were skipped
    pub fn export_collection_with_report(
        &self,
        name: &str,
        templates: &[Template],
        options: &ExportOptions,
    ) -> TemplateResult<ExportReport> {
        self.export_collection_inner(name, templates, options)
            .map_err(|e| TemplateError::Export(Box::new(e)))
    }

    fn export_collection_inner(
        &self,
        name: &str,
        templates: &[Template],
        options: &ExportOptions,
    ) -> TemplateResult<ExportReport> {
        let mut writer = ZipEntryWriter::new();
        let mut manifest = CollectionManifest::new(name);
        let mut skipped_assets = Vec::new();
        let mut skipped_screenshots = Vec::new();

        for template in templates {
            let folder = format!("{}{}/", TEMPLATES_DIR, template.id);
            let skipped =
                write_template_entries(&mut writer, &folder, template, options, self.fetcher())?;
            skipped_assets.extend(skipped.assets);
            skipped_screenshots.extend(skipped.screenshots);
            manifest.templates.push(CollectionEntry {
                id: template.id.clone(),
                name: template.name.clone(),
                path: folder,
            });
        }

        writer.write(COLLECTION_FILE, serde_json::to_string_pretty(&manifest)?.as_bytes())?;
        let bytes = writer.finish()?;
        check_archive_size(bytes.len() as u64, options.max_archive_size)?;

        tracing::info!(
            "Exported collection {:?} with {} template(s) ({} bytes)",
            name,
            templates.len(),
            bytes.len()
        );

        Ok(ExportReport {
            bytes,
            skipped_assets,
            skipped_screenshots,
        })
    }
}

/// Import every member of a collection archive. Any member failing import
/// fails the whole collection.
pub fn import_collection(data: &[u8], options: &ImportOptions) -> TemplateResult<ImportedCollection> {
    import_collection_inner(data, options).map_err(|e| TemplateError::Import(Box::new(e)))
}

fn import_collection_inner(data: &[u8], options: &ImportOptions) -> TemplateResult<ImportedCollection> {
    check_archive_size(data.len() as u64, options.max_archive_size)?;
    let mut reader = ZipEntryReader::new(data)?;
    read_collection(&mut reader, options)
}

pub(crate) fn read_collection<R: EntryReader + ?Sized>(
    reader: &mut R,
    options: &ImportOptions,
) -> TemplateResult<ImportedCollection> {
    let manifest_data = reader
        .read(COLLECTION_FILE)?
        .ok_or_else(|| TemplateError::MissingFile(COLLECTION_FILE.to_string()))?;
    let manifest: CollectionManifest = serde_json::from_slice(&manifest_data)?;

    let mut templates = Vec::with_capacity(manifest.templates.len());
    for entry in &manifest.templates {
        if !entry.path.starts_with(TEMPLATES_DIR) || !entry.path.ends_with('/') {
            return Err(TemplateError::InvalidFormat(format!(
                "collection entry {} has invalid path {}",
                entry.id, entry.path
            )));
        }
        templates.push(read_template_entries(reader, &entry.path, options, &PatternSanitizer)?);
    }

    Ok(ImportedCollection {
        manifest,
        templates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{MemoryContainer, MemoryFetcher};
    use page_model::{PageSection, SectionType, TemplateAuthor, TemplateCategory};

    fn member(name: &str) -> Template {
        Template::new(name, TemplateCategory::Blog, TemplateAuthor::new("u1", "Ada"))
            .with_section(PageSection::new(SectionType::RichText, 0))
    }

    #[test]
    fn test_read_collection_from_memory() {
        let templates = vec![member("One"), member("Two")];
        let mut container = MemoryContainer::new();
        let mut manifest = CollectionManifest::new("Bundle");
        for template in &templates {
            let folder = format!("templates/{}/", template.id);
            write_template_entries(
                &mut container,
                &folder,
                template,
                &ExportOptions::default(),
                &MemoryFetcher::new(),
            )
            .unwrap();
            manifest.templates.push(CollectionEntry {
                id: template.id.clone(),
                name: template.name.clone(),
                path: folder,
            });
        }
        container
            .write(COLLECTION_FILE, serde_json::to_vec(&manifest).unwrap().as_slice())
            .unwrap();

        let imported = read_collection(&mut container, &ImportOptions::default()).unwrap();
        let names: Vec<_> = imported.templates.iter().map(|t| t.template.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Two"]);
    }

    #[test]
    fn test_missing_collection_manifest() {
        let mut container = MemoryContainer::new();
        let err = read_collection(&mut container, &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingFile(ref f) if f == COLLECTION_FILE));
    }

    #[test]
    fn test_entry_path_outside_templates_dir_is_rejected() {
        let mut container = MemoryContainer::new();
        let mut manifest = CollectionManifest::new("Bad");
        manifest.templates.push(CollectionEntry {
            id: "x".to_string(),
            name: "X".to_string(),
            path: "".to_string(),
        });
        container
            .write(COLLECTION_FILE, serde_json::to_vec(&manifest).unwrap().as_slice())
            .unwrap();
        let err = read_collection(&mut container, &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidFormat(_)));
    }
}
