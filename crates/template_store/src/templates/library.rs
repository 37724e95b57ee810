//! Directory-backed template library with reviews and usage statistics

use super::{
    import_template, AssetFetcher, ExportOptions, ImportOptions, TemplateError, TemplatePackager,
    TemplateResult,
};
use chrono::{DateTime, Utc};
use page_model::{Difficulty, Template, TemplateAuthor, TemplateCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of stored template records
const RECORD_EXTENSION: &str = "json";

/// A user's rating of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateReview {
    pub id: String,
    pub template_id: String,
    pub user_id: String,
    /// 1-5 stars
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stored template together with its reviews
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateRecord {
    template: Template,
    #[serde(default)]
    reviews: Vec<TemplateReview>,
}

/// Aggregate counts over the library
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub total: usize,
    pub by_category: BTreeMap<TemplateCategory, usize>,
    pub by_difficulty: BTreeMap<Difficulty, usize>,
    pub by_tag: BTreeMap<String, usize>,
}

/// Manages template records stored as `<id>.json` in a directory
#[derive(Debug)]
pub struct TemplateLibrary {
    /// Directory where records are stored
    root: PathBuf,
    /// Cache of loaded records
    cache: HashMap<String, TemplateRecord>,
}

impl TemplateLibrary {
    /// Create a library rooted at `root`. Call `refresh` to load existing records.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    /// Ensure the library directory exists
    pub fn ensure_directory(&self) -> TemplateResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> TemplateResult<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(TemplateError::NotFound(id.to_string()));
        }
        Ok(self.root.join(format!("{}.{}", id, RECORD_EXTENSION)))
    }

    fn write_record(&self, record: &TemplateRecord) -> TemplateResult<()> {
        self.ensure_directory()?;
        let path = self.record_path(&record.template.id)?;
        fs::write(path, serde_json::to_string_pretty(record)?)?;
        Ok(())
    }

    fn record(&self, id: &str) -> TemplateResult<&TemplateRecord> {
        self.cache
            .get(id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    fn record_mut(&mut self, id: &str) -> TemplateResult<&mut TemplateRecord> {
        self.cache
            .get_mut(id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    /// Reload the cache from disk. Unreadable records are logged and skipped.
    /// Returns the number of records loaded.
    pub fn refresh(&mut self) -> TemplateResult<usize> {
        self.ensure_directory()?;
        self.cache.clear();

        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().map(|e| e != RECORD_EXTENSION).unwrap_or(true) {
                continue;
            }

            let parsed = fs::read_to_string(&path)
                .map_err(TemplateError::from)
                .and_then(|json| {
                    serde_json::from_str::<TemplateRecord>(&json).map_err(TemplateError::from)
                });
            match parsed {
                Ok(record) => {
                    self.cache.insert(record.template.id.clone(), record);
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable template record {}: {}", path.display(), e);
                }
            }
        }

        Ok(self.cache.len())
    }

    /// Store a new template
    pub fn save(&mut self, template: Template) -> TemplateResult<String> {
        let id = template.id.clone();
        if self.cache.contains_key(&id) || self.record_path(&id)?.exists() {
            return Err(TemplateError::AlreadyExists(id));
        }

        let record = TemplateRecord {
            template,
            reviews: Vec::new(),
        };
        self.write_record(&record)?;
        self.cache.insert(id.clone(), record);
        Ok(id)
    }

    pub fn get(&self, id: &str) -> TemplateResult<&Template> {
        self.record(id).map(|record| &record.template)
    }

    /// Replace a stored template. Author and creation time are kept from the
    /// stored copy.
    pub fn update(&mut self, template: Template) -> TemplateResult<()> {
        let id = template.id.clone();
        let mut record = self.record(&id)?.clone();
        if record.template.author() != template.author() {
            return Err(TemplateError::InvalidFormat(format!(
                "template {} cannot change author",
                id
            )));
        }

        let created_at = record.template.created_at;
        record.template = template;
        record.template.created_at = created_at;
        record.template.touch();

        self.write_record(&record)?;
        self.cache.insert(id, record);
        Ok(())
    }

    /// Remove a template and its reviews
    pub fn delete(&mut self, id: &str) -> TemplateResult<Template> {
        let path = self.record_path(id)?;
        let record = self
            .cache
            .remove(id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(record.template)
    }

    /// All templates, sorted by name
    pub fn list(&self) -> Vec<&Template> {
        let mut templates: Vec<&Template> = self.cache.values().map(|r| &r.template).collect();
        templates.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        templates
    }

    /// Case-insensitive search over name, description and tags
    pub fn search(&self, query: &str) -> Vec<&Template> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.list();
        }
        self.list()
            .into_iter()
            .filter(|t| {
                t.name.to_lowercase().contains(&query)
                    || t.description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&query))
                        .unwrap_or(false)
                    || t.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Store a deep copy of a template under a new ID
    pub fn duplicate(&mut self, id: &str, new_name: impl Into<String>) -> TemplateResult<String> {
        let copy = self.get(id)?.duplicate(new_name);
        self.save(copy)
    }

    /// Add a 1-5 star review and fold it into the template's rating
    pub fn add_review(
        &mut self,
        id: &str,
        user_id: impl Into<String>,
        rating: u8,
        comment: Option<String>,
    ) -> TemplateResult<TemplateReview> {
        let mut record = self.record(id)?.clone();
        record.template.record_rating(rating)?;

        let review = TemplateReview {
            id: uuid::Uuid::new_v4().to_string(),
            template_id: id.to_string(),
            user_id: user_id.into(),
            rating,
            comment,
            created_at: Utc::now(),
        };
        record.reviews.push(review.clone());

        self.write_record(&record)?;
        self.cache.insert(id.to_string(), record);
        Ok(review)
    }

    pub fn reviews(&self, id: &str) -> TemplateResult<&[TemplateReview]> {
        self.record(id).map(|record| record.reviews.as_slice())
    }

    /// Count a view of the template
    pub fn record_view(&mut self, id: &str) -> TemplateResult<u64> {
        let record = self.record_mut(id)?;
        record.template.record_view();
        let views = record.template.metrics.view_count;
        let record = record.clone();
        self.write_record(&record)?;
        Ok(views)
    }

    /// Counts per category, difficulty and tag
    pub fn stats(&self) -> LibraryStats {
        let mut stats = LibraryStats {
            total: self.cache.len(),
            ..Default::default()
        };
        for record in self.cache.values() {
            let template = &record.template;
            *stats.by_category.entry(template.category).or_default() += 1;
            *stats.by_difficulty.entry(template.difficulty).or_default() += 1;
            for tag in &template.tags {
                *stats.by_tag.entry(tag.clone()).or_default() += 1;
            }
        }
        stats
    }

    /// Export a stored template as an archive and count the download
    pub fn export_archive<F: AssetFetcher>(
        &mut self,
        id: &str,
        packager: &TemplatePackager<F>,
        options: &ExportOptions,
    ) -> TemplateResult<Vec<u8>> {
        let bytes = packager.export(self.get(id)?, options)?;

        let record = self.record_mut(id)?;
        record.template.record_download();
        let record = record.clone();
        self.write_record(&record)?;
        Ok(bytes)
    }

    /// Import an archive as a new template owned by `author`
    pub fn import_archive(
        &mut self,
        data: &[u8],
        options: &ImportOptions,
        author: TemplateAuthor,
    ) -> TemplateResult<String> {
        let imported = import_template(data, options)?;
        for warning in &imported.warnings {
            tracing::warn!("Import warning: {}", warning);
        }
        let template = imported.into_template(author, "");
        self.save(template)
    }
}
